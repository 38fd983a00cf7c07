//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;
mod views;

pub use category::Category;
pub use comment::Comment;
pub use location::Location;
pub use post::{Post, PostDraft};
pub use user::{ProfileChanges, User};
pub use views::{AuthorRef, CommentView, PostDetail, PostSummary};
