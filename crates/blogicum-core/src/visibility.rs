//! Post visibility and mutation permissions.
//!
//! Every listing and the detail page go through [`is_publicly_visible`];
//! there is no second definition of "public" anywhere in the workspace.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Category, Comment, Post};

/// Who is making the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(Uuid),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }

    /// True when the viewer is the given user.
    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id() == Some(user_id)
    }
}

impl From<Option<Uuid>> for Viewer {
    fn from(user_id: Option<Uuid>) -> Self {
        user_id.map_or(Viewer::Anonymous, Viewer::User)
    }
}

/// The visibility predicate.
///
/// `category` is the post's category, already loaded; `None` counts as an
/// implicitly published category.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_none_or(|c| c.is_published)
}

/// Detail-page rule: the author previews anything, everyone else needs the
/// post to be public.
pub fn can_view(
    post: &Post,
    category: Option<&Category>,
    viewer: &Viewer,
    now: DateTime<Utc>,
) -> bool {
    viewer.is(post.author_id) || is_publicly_visible(post, category, now)
}

/// Something owned by a user and hanging off a post.
pub trait Authored {
    fn author_id(&self) -> Uuid;

    /// Post whose detail page a denied actor is sent back to.
    fn post_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }

    fn post_id(&self) -> Uuid {
        self.id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }

    fn post_id(&self) -> Uuid {
        self.post_id
    }
}

pub fn can_mutate(entity: &impl Authored, actor: Uuid) -> bool {
    entity.author_id() == actor
}

/// Soft denial of an edit or delete. Carries the post to redirect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("only the author may change this; redirecting to post {post_id}")]
pub struct Denied {
    pub post_id: Uuid,
}

/// [`can_mutate`] as a `Result`, so callers can use `?`.
pub fn authorize_mutation(entity: &impl Authored, actor: Uuid) -> Result<(), Denied> {
    if can_mutate(entity, actor) {
        Ok(())
    } else {
        Err(Denied {
            post_id: entity.post_id(),
        })
    }
}

/// Which posts a listing may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Only publicly visible posts as of `now`.
    Public { now: DateTime<Utc> },
    /// Every post regardless of flags. Only for an author's own profile.
    Owner,
}

/// Listing filter handed to [`crate::ports::PostRepository::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    pub audience: Audience,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl PostFilter {
    /// Index page and any other listing seen by the public.
    pub fn public(now: DateTime<Utc>) -> Self {
        Self {
            audience: Audience::Public { now },
            author_id: None,
            category_id: None,
        }
    }

    /// An author looking at their own profile.
    pub fn own_posts(author_id: Uuid) -> Self {
        Self {
            audience: Audience::Owner,
            author_id: Some(author_id),
            category_id: None,
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Whether `post` (with its loaded `category`) belongs in the listing.
    pub fn admits(&self, post: &Post, category: Option<&Category>) -> bool {
        if self.author_id.is_some_and(|id| id != post.author_id) {
            return false;
        }
        if self.category_id.is_some() && self.category_id != post.category_id {
            return false;
        }
        match self.audience {
            Audience::Public { now } => is_publicly_visible(post, category, now),
            Audience::Owner => true,
        }
    }
}
