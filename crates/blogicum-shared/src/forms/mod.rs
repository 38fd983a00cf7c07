//! HTML form payloads.
//!
//! Each form deserializes from `application/x-www-form-urlencoded`, keeps
//! the raw submitted values for re-rendering, and converts into a domain
//! value or a set of per-field messages.

mod account;
mod errors;
mod post;

pub use account::{LoginForm, ProfileForm, RegistrationForm};
pub use errors::FieldErrors;
pub use post::{CommentForm, PostForm};

use validator::ValidationError;

/// Format of `<input type="datetime-local">` values.
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("This field is required.".into()));
    }
    Ok(())
}
