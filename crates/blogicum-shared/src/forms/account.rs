use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use blogicum_core::domain::{ProfileChanges, User};

use super::{FieldErrors, not_blank};

/// Letters, digits and `@ . + - _`, as accepted in profile URLs.
fn username_chars(value: &str) -> Result<(), ValidationError> {
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(
            "Enter a valid username. Only letters, numbers and @/./+/-/_ are allowed.".into(),
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegistrationForm {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        custom(function = "username_chars")
    )]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password1: String,
    #[validate(must_match(other = "password1", message = "The two password fields didn't match"))]
    pub password2: String,
}

impl RegistrationForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        Ok(self.validate()?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    /// Where to go after signing in.
    pub next: String,
}

impl LoginForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        Ok(self.validate()?)
    }
}

/// Edit-profile form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters"),
        custom(function = "username_chars")
    )]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    pub fn to_changes(&self) -> Result<ProfileChanges, FieldErrors> {
        self.validate()?;
        Ok(ProfileChanges {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        })
    }
}
