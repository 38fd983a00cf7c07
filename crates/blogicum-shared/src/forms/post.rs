use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use blogicum_core::domain::{Comment, Post, PostDraft};

use super::{DATETIME_LOCAL_FORMAT, FieldErrors, not_blank};

/// Create/edit post form.
///
/// `category` and `location` carry the selected id, or an empty string for
/// "none". `is_published` is a checkbox and is absent when unticked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(
        length(min = 1, max = 256, message = "Title must be 1-256 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub text: String,
    pub pub_date: String,
    pub category: String,
    pub location: String,
    pub is_published: Option<String>,
}

impl PostForm {
    /// Empty form for a new post, scheduled at `now` and published.
    pub fn blank(now: DateTime<Utc>) -> Self {
        Self {
            pub_date: now.format(DATETIME_LOCAL_FORMAT).to_string(),
            is_published: Some("on".to_string()),
            ..Self::default()
        }
    }

    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: post.pub_date.format(DATETIME_LOCAL_FORMAT).to_string(),
            category: post.category_id.map(|id| id.to_string()).unwrap_or_default(),
            location: post.location_id.map(|id| id.to_string()).unwrap_or_default(),
            is_published: post.is_published.then(|| "on".to_string()),
        }
    }

    pub fn published_checked(&self) -> bool {
        self.is_published.is_some()
    }

    pub fn category_selected(&self, id: &Uuid) -> bool {
        self.category == id.to_string()
    }

    pub fn location_selected(&self, id: &Uuid) -> bool {
        self.location == id.to_string()
    }

    pub fn to_draft(&self) -> Result<PostDraft, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let pub_date = parse_datetime_local(&self.pub_date);
        if pub_date.is_none() {
            errors.add("pub_date", "Enter a valid date and time");
        }
        let category_id = optional_id(&self.category, "category", &mut errors);
        let location_id = optional_id(&self.location, "location", &mut errors);

        match pub_date {
            Some(pub_date) => errors.into_result(PostDraft {
                title: self.title.trim().to_string(),
                text: self.text.clone(),
                pub_date,
                category_id,
                location_id,
                is_published: self.published_checked(),
            }),
            None => Err(errors),
        }
    }
}

/// Values are interpreted as UTC. Seconds are optional.
fn parse_datetime_local(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, DATETIME_LOCAL_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn optional_id(value: &str, field: &str, errors: &mut FieldErrors) -> Option<Uuid> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match Uuid::parse_str(value) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.add(field, "Select a valid choice");
            None
        }
    }
}

/// Comment form, shared by the add and edit pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CommentForm {
    #[validate(custom(function = "not_blank"))]
    pub text: String,
}

impl CommentForm {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }

    pub fn to_text(&self) -> Result<String, FieldErrors> {
        self.validate()?;
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form() -> PostForm {
        PostForm {
            title: "Hello".to_string(),
            text: "World".to_string(),
            pub_date: "2024-05-01T12:30".to_string(),
            category: String::new(),
            location: String::new(),
            is_published: Some("on".to_string()),
        }
    }

    #[test]
    fn test_valid_form_becomes_draft() {
        let draft = form().to_draft().unwrap();

        assert_eq!(draft.title, "Hello");
        assert_eq!(
            draft.pub_date,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
        );
        assert_eq!(draft.category_id, None);
        assert!(draft.is_published);
    }

    #[test]
    fn test_unticked_checkbox_is_unpublished() {
        let draft = PostForm {
            is_published: None,
            ..form()
        }
        .to_draft()
        .unwrap();
        assert!(!draft.is_published);
    }

    #[test]
    fn test_each_bad_field_gets_a_message() {
        let errors = PostForm {
            title: "x".repeat(257),
            text: "   ".to_string(),
            pub_date: "yesterday".to_string(),
            category: "not-a-uuid".to_string(),
            ..form()
        }
        .to_draft()
        .unwrap_err();

        assert!(!errors.get("title").is_empty());
        assert!(!errors.get("text").is_empty());
        assert!(!errors.get("pub_date").is_empty());
        assert!(!errors.get("category").is_empty());
        assert!(errors.get("location").is_empty());
    }

    #[test]
    fn test_edit_form_round_trips_selected_category() {
        let category_id = Uuid::new_v4();
        let mut post = Post::new(Uuid::new_v4(), form().to_draft().unwrap());
        post.category_id = Some(category_id);

        let edit = PostForm::from_post(&post);
        assert!(edit.category_selected(&category_id));
        assert!(!edit.location_selected(&category_id));
        assert!(edit.published_checked());
        assert_eq!(edit.pub_date, "2024-05-01T12:30");
    }

    #[test]
    fn test_whitespace_title_is_rejected() {
        let errors = PostForm {
            title: "   ".to_string(),
            ..form()
        }
        .to_draft()
        .unwrap_err();
        assert_eq!(errors.get("title"), ["This field is required.".to_string()]);
    }

    #[test]
    fn test_blank_comment_is_rejected() {
        let errors = CommentForm {
            text: " \n".to_string(),
        }
        .to_text()
        .unwrap_err();
        assert_eq!(errors.get("text"), ["This field is required.".to_string()]);
    }
}
