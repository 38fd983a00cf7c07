//! Askama page templates and the view models they render.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use askama::Template;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use blogicum_core::Page;
use blogicum_core::visibility::is_publicly_visible;
use blogicum_core::domain::{Category, CommentView, Location, PostDetail, PostSummary, User};
use blogicum_shared::FieldErrors;
use blogicum_shared::forms::{CommentForm, LoginForm, PostForm, ProfileForm, RegistrationForm};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;

const DATE_FORMAT: &str = "%d %b %Y, %H:%M";

pub fn render<T: Template>(status: StatusCode, template: &T) -> Result<HttpResponse, askama::Error> {
    let body = template.render()?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// 200 page.
pub fn html<T: Template>(template: &T) -> AppResult<HttpResponse> {
    Ok(render(StatusCode::OK, template)?)
}

/// What every page needs to draw the navigation bar.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub username: String,
}

impl PageContext {
    pub fn signed_in(&self) -> bool {
        !self.username.is_empty()
    }
}

impl From<&OptionalIdentity> for PageContext {
    fn from(identity: &OptionalIdentity) -> Self {
        Self {
            username: identity.username().unwrap_or_default().to_string(),
        }
    }
}

impl From<&Identity> for PageContext {
    fn from(identity: &Identity) -> Self {
        Self {
            username: identity.username.clone(),
        }
    }
}

/// One post in a listing.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub author: String,
    pub pub_date: String,
    pub category_title: String,
    pub category_slug: String,
    pub location: String,
    pub comment_count: u64,
    /// Only the author ever sees posts that are not public; they get a marker.
    pub hidden: bool,
}

fn location_name(location: Option<&Location>) -> String {
    location
        .filter(|l| l.is_published)
        .map(|l| l.name.clone())
        .unwrap_or_default()
}

fn category_parts(category: Option<&Category>) -> (String, String) {
    match category {
        Some(c) => (c.title.clone(), c.slug.clone()),
        None => (String::new(), String::new()),
    }
}

impl PostCard {
    pub fn new(summary: &PostSummary, now: DateTime<Utc>) -> Self {
        let (category_title, category_slug) = category_parts(summary.category.as_ref());
        Self {
            id: summary.post.id,
            title: summary.post.title.clone(),
            text: summary.post.text.clone(),
            author: summary.author.username.clone(),
            pub_date: summary.post.pub_date.format(DATE_FORMAT).to_string(),
            category_title,
            category_slug,
            location: location_name(summary.location.as_ref()),
            comment_count: summary.comment_count,
            hidden: !is_publicly_visible(&summary.post, summary.category.as_ref(), now),
        }
    }
}

/// Previous/next links under a listing.
#[derive(Debug, Clone)]
pub struct PageNav {
    pub number: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous: u64,
    pub next: u64,
}

impl<T> From<&Page<T>> for PageNav {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages(),
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous: page.previous_number(),
            next: page.next_number(),
        }
    }
}

pub fn cards(page: &Page<PostSummary>, now: DateTime<Utc>) -> Vec<PostCard> {
    page.items.iter().map(|s| PostCard::new(s, now)).collect()
}

#[derive(Template)]
#[template(path = "blog/index.html")]
pub struct IndexPage {
    pub ctx: PageContext,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

#[derive(Template)]
#[template(path = "blog/category.html")]
pub struct CategoryPage {
    pub ctx: PageContext,
    pub title: String,
    pub description: String,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

/// The profile owner as shown on their page.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub username: String,
    pub full_name: String,
    pub joined: String,
}

impl From<&User> for ProfileView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.display_name(),
            joined: user.created_at.format(DATE_FORMAT).to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "blog/profile.html")]
pub struct ProfilePage {
    pub ctx: PageContext,
    pub profile: ProfileView,
    pub is_owner: bool,
    pub posts: Vec<PostCard>,
    pub nav: PageNav,
}

/// The post on its detail page.
#[derive(Debug, Clone)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub author: String,
    pub pub_date: String,
    pub category_title: String,
    pub category_slug: String,
    pub location: String,
    pub hidden: bool,
}

impl PostView {
    pub fn new(detail: &PostDetail, now: DateTime<Utc>) -> Self {
        let (category_title, category_slug) = category_parts(detail.category.as_ref());
        Self {
            id: detail.post.id,
            title: detail.post.title.clone(),
            text: detail.post.text.clone(),
            author: detail.author.username.clone(),
            pub_date: detail.post.pub_date.format(DATE_FORMAT).to_string(),
            category_title,
            category_slug,
            location: location_name(detail.location.as_ref()),
            hidden: !is_publicly_visible(&detail.post, detail.category.as_ref(), now),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentItem {
    pub id: Uuid,
    pub author: String,
    pub text: String,
    pub created_at: String,
    pub can_edit: bool,
}

impl CommentItem {
    pub fn list(comments: &[CommentView], viewer: Option<Uuid>) -> Vec<Self> {
        comments
            .iter()
            .map(|c| Self {
                id: c.comment.id,
                author: c.author.username.clone(),
                text: c.comment.text.clone(),
                created_at: c.comment.created_at.format(DATE_FORMAT).to_string(),
                can_edit: viewer == Some(c.comment.author_id),
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "blog/detail.html")]
pub struct DetailPage {
    pub ctx: PageContext,
    pub post: PostView,
    pub is_author: bool,
    pub comments: Vec<CommentItem>,
    pub form: CommentForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "blog/post_form.html")]
pub struct PostFormPage {
    pub ctx: PageContext,
    pub heading: String,
    pub action: String,
    pub form: PostForm,
    pub errors: FieldErrors,
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

#[derive(Template)]
#[template(path = "blog/post_delete.html")]
pub struct PostDeletePage {
    pub ctx: PageContext,
    pub post_id: Uuid,
    pub title: String,
    pub text: String,
}

#[derive(Template)]
#[template(path = "blog/comment_form.html")]
pub struct CommentFormPage {
    pub ctx: PageContext,
    pub post_id: Uuid,
    pub comment_id: Uuid,
    pub form: CommentForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "blog/comment_delete.html")]
pub struct CommentDeletePage {
    pub ctx: PageContext,
    pub post_id: Uuid,
    pub comment_id: Uuid,
    pub text: String,
}

#[derive(Template)]
#[template(path = "blog/profile_form.html")]
pub struct ProfileFormPage {
    pub ctx: PageContext,
    pub form: ProfileForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "registration/login.html")]
pub struct LoginPage {
    pub ctx: PageContext,
    pub form: LoginForm,
    pub errors: FieldErrors,
    pub next: String,
}

#[derive(Template)]
#[template(path = "registration/registration_form.html")]
pub struct RegistrationPage {
    pub ctx: PageContext,
    pub form: RegistrationForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub ctx: PageContext,
    pub status: u16,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogicum_core::PageRequest;
    use blogicum_core::domain::{AuthorRef, Post, PostDraft};
    use chrono::TimeDelta;

    fn summary(category: Option<Category>, pub_date: DateTime<Utc>) -> PostSummary {
        let post = Post::new(
            Uuid::new_v4(),
            PostDraft {
                title: "<b>Title".to_string(),
                text: "Text".to_string(),
                pub_date,
                category_id: category.as_ref().map(|c| c.id),
                location_id: None,
                is_published: true,
            },
        );
        PostSummary {
            author: AuthorRef {
                id: post.author_id,
                username: "anna".to_string(),
            },
            post,
            category,
            location: Some(Location {
                is_published: false,
                ..Location::new("Hidden place".to_string())
            }),
            comment_count: 4,
        }
    }

    #[test]
    fn test_card_marks_post_in_unpublished_category() {
        let now = Utc::now();
        let mut category = Category::new("News".into(), String::new(), "news".into());
        category.is_published = false;

        let card = PostCard::new(&summary(Some(category), now - TimeDelta::hours(1)), now);
        assert!(card.hidden);
        assert_eq!(card.category_slug, "news");
        assert_eq!(card.location, "");
    }

    #[test]
    fn test_scheduled_post_is_marked_until_its_date() {
        let now = Utc::now();
        let scheduled = summary(None, now + TimeDelta::days(1));

        assert!(PostCard::new(&scheduled, now).hidden);
        assert!(!PostCard::new(&scheduled, now + TimeDelta::days(2)).hidden);

        let detail = PostDetail {
            post: scheduled.post.clone(),
            author: scheduled.author.clone(),
            category: None,
            location: None,
        };
        assert!(PostView::new(&detail, now).hidden);
    }

    #[test]
    fn test_index_page_escapes_titles_and_links_pages() {
        let now = Utc::now();
        let page = Page::from_vec(
            vec![summary(None, now - TimeDelta::hours(1))],
            PageRequest::first(),
        );
        let html = IndexPage {
            ctx: PageContext::default(),
            posts: cards(&page, now),
            nav: PageNav::from(&page),
        }
        .render()
        .unwrap();

        assert!(html.contains("&lt;b&gt;Title"));
        assert!(html.contains("/profile/anna/"));
        assert!(!html.contains("?page=2"));
    }

    #[test]
    fn test_post_form_preselects_chosen_category() {
        let travel = Category::new("Travel".into(), String::new(), "travel".into());
        let food = Category::new("Food".into(), String::new(), "food".into());
        let form = PostForm {
            category: travel.id.to_string(),
            ..PostForm::blank(Utc::now())
        };

        let html = PostFormPage {
            ctx: PageContext::default(),
            heading: "New post".to_string(),
            action: "/posts/create/".to_string(),
            form,
            errors: FieldErrors::new(),
            categories: vec![travel.clone(), food.clone()],
            locations: vec![Location::new("Moscow".to_string())],
        }
        .render()
        .unwrap();

        assert!(html.contains(&format!("value=\"{}\" selected", travel.id)));
        assert!(!html.contains(&format!("value=\"{}\" selected", food.id)));
    }
}
