//! Listings, the post page and post mutations.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_core::error::{DomainError, MutationError};
use blogicum_core::services::PostFormChoices;
use blogicum_core::{PageRequest, Viewer};
use blogicum_shared::FieldErrors;
use blogicum_shared::forms::{CommentForm, PostForm};

use super::PageQuery;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::urls::{post_url, profile_url, redirect};
use crate::views::{
    CategoryPage, CommentItem, DetailPage, IndexPage, PageContext, PageNav, PostDeletePage,
    PostFormPage, PostView, cards, html,
};

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(query.page.as_deref())?;
    let now = Utc::now();
    let posts = state.blog.list_visible_posts(now, page).await?;

    html(&IndexPage {
        ctx: PageContext::from(&identity),
        posts: cards(&posts, now),
        nav: PageNav::from(&posts),
    })
}

/// GET /category/{category_slug}/
pub async fn category(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(query.page.as_deref())?;
    let now = Utc::now();
    let (category, posts) = state
        .blog
        .category_posts(&path.into_inner(), now, page)
        .await?;

    html(&CategoryPage {
        ctx: PageContext::from(&identity),
        title: category.title,
        description: category.description,
        posts: cards(&posts, now),
        nav: PageNav::from(&posts),
    })
}

/// GET /posts/{post_id}/
pub async fn detail(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    detail_page(
        &state,
        PageContext::from(&identity),
        identity.viewer().user_id(),
        path.into_inner(),
        CommentForm::default(),
        FieldErrors::new(),
    )
    .await
}

/// The post page, also re-rendered by a rejected comment.
pub(super) async fn detail_page(
    state: &AppState,
    ctx: PageContext,
    user_id: Option<Uuid>,
    post_id: Uuid,
    form: CommentForm,
    errors: FieldErrors,
) -> AppResult<HttpResponse> {
    let viewer = Viewer::from(user_id);
    let now = Utc::now();
    let (detail, comments) = state.blog.post_detail(post_id, &viewer, now).await?;

    html(&DetailPage {
        ctx,
        is_author: viewer.is(detail.post.author_id),
        comments: CommentItem::list(&comments, user_id),
        post: PostView::new(&detail, now),
        form,
        errors,
    })
}

fn form_page(
    identity: &Identity,
    heading: &str,
    action: String,
    form: PostForm,
    errors: FieldErrors,
    choices: PostFormChoices,
) -> PostFormPage {
    PostFormPage {
        ctx: PageContext::from(identity),
        heading: heading.to_string(),
        action,
        form,
        errors,
        categories: choices.categories,
        locations: choices.locations,
    }
}

/// GET /posts/create/
pub async fn create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let choices = state.blog.form_choices().await?;
    html(&form_page(
        &identity,
        "New post",
        "/posts/create/".to_string(),
        PostForm::blank(Utc::now()),
        FieldErrors::new(),
        choices,
    ))
}

/// POST /posts/create/
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let errors = match form.to_draft() {
        Ok(draft) => match state.blog.create_post(identity.user_id, draft).await {
            Ok(_) => return Ok(redirect(&profile_url(&identity.username))),
            Err(DomainError::Validation(msg)) => FieldErrors::form(msg),
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    let choices = state.blog.form_choices().await?;
    html(&form_page(
        &identity,
        "New post",
        "/posts/create/".to_string(),
        form,
        errors,
        choices,
    ))
}

fn edit_action(post_id: Uuid) -> String {
    format!("/posts/{post_id}/edit/")
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .editable_post(path.into_inner(), identity.user_id)
        .await?;
    let choices = state.blog.form_choices().await?;

    html(&form_page(
        &identity,
        "Edit post",
        edit_action(post.id),
        PostForm::from_post(&post),
        FieldErrors::new(),
        choices,
    ))
}

/// POST /posts/{post_id}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    // Non-authors are turned away before their input is looked at.
    state.blog.editable_post(post_id, identity.user_id).await?;

    let form = form.into_inner();
    let errors = match form.to_draft() {
        Ok(draft) => match state.blog.update_post(post_id, identity.user_id, draft).await {
            Ok(post) => return Ok(redirect(&post_url(post.id))),
            Err(MutationError::Domain(DomainError::Validation(msg))) => FieldErrors::form(msg),
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    let choices = state.blog.form_choices().await?;
    html(&form_page(
        &identity,
        "Edit post",
        edit_action(post_id),
        form,
        errors,
        choices,
    ))
}

/// GET /posts/{post_id}/delete/
pub async fn delete_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .editable_post(path.into_inner(), identity.user_id)
        .await?;

    html(&PostDeletePage {
        ctx: PageContext::from(&identity),
        post_id: post.id,
        title: post.title,
        text: post.text,
    })
}

/// POST /posts/{post_id}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .blog
        .delete_post(path.into_inner(), identity.user_id)
        .await?;
    Ok(redirect(&profile_url(&identity.username)))
}
