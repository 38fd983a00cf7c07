//! Comment mutations. Every success goes back to the post page.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blogicum_shared::FieldErrors;
use blogicum_shared::forms::CommentForm;

use super::posts::detail_page;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::urls::{post_url, redirect};
use crate::views::{CommentDeletePage, CommentFormPage, PageContext, html};

/// POST /posts/{post_id}/comment/
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let form = form.into_inner();

    match form.to_text() {
        Ok(text) => {
            state
                .blog
                .add_comment(post_id, identity.user_id, text, Utc::now())
                .await?;
            Ok(redirect(&post_url(post_id)))
        }
        Err(errors) => {
            detail_page(
                &state,
                PageContext::from(&identity),
                Some(identity.user_id),
                post_id,
                form,
                errors,
            )
            .await
        }
    }
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .blog
        .editable_comment(post_id, comment_id, identity.user_id)
        .await?;

    html(&CommentFormPage {
        ctx: PageContext::from(&identity),
        post_id,
        comment_id,
        form: CommentForm::from_comment(&comment),
        errors: FieldErrors::new(),
    })
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .blog
        .editable_comment(post_id, comment_id, identity.user_id)
        .await?;

    let form = form.into_inner();
    match form.to_text() {
        Ok(text) => {
            state
                .blog
                .update_comment(post_id, comment_id, identity.user_id, text)
                .await?;
            Ok(redirect(&post_url(post_id)))
        }
        Err(errors) => html(&CommentFormPage {
            ctx: PageContext::from(&identity),
            post_id,
            comment_id,
            form,
            errors,
        }),
    }
}

/// GET /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state
        .blog
        .editable_comment(post_id, comment_id, identity.user_id)
        .await?;

    html(&CommentDeletePage {
        ctx: PageContext::from(&identity),
        post_id,
        comment_id,
        text: comment.text,
    })
}

/// POST /posts/{post_id}/delete_comment/{comment_id}/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .blog
        .delete_comment(post_id, comment_id, identity.user_id)
        .await?;
    Ok(redirect(&post_url(post_id)))
}
