//! Profile page and profile editing.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blogicum_core::ports::BaseRepository;
use blogicum_core::{DomainError, PageRequest};
use blogicum_shared::FieldErrors;
use blogicum_shared::forms::ProfileForm;

use super::PageQuery;
use super::auth::signed_in;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::urls::profile_url;
use crate::views::{PageContext, PageNav, ProfileFormPage, ProfilePage, ProfileView, cards, html};

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(query.page.as_deref())?;
    let viewer = identity.viewer();
    let now = Utc::now();
    let (user, posts) = state
        .blog
        .profile_posts(&path.into_inner(), &viewer, now, page)
        .await?;

    html(&ProfilePage {
        ctx: PageContext::from(&identity),
        profile: ProfileView::from(&user),
        is_owner: viewer.is(user.id),
        posts: cards(&posts, now),
        nav: PageNav::from(&posts),
    })
}

/// GET /edit_profile/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", identity.user_id)))?;

    html(&ProfileFormPage {
        ctx: PageContext::from(&identity),
        form: ProfileForm::from_user(&user),
        errors: FieldErrors::new(),
    })
}

/// POST /edit_profile/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let errors = match form.to_changes() {
        Ok(changes) => match state.blog.update_profile(identity.user_id, changes).await {
            // The username lives in the session token, so a new one is issued.
            Ok(user) => {
                return signed_in(&state, user.id, &user.username, &profile_url(&user.username));
            }
            Err(DomainError::Duplicate(msg)) => {
                let mut errors = FieldErrors::new();
                errors.add("username", msg);
                errors
            }
            Err(e) => return Err(e.into()),
        },
        Err(errors) => errors,
    };

    html(&ProfileFormPage {
        ctx: PageContext::from(&identity),
        form,
        errors,
    })
}
