//! Registration, login and logout.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use blogicum_core::domain::User;
use blogicum_core::error::RepoError;
use blogicum_core::ports::{BaseRepository, UserRepository};
use blogicum_shared::FieldErrors;
use blogicum_shared::forms::{LoginForm, RegistrationForm};

use crate::middleware::auth::{OptionalIdentity, cleared_session_cookie, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::urls::{profile_url, safe_next};
use crate::views::{LoginPage, PageContext, RegistrationPage, html};

const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";
const USERNAME_TAKEN: &str = "A user with that username already exists";

/// Redirect to `location` with a fresh session cookie for the user.
pub(super) fn signed_in(
    state: &AppState,
    user_id: Uuid,
    username: &str,
    location: &str,
) -> AppResult<HttpResponse> {
    let token = state
        .tokens
        .generate_token(user_id, username)
        .map_err(AppError::internal)?;
    let cookie = session_cookie(token, state.tokens.expiration_seconds(), state.cookie_secure);

    Ok(HttpResponse::Found()
        .cookie(cookie)
        .insert_header((header::LOCATION, location))
        .finish())
}

/// GET /auth/registration/
pub async fn registration_form(identity: OptionalIdentity) -> AppResult<HttpResponse> {
    html(&RegistrationPage {
        ctx: PageContext::from(&identity),
        form: RegistrationForm::default(),
        errors: FieldErrors::new(),
    })
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<RegistrationForm>,
) -> AppResult<HttpResponse> {
    let mut form = form.into_inner();
    let errors = match create_account(&state, &form).await? {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User registered");
            return signed_in(&state, user.id, &user.username, &profile_url(&user.username));
        }
        Err(errors) => errors,
    };

    form.password1.clear();
    form.password2.clear();
    html(&RegistrationPage {
        ctx: PageContext::from(&identity),
        form,
        errors,
    })
}

/// The outer error is a failure of the server, the inner one a form to fix.
async fn create_account(
    state: &AppState,
    form: &RegistrationForm,
) -> AppResult<Result<User, FieldErrors>> {
    if let Err(errors) = form.check() {
        return Ok(Err(errors));
    }

    let username = form.username.trim();
    if state.users.find_by_username(username).await?.is_some() {
        let mut errors = FieldErrors::new();
        errors.add("username", USERNAME_TAKEN);
        return Ok(Err(errors));
    }

    let hash = state
        .passwords
        .hash(&form.password1)
        .map_err(AppError::internal)?;
    let user = User::new(username.to_string(), form.email.trim().to_string(), hash);

    match state.users.save(user).await {
        Ok(user) => Ok(Ok(user)),
        // Lost a race with another registration of the same name.
        Err(RepoError::Constraint(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            Ok(Err(errors))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: String,
}

/// GET /auth/login/
pub async fn login_form(
    identity: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    let next = query.into_inner().next;
    html(&LoginPage {
        ctx: PageContext::from(&identity),
        form: LoginForm::default(),
        errors: FieldErrors::new(),
        next,
    })
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let mut form = form.into_inner();
    let errors = match form.check() {
        Ok(()) => match authenticate(&state, &form).await? {
            Some(user) => {
                tracing::info!(user_id = %user.id, "User logged in");
                let location = safe_next(&form.next).unwrap_or("/");
                return signed_in(&state, user.id, &user.username, location);
            }
            None => FieldErrors::form(BAD_CREDENTIALS),
        },
        Err(errors) => errors,
    };

    form.password.clear();
    let next = form.next.clone();
    html(&LoginPage {
        ctx: PageContext::from(&identity),
        form,
        errors,
        next,
    })
}

async fn authenticate(state: &AppState, form: &LoginForm) -> AppResult<Option<User>> {
    let Some(user) = state.users.find_by_username(form.username.trim()).await? else {
        tracing::debug!(username = %form.username, "Login for unknown user");
        return Ok(None);
    };

    let valid = state
        .passwords
        .verify(&form.password, &user.password_hash)
        .map_err(AppError::internal)?;
    Ok(valid.then_some(user))
}

/// POST /auth/logout/
pub async fn logout(identity: OptionalIdentity) -> HttpResponse {
    if let Some(user) = &identity.0 {
        tracing::info!(user_id = %user.user_id, "User logged out");
    }
    HttpResponse::Found()
        .cookie(cleared_session_cookie())
        .insert_header((header::LOCATION, "/"))
        .finish()
}
