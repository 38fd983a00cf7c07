//! End-to-end page tests over in-memory storage.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use blogicum_core::domain::{Comment, Post, PostDraft, User};
use blogicum_core::ports::{BaseRepository, CommentRepository, PasswordService, TokenService};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};
use web_server::handlers::configure_routes;
use web_server::middleware::auth::SESSION_COOKIE;
use web_server::observability::{REQUEST_ID_HEADER, RequestIdMiddleware};
use web_server::state::AppState;

struct Site {
    store: InMemoryStore,
    tokens: Arc<JwtTokenService>,
    state: AppState,
}

impl Site {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let tokens = Arc::new(JwtTokenService::new(JwtConfig::default()));
        let state = AppState::in_memory(store.clone(), tokens.clone());
        Self {
            store,
            tokens,
            state,
        }
    }

    async fn user(&self, username: &str) -> User {
        self.user_with_password(username, "hash").await
    }

    async fn user_with_password(&self, username: &str, password_hash: &str) -> User {
        self.store
            .save(User::new(
                username.to_string(),
                format!("{username}@example.com"),
                password_hash.to_string(),
            ))
            .await
            .unwrap()
    }

    async fn post(&self, author: &User, title: &str, is_published: bool) -> Post {
        let draft = PostDraft {
            title: title.to_string(),
            text: "Body".to_string(),
            pub_date: Utc::now() - TimeDelta::hours(1),
            category_id: None,
            location_id: None,
            is_published,
        };
        self.store.save(Post::new(author.id, draft)).await.unwrap()
    }

    fn session(&self, user: &User) -> Cookie<'static> {
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }
}

macro_rules! app {
    ($site:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .app_data(web::Data::new($site.state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_rt::test]
async fn test_index_lists_published_posts() {
    let site = Site::new();
    let anna = site.user("anna").await;
    site.post(&anna, "Visible post", true).await;
    site.post(&anna, "Draft post", false).await;
    let app = app!(site);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Visible post"));
    assert!(!body.contains("Draft post"));
}

#[actix_rt::test]
async fn test_unpublished_post_is_hidden_from_everyone_but_its_author() {
    let site = Site::new();
    let anna = site.user("anna").await;
    let boris = site.user("boris").await;
    let post = site.post(&anna, "Draft", false).await;
    let app = app!(site);
    let uri = format!("/posts/{}/", post.id);

    let anonymous = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(
        test::call_service(&app, anonymous).await.status(),
        StatusCode::NOT_FOUND
    );

    let other = test::TestRequest::get()
        .uri(&uri)
        .cookie(site.session(&boris))
        .to_request();
    assert_eq!(
        test::call_service(&app, other).await.status(),
        StatusCode::NOT_FOUND
    );

    let author = test::TestRequest::get()
        .uri(&uri)
        .cookie(site.session(&anna))
        .to_request();
    assert_eq!(test::call_service(&app, author).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_create_page_sends_anonymous_visitors_to_login() {
    let site = Site::new();
    let app = app!(site);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/posts/create/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/posts/create/");
}

#[actix_rt::test]
async fn test_author_creates_post_and_lands_on_profile() {
    let site = Site::new();
    let anna = site.user("anna").await;
    let app = app!(site);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .cookie(site.session(&anna))
        .set_form([
            ("title", "Fresh"),
            ("text", "Words"),
            ("pub_date", "2024-01-01T10:00"),
            ("category", ""),
            ("location", ""),
            ("is_published", "on"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/anna/");
}

#[actix_rt::test]
async fn test_invalid_post_form_is_shown_again() {
    let site = Site::new();
    let anna = site.user("anna").await;
    let app = app!(site);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .cookie(site.session(&anna))
        .set_form([("title", ""), ("text", "Words"), ("pub_date", "soon")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Enter a valid date and time"));
}

#[actix_rt::test]
async fn test_non_author_comment_edit_redirects_to_post() {
    let site = Site::new();
    let anna = site.user("anna").await;
    let boris = site.user("boris").await;
    let post = site.post(&anna, "Open", true).await;
    let comment = site
        .store
        .save(Comment::new(post.id, anna.id, "original".to_string()))
        .await
        .unwrap();
    let app = app!(site);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", post.id, comment.id))
        .cookie(site.session(&boris))
        .set_form([("text", "hijacked")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = BaseRepository::<Comment, Uuid>::find_by_id(&site.store, comment.id)
        .await
        .unwrap();
    assert_eq!(stored.unwrap().text, "original");
}

#[actix_rt::test]
async fn test_comment_is_added_and_blank_comment_rejected() {
    let site = Site::new();
    let anna = site.user("anna").await;
    let boris = site.user("boris").await;
    let post = site.post(&anna, "Open", true).await;
    let app = app!(site);
    let uri = format!("/posts/{}/comment/", post.id);

    let blank = test::TestRequest::post()
        .uri(&uri)
        .cookie(site.session(&boris))
        .set_form([("text", "  ")])
        .to_request();
    let resp = test::call_service(&app, blank).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("This field is required."));

    let good = test::TestRequest::post()
        .uri(&uri)
        .cookie(site.session(&boris))
        .set_form([("text", "Nice post")])
        .to_request();
    let resp = test::call_service(&app, good).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let comments = site.store.list_for_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].comment.text, "Nice post");
}

#[actix_rt::test]
async fn test_listing_pages_out_of_range_are_not_found() {
    let site = Site::new();
    let anna = site.user("anna").await;
    for i in 0..15 {
        site.post(&anna, &format!("post {i}"), true).await;
    }
    let app = app!(site);

    let second = test::TestRequest::get().uri("/?page=2").to_request();
    assert_eq!(test::call_service(&app, second).await.status(), StatusCode::OK);

    let last = test::TestRequest::get().uri("/?page=last").to_request();
    assert_eq!(test::call_service(&app, last).await.status(), StatusCode::OK);

    let beyond = test::TestRequest::get().uri("/?page=3").to_request();
    assert_eq!(
        test::call_service(&app, beyond).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_unknown_pages_are_not_found() {
    let site = Site::new();
    let app = app!(site);

    for uri in [
        "/no/such/page/",
        "/posts/not-an-id/",
        "/category/missing/",
        "/profile/nobody/",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let random = format!("/posts/{}/", Uuid::new_v4());
    let resp = test::call_service(&app, test::TestRequest::get().uri(&random).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_registration_signs_the_user_in() {
    let site = Site::new();
    let app = app!(site);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_form([
            ("username", "leo"),
            ("email", "leo@example.com"),
            ("password1", "war-and-peace"),
            ("password2", "war-and-peace"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/leo/");
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));
}

#[actix_rt::test]
async fn test_login_follows_local_next_only() {
    let site = Site::new();
    let hash = Argon2PasswordService::new().hash("war-and-peace").unwrap();
    site.user_with_password("leo", &hash).await;
    let app = app!(site);

    let login = |next: &'static str| {
        test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([
                ("username", "leo"),
                ("password", "war-and-peace"),
                ("next", next),
            ])
            .to_request()
    };

    let resp = test::call_service(&app, login("/posts/create/")).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/posts/create/");

    let resp = test::call_service(&app, login("https://evil.example/")).await;
    assert_eq!(location(&resp), "/");
}

#[actix_rt::test]
async fn test_wrong_password_shows_form_error() {
    let site = Site::new();
    let hash = Argon2PasswordService::new().hash("war-and-peace").unwrap();
    site.user_with_password("leo", &hash).await;
    let app = app!(site);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "leo"), ("password", "anna-karenina")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().all(|c| c.name() != SESSION_COOKIE));
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Please enter a correct username and password."));
}

#[actix_rt::test]
async fn test_request_id_is_echoed_or_generated() {
    let site = Site::new();
    let app = app!(site);

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((REQUEST_ID_HEADER, "abc-123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "abc-123");

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((REQUEST_ID_HEADER, "bad id with spaces"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let generated = resp.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());
}

#[actix_rt::test]
async fn test_health_reports_memory_storage() {
    let site = Site::new();
    let app = app!(site);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}
