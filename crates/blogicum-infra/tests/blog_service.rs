//! Blog service scenarios over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Post, PostDraft, ProfileChanges, User};
use blogicum_core::ports::BaseRepository;
use blogicum_core::{BlogService, DomainError, MutationError, PageRequest, Viewer};
use blogicum_infra::InMemoryStore;

struct Fixture {
    store: InMemoryStore,
    service: BlogService,
    now: DateTime<Utc>,
}

impl Fixture {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let shared = Arc::new(store.clone());
        let service = BlogService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared,
        );
        Self {
            store,
            service,
            now: Utc::now(),
        }
    }

    async fn user(&self, username: &str) -> User {
        self.store
            .save(User::new(
                username.to_string(),
                format!("{username}@example.com"),
                "hash".to_string(),
            ))
            .await
            .unwrap()
    }

    async fn category(&self, slug: &str, is_published: bool) -> Category {
        let mut category = Category::new(slug.to_uppercase(), String::new(), slug.to_string());
        category.is_published = is_published;
        self.store.save(category).await.unwrap()
    }

    async fn post(&self, author: &User, draft: PostDraft) -> Post {
        self.store.save(Post::new(author.id, draft)).await.unwrap()
    }

    fn draft(&self, title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            text: "Some text".to_string(),
            pub_date: self.now - TimeDelta::hours(1),
            category_id: None,
            location_id: None,
            is_published: true,
        }
    }
}

fn page(n: u64) -> PageRequest {
    PageRequest::new(n).unwrap()
}

#[tokio::test]
async fn test_index_paginates_by_ten() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    for i in 0..25 {
        let mut draft = fx.draft(&format!("post {i}"));
        draft.pub_date = fx.now - TimeDelta::minutes(i + 1);
        fx.post(&anna, draft).await;
    }

    let mut sizes = Vec::new();
    for n in 1..=3 {
        let listing = fx.service.list_visible_posts(fx.now, page(n)).await.unwrap();
        sizes.push(listing.items.len());
    }
    assert_eq!(sizes, vec![10, 10, 5]);

    let first = fx.service.list_visible_posts(fx.now, page(1)).await.unwrap();
    assert_eq!(first.items[0].post.title, "post 0");
    assert_eq!(first.num_pages(), 3);

    let past_end = fx.service.list_visible_posts(fx.now, page(4)).await;
    assert!(matches!(past_end, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_post_published_exactly_now_is_listed() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let mut draft = fx.draft("on time");
    draft.pub_date = fx.now;
    fx.post(&anna, draft).await;

    let listing = fx.service.list_visible_posts(fx.now, page(1)).await.unwrap();
    assert_eq!(listing.items.len(), 1);
}

#[tokio::test]
async fn test_hidden_posts_are_left_out_of_index() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let hidden = fx.category("hidden", false).await;

    let mut unpublished = fx.draft("unpublished");
    unpublished.is_published = false;
    fx.post(&anna, unpublished).await;

    let mut scheduled = fx.draft("scheduled");
    scheduled.pub_date = fx.now + TimeDelta::days(1);
    fx.post(&anna, scheduled).await;

    let mut in_hidden = fx.draft("in hidden category");
    in_hidden.category_id = Some(hidden.id);
    fx.post(&anna, in_hidden).await;

    fx.post(&anna, fx.draft("visible")).await;

    let listing = fx.service.list_visible_posts(fx.now, page(1)).await.unwrap();
    let titles: Vec<&str> = listing.items.iter().map(|s| s.post.title.as_str()).collect();
    assert_eq!(titles, vec!["visible"]);
}

#[tokio::test]
async fn test_unpublished_category_page_is_not_found_but_author_still_sees_post() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let hidden = fx.category("hidden", false).await;
    let mut draft = fx.draft("filed away");
    draft.category_id = Some(hidden.id);
    let post = fx.post(&anna, draft).await;

    let category_page = fx.service.category_posts("hidden", fx.now, page(1)).await;
    assert!(matches!(category_page, Err(DomainError::NotFound { .. })));

    let (detail, _) = fx
        .service
        .post_detail(post.id, &Viewer::User(anna.id), fx.now)
        .await
        .unwrap();
    assert_eq!(detail.post.id, post.id);

    let anonymous = fx.service.post_detail(post.id, &Viewer::Anonymous, fx.now).await;
    assert!(matches!(anonymous, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_category_page_lists_only_its_public_posts() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let travel = fx.category("travel", true).await;
    let food = fx.category("food", true).await;

    let mut trip = fx.draft("trip");
    trip.category_id = Some(travel.id);
    fx.post(&anna, trip).await;

    let mut draft_trip = fx.draft("draft trip");
    draft_trip.category_id = Some(travel.id);
    draft_trip.is_published = false;
    fx.post(&anna, draft_trip).await;

    let mut soup = fx.draft("soup");
    soup.category_id = Some(food.id);
    fx.post(&anna, soup).await;

    let (category, listing) = fx
        .service
        .category_posts("travel", fx.now, page(1))
        .await
        .unwrap();
    assert_eq!(category.id, travel.id);
    let titles: Vec<&str> = listing.items.iter().map(|s| s.post.title.as_str()).collect();
    assert_eq!(titles, vec!["trip"]);
}

#[tokio::test]
async fn test_anonymous_viewer_gets_not_found_for_unpublished_post() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let mut draft = fx.draft("secret");
    draft.is_published = false;
    let post = fx.post(&anna, draft).await;

    let result = fx.service.post_detail(post.id, &Viewer::Anonymous, fx.now).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));

    let bob = fx.user("bob").await;
    let result = fx
        .service
        .post_detail(post.id, &Viewer::User(bob.id), fx.now)
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_non_author_cannot_edit_comment() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let bob = fx.user("bob").await;
    let post = fx.post(&anna, fx.draft("post")).await;
    let comment = fx
        .service
        .add_comment(post.id, anna.id, "original".to_string(), fx.now)
        .await
        .unwrap();

    let result = fx
        .service
        .update_comment(post.id, comment.id, bob.id, "hijacked".to_string())
        .await;
    match result {
        Err(MutationError::Denied(denied)) => assert_eq!(denied.post_id, post.id),
        other => panic!("expected denial, got {other:?}"),
    }

    let stored: Option<Comment> = fx.store.find_by_id(comment.id).await.unwrap();
    assert_eq!(stored.unwrap().text, "original");

    let result = fx.service.delete_comment(post.id, comment.id, bob.id).await;
    assert!(matches!(result, Err(MutationError::Denied(_))));
}

#[tokio::test]
async fn test_comment_addressed_through_other_post_is_not_found() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let first = fx.post(&anna, fx.draft("first")).await;
    let second = fx.post(&anna, fx.draft("second")).await;
    let comment = fx
        .service
        .add_comment(first.id, anna.id, "hi".to_string(), fx.now)
        .await
        .unwrap();

    let result = fx.service.editable_comment(second.id, comment.id, anna.id).await;
    assert!(matches!(
        result,
        Err(MutationError::Domain(DomainError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_non_author_cannot_edit_or_delete_post() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let bob = fx.user("bob").await;
    let post = fx.post(&anna, fx.draft("mine")).await;

    let result = fx
        .service
        .update_post(post.id, bob.id, fx.draft("stolen"))
        .await;
    assert!(matches!(result, Err(MutationError::Denied(_))));

    let result = fx.service.delete_post(post.id, bob.id).await;
    assert!(matches!(result, Err(MutationError::Denied(_))));

    let stored: Option<Post> = fx.store.find_by_id(post.id).await.unwrap();
    assert_eq!(stored.unwrap().title, "mine");
}

#[tokio::test]
async fn test_author_updates_and_deletes_post() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let post = fx.post(&anna, fx.draft("before")).await;
    let comment = fx
        .service
        .add_comment(post.id, anna.id, "hi".to_string(), fx.now)
        .await
        .unwrap();

    let updated = fx
        .service
        .update_post(post.id, anna.id, fx.draft("after"))
        .await
        .unwrap();
    assert_eq!(updated.title, "after");
    assert_eq!(updated.created_at, post.created_at);

    fx.service.delete_post(post.id, anna.id).await.unwrap();
    let stored: Option<Comment> = fx.store.find_by_id(comment.id).await.unwrap();
    assert!(stored.is_none());
}

#[tokio::test]
async fn test_cannot_comment_on_hidden_post() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let bob = fx.user("bob").await;
    let mut draft = fx.draft("scheduled");
    draft.pub_date = fx.now + TimeDelta::hours(3);
    let post = fx.post(&anna, draft).await;

    let result = fx
        .service
        .add_comment(post.id, bob.id, "early".to_string(), fx.now)
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_listing_is_repeatable() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    for i in 0..12 {
        fx.post(&anna, fx.draft(&format!("post {i}"))).await;
    }

    let ids = |listing: blogicum_core::Page<blogicum_core::domain::PostSummary>| {
        listing.items.into_iter().map(|s| s.post.id).collect::<Vec<Uuid>>()
    };
    let first = ids(fx.service.list_visible_posts(fx.now, page(2)).await.unwrap());
    let second = ids(fx.service.list_visible_posts(fx.now, page(2)).await.unwrap());
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn test_profile_owner_sees_every_post_with_comment_counts() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let bob = fx.user("bob").await;

    let mut hidden = fx.draft("hidden");
    hidden.is_published = false;
    let hidden = fx.post(&anna, hidden).await;
    fx.post(&anna, fx.draft("public")).await;
    fx.post(&bob, fx.draft("bob's")).await;

    for _ in 0..2 {
        fx.service
            .add_comment(hidden.id, anna.id, "note".to_string(), fx.now)
            .await
            .unwrap();
    }

    let (_, own) = fx
        .service
        .profile_posts("anna", &Viewer::User(anna.id), fx.now, page(1))
        .await
        .unwrap();
    assert_eq!(own.total_items, 2);
    let hidden_summary = own
        .items
        .iter()
        .find(|s| s.post.id == hidden.id)
        .unwrap();
    assert_eq!(hidden_summary.comment_count, 2);

    let (_, seen_by_bob) = fx
        .service
        .profile_posts("anna", &Viewer::User(bob.id), fx.now, page(1))
        .await
        .unwrap();
    let titles: Vec<&str> = seen_by_bob.items.iter().map(|s| s.post.title.as_str()).collect();
    assert_eq!(titles, vec!["public"]);
}

#[tokio::test]
async fn test_profile_of_unknown_user_is_not_found() {
    let fx = Fixture::new();
    let result = fx
        .service
        .profile_posts("ghost", &Viewer::Anonymous, fx.now, page(1))
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_profile_update_rejects_taken_username() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    fx.user("bob").await;

    let changes = ProfileChanges {
        username: "bob".to_string(),
        email: "anna@example.com".to_string(),
        first_name: "Anna".to_string(),
        last_name: "Karenina".to_string(),
    };
    let result = fx.service.update_profile(anna.id, changes.clone()).await;
    assert!(matches!(result, Err(DomainError::Duplicate(_))));

    let renamed = fx
        .service
        .update_profile(
            anna.id,
            ProfileChanges {
                username: "anna_k".to_string(),
                ..changes
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.display_name(), "Anna Karenina");
}

#[tokio::test]
async fn test_create_post_rejects_unknown_category() {
    let fx = Fixture::new();
    let anna = fx.user("anna").await;
    let mut draft = fx.draft("lost");
    draft.category_id = Some(Uuid::new_v4());

    let result = fx.service.create_post(anna.id, draft).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}
