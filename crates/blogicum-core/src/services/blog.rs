//! Blog use cases: listings, detail page and post/comment mutations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Category, Comment, CommentView, Location, Post, PostDetail, PostDraft, PostSummary,
    ProfileChanges, User,
};
use crate::error::{DomainError, MutationError};
use crate::pagination::{Page, PageRequest};
use crate::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use crate::visibility::{Authored, PostFilter, Viewer, authorize_mutation, can_view};

/// Options offered by the post form.
#[derive(Debug, Clone, Default)]
pub struct PostFormChoices {
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

/// Entry point for everything the blog pages do.
///
/// `now` is always passed in by the caller so a request evaluates every
/// rule against a single instant.
#[derive(Clone)]
pub struct BlogService {
    users: Arc<dyn UserRepository>,
    categories: Arc<dyn CategoryRepository>,
    locations: Arc<dyn LocationRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl BlogService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        categories: Arc<dyn CategoryRepository>,
        locations: Arc<dyn LocationRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            users,
            categories,
            locations,
            posts,
            comments,
        }
    }

    /// Publicly visible posts, newest first (index page).
    pub async fn list_visible_posts(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, DomainError> {
        self.listing(&PostFilter::public(now), page).await
    }

    /// Public posts of a published category. Unknown or unpublished
    /// categories are not found.
    pub async fn category_posts(
        &self,
        slug: &str,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(Category, Page<PostSummary>), DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let posts = self
            .listing(&PostFilter::public(now).in_category(category.id), page)
            .await?;
        Ok((category, posts))
    }

    /// Posts of a profile. The owner sees all of them, everyone else only
    /// the public ones.
    pub async fn profile_posts(
        &self,
        username: &str,
        viewer: &Viewer,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<(User, Page<PostSummary>), DomainError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let filter = if viewer.is(user.id) {
            PostFilter::own_posts(user.id)
        } else {
            PostFilter::public(now).by_author(user.id)
        };
        let posts = self.listing(&filter, page).await?;
        Ok((user, posts))
    }

    async fn listing(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, DomainError> {
        self.posts.list(filter, page).await?.ensure_in_range()
    }

    /// A post and its comments, if the viewer may see it.
    pub async fn post_detail(
        &self,
        post_id: Uuid,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<(PostDetail, Vec<CommentView>), DomainError> {
        let detail = self.visible_detail(post_id, viewer, now).await?;
        let comments = self.comments.list_for_post(post_id).await?;
        Ok((detail, comments))
    }

    async fn visible_detail(
        &self,
        post_id: Uuid,
        viewer: &Viewer,
        now: DateTime<Utc>,
    ) -> Result<PostDetail, DomainError> {
        self.posts
            .find_detail(post_id)
            .await?
            .filter(|d| can_view(&d.post, d.category.as_ref(), viewer, now))
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    pub async fn form_choices(&self) -> Result<PostFormChoices, DomainError> {
        Ok(PostFormChoices {
            categories: self.categories.list_all().await?,
            locations: self.locations.list_all().await?,
        })
    }

    pub async fn create_post(&self, author_id: Uuid, draft: PostDraft) -> Result<Post, DomainError> {
        self.check_references(&draft).await?;
        let post = self.posts.save(Post::new(author_id, draft)).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    async fn check_references(&self, draft: &PostDraft) -> Result<(), DomainError> {
        if let Some(id) = draft.category_id {
            if self.categories.find_by_id(id).await?.is_none() {
                return Err(DomainError::Validation(
                    "Selected category does not exist".to_string(),
                ));
            }
        }
        if let Some(id) = draft.location_id {
            if self.locations.find_by_id(id).await?.is_none() {
                return Err(DomainError::Validation(
                    "Selected location does not exist".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The post behind the edit and delete pages, if `actor` wrote it.
    pub async fn editable_post(&self, post_id: Uuid, actor: Uuid) -> Result<Post, MutationError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        guard(&post, actor)?;
        Ok(post)
    }

    pub async fn update_post(
        &self,
        post_id: Uuid,
        actor: Uuid,
        draft: PostDraft,
    ) -> Result<Post, MutationError> {
        let mut post = self.editable_post(post_id, actor).await?;
        self.check_references(&draft).await?;
        post.apply(draft);
        let post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Delete a post together with its comments.
    pub async fn delete_post(&self, post_id: Uuid, actor: Uuid) -> Result<Post, MutationError> {
        let post = self.editable_post(post_id, actor).await?;
        self.posts.delete(post.id).await?;
        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(post)
    }

    /// Comment on a post the author is allowed to see.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<Comment, DomainError> {
        self.visible_detail(post_id, &Viewer::User(author_id), now)
            .await?;
        let comment = self
            .comments
            .save(Comment::new(post_id, author_id, text))
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment added");
        Ok(comment)
    }

    /// The comment behind the edit and delete pages, if `actor` wrote it.
    /// A comment addressed through the wrong post is not found.
    pub async fn editable_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        actor: Uuid,
    ) -> Result<Comment, MutationError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;
        guard(&comment, actor)?;
        Ok(comment)
    }

    pub async fn update_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        actor: Uuid,
        text: String,
    ) -> Result<Comment, MutationError> {
        let mut comment = self.editable_comment(post_id, comment_id, actor).await?;
        comment.text = text;
        Ok(self.comments.save(comment).await?)
    }

    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        actor: Uuid,
    ) -> Result<Comment, MutationError> {
        let comment = self.editable_comment(post_id, comment_id, actor).await?;
        self.comments.delete(comment.id).await?;
        tracing::info!(comment_id = %comment.id, post_id = %post_id, "Comment deleted");
        Ok(comment)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<User, DomainError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;

        if changes.username != user.username
            && self.users.find_by_username(&changes.username).await?.is_some()
        {
            return Err(DomainError::Duplicate(
                "A user with that username already exists".to_string(),
            ));
        }

        user.apply(changes);
        Ok(self.users.save(user).await?)
    }
}

fn guard(entity: &impl Authored, actor: Uuid) -> Result<(), MutationError> {
    authorize_mutation(entity, actor).map_err(|denied| {
        tracing::info!(
            post_id = %entity.post_id(),
            actor = %actor,
            "Mutation denied to non-author"
        );
        MutationError::Denied(denied)
    })
}
