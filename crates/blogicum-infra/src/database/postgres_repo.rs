//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use blogicum_core::domain::{
    AuthorRef, Category, CommentView, Location, PostDetail, PostSummary, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{PAGE_SIZE, Page, PageRequest, num_pages};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_core::visibility::{Audience, PostFilter};
use chrono::{DateTime, Utc};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_err};

pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// One repository per table, all sharing the same pool.
pub struct PostgresRepositories {
    pub users: Arc<PostgresUserRepository>,
    pub categories: Arc<PostgresCategoryRepository>,
    pub locations: Arc<PostgresLocationRepository>,
    pub posts: Arc<PostgresPostRepository>,
    pub comments: Arc<PostgresCommentRepository>,
}

impl PostgresRepositories {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self {
            users: Arc::new(PostgresBaseRepository::new(db.clone())),
            categories: Arc::new(PostgresBaseRepository::new(db.clone())),
            locations: Arc::new(PostgresBaseRepository::new(db.clone())),
            posts: Arc::new(PostgresBaseRepository::new(db.clone())),
            comments: Arc::new(PostgresBaseRepository::new(db)),
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// SQL form of `visibility::is_publicly_visible`. Needs the categories table
/// joined, which `find_also_related(CategoryEntity)` does with a LEFT JOIN.
fn public_condition(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(now.fixed_offset()))
        .add(
            Condition::any()
                .add(post::Column::CategoryId.is_null())
                .add(category::Column::IsPublished.eq(true)),
        )
}

/// Lower a [`PostFilter`] to a WHERE clause.
pub(crate) fn filter_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(author_id) = filter.author_id {
        condition = condition.add(post::Column::AuthorId.eq(author_id));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    match filter.audience {
        Audience::Public { now } => condition.add(public_condition(now)),
        Audience::Owner => condition,
    }
}

impl PostgresPostRepository {
    async fn authors(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, AuthorRef>, RepoError> {
        let users = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(users
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AuthorRef {
                        id: u.id,
                        username: u.username,
                    },
                )
            })
            .collect())
    }

    async fn locations(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, Location>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let locations = LocationEntity::find()
            .filter(location::Column::Id.is_in(ids))
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(locations.into_iter().map(|l| (l.id, l.into())).collect())
    }

    /// Total comments per post, unfiltered.
    async fn comment_counts(&self, post_ids: Vec<Uuid>) -> Result<HashMap<Uuid, u64>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "total")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple()
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|(post_id, count)| (post_id, count.max(0) as u64))
            .collect())
    }

    async fn summarize(
        &self,
        rows: Vec<(post::Model, Option<category::Model>)>,
    ) -> Result<Vec<PostSummary>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.id).collect();
        let author_ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.author_id).collect();
        let location_ids: Vec<Uuid> = rows.iter().filter_map(|(p, _)| p.location_id).collect();

        let authors = self.authors(author_ids).await?;
        let locations = self.locations(location_ids).await?;
        let counts = self.comment_counts(post_ids).await?;

        rows.into_iter()
            .map(|(post, category)| {
                let author = authors
                    .get(&post.author_id)
                    .cloned()
                    .ok_or_else(|| missing_author(&post))?;
                let location = post.location_id.and_then(|id| locations.get(&id).cloned());
                let comment_count = counts.get(&post.id).copied().unwrap_or(0);
                Ok(PostSummary {
                    post: post.into(),
                    author,
                    category: category.map(Into::into),
                    location,
                    comment_count,
                })
            })
            .collect()
    }
}

fn missing_author(post: &post::Model) -> RepoError {
    RepoError::Query(format!(
        "author {} of post {} does not exist",
        post.author_id, post.id
    ))
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_detail(&self, id: Uuid) -> Result<Option<PostDetail>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(CategoryEntity)
            .one(&*self.db)
            .await
            .map_err(query_err)?;

        let Some((post, category)) = row else {
            return Ok(None);
        };

        let author = UserEntity::find_by_id(post.author_id)
            .one(&*self.db)
            .await
            .map_err(query_err)?
            .ok_or_else(|| missing_author(&post))?;

        let location = match post.location_id {
            Some(location_id) => LocationEntity::find_by_id(location_id)
                .one(&*self.db)
                .await
                .map_err(query_err)?
                .map(Into::into),
            None => None,
        };

        Ok(Some(PostDetail {
            author: AuthorRef {
                id: author.id,
                username: author.username,
            },
            post: post.into(),
            category: category.map(Into::into),
            location,
        }))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostSummary>, RepoError> {
        tracing::debug!(?filter, ?page, "Listing posts");

        let paginator = PostEntity::find()
            .find_also_related(CategoryEntity)
            .filter(filter_condition(filter))
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .paginate(&*self.db, PAGE_SIZE);

        let total_items = paginator.num_items().await.map_err(query_err)?;
        let number = page.resolve(total_items);
        if number > num_pages(total_items) {
            return Ok(Page {
                items: Vec::new(),
                number,
                total_items,
            });
        }

        let rows = paginator
            .fetch_page(number - 1)
            .await
            .map_err(query_err)?;

        Ok(Page {
            items: self.summarize(rows).await?,
            number,
            total_items,
        })
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&*self.db)
            .await
            .map_err(query_err)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let author = author.ok_or_else(|| {
                    RepoError::Query(format!("author of comment {} does not exist", comment.id))
                })?;
                Ok(CommentView {
                    author: AuthorRef {
                        id: author.id,
                        username: author.username,
                    },
                    comment: comment.into(),
                })
            })
            .collect()
    }
}
