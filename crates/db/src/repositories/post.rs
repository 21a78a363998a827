//! Post repository.

use std::sync::Arc;

use crate::entities::{
    Post,
    post::{self, PostCategory, PostStatus},
};
use chrono::Utc;
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
    sea_query::{Expr, Order},
};

/// Sort order for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    /// Newest first.
    #[default]
    Latest,
    /// Oldest first.
    Oldest,
    /// Most viewed first.
    Popular,
    /// Most liked first.
    MostLiked,
    /// Most replied first.
    MostReplies,
}

impl PostSort {
    /// Parse a sort name. Unknown names fall back to [`PostSort::Latest`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "oldest" => Self::Oldest,
            "popular" => Self::Popular,
            "mostLiked" => Self::MostLiked,
            "mostReplies" => Self::MostReplies,
            _ => Self::Latest,
        }
    }
}

/// Filter for post listings.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Restrict to one category.
    pub category: Option<PostCategory>,
    /// Required status.
    pub status: PostStatus,
}

const LIKE_COUNT_SQL: &str = r#"(SELECT COUNT(*) FROM "vote" WHERE "vote"."target_type" = 'post' AND "vote"."target_id" = "post"."id" AND "vote"."kind" = 'like')"#;

const REPLY_COUNT_SQL: &str =
    r#"(SELECT COUNT(*) FROM "post_reply" WHERE "post_reply"."post_id" = "post"."id")"#;

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find posts by IDs, newest first.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<post::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Post::find()
            .filter(post::Column::Id.is_in(ids.to_vec()))
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post. Only columns set on the active model are written.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Replies go with it through the foreign key.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    fn filtered(filter: &PostFilter) -> Select<Post> {
        let mut query = Post::find().filter(post::Column::Status.eq(filter.status));

        if let Some(category) = filter.category {
            query = query.filter(post::Column::Category.eq(category));
        }

        query
    }

    /// Get one page of posts.
    pub async fn find_page(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        let query = Self::filtered(filter);

        let query = match sort {
            PostSort::Latest => query.order_by_desc(post::Column::CreatedAt),
            PostSort::Oldest => query.order_by_asc(post::Column::CreatedAt),
            PostSort::Popular => query
                .order_by_desc(post::Column::Views)
                .order_by_desc(post::Column::CreatedAt),
            PostSort::MostLiked => query
                .order_by(Expr::cust(LIKE_COUNT_SQL), Order::Desc)
                .order_by_desc(post::Column::CreatedAt),
            PostSort::MostReplies => query
                .order_by(Expr::cust(REPLY_COUNT_SQL), Order::Desc)
                .order_by_desc(post::Column::CreatedAt),
        };

        query
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts matching a filter.
    pub async fn count(&self, filter: &PostFilter) -> AppResult<u64> {
        Self::filtered(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List posts by author, newest first.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically increment the view counter.
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::Views, Expr::col(post::Column::Views).add(1))
            .col_expr(post::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Refresh `updated_at` after reply or vote activity.
    pub async fn touch(&self, id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
