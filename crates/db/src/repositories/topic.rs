//! Trending topic repository.

use std::sync::Arc;

use crate::entities::{
    Topic,
    topic::{self, TopicStatus},
};
use chrono::{DateTime, FixedOffset, Utc};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, sea_query::Expr,
};

/// Filter for the trending feed.
#[derive(Debug, Clone)]
pub struct TrendingFilter {
    /// Only topics created at or after this instant.
    pub since: DateTime<Utc>,
    /// Accepted statuses. Empty accepts all.
    pub statuses: Vec<TopicStatus>,
    /// Exact subject match.
    pub topic: Option<String>,
}

/// Trending topic repository for database operations.
#[derive(Clone)]
pub struct TopicRepository {
    db: Arc<DatabaseConnection>,
}

impl TopicRepository {
    /// Create a new topic repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a topic by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<topic::Model>> {
        Topic::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a topic by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<topic::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TopicNotFound(id.to_string()))
    }

    /// Create a new topic.
    pub async fn create(&self, model: topic::ActiveModel) -> AppResult<topic::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a topic. Only columns set on the active model are written.
    pub async fn update(&self, model: topic::ActiveModel) -> AppResult<topic::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a topic. Replies go with it through the foreign key.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Topic::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    fn trending_query(filter: &TrendingFilter) -> Select<Topic> {
        let mut query = Topic::find().filter(topic::Column::CreatedAt.gte(filter.since));

        if !filter.statuses.is_empty() {
            query = query.filter(topic::Column::Status.is_in(filter.statuses.clone()));
        }

        if let Some(subject) = &filter.topic {
            query = query.filter(topic::Column::Topic.eq(subject.as_str()));
        }

        query
    }

    /// Get one page of the trending feed, highest stored score first.
    pub async fn find_trending(
        &self,
        filter: &TrendingFilter,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<topic::Model>> {
        Self::trending_query(filter)
            .order_by_desc(topic::Column::TrendingScore)
            .order_by_desc(topic::Column::CreatedAt)
            .order_by_desc(topic::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count topics matching the trending filter.
    pub async fn count_trending(&self, filter: &TrendingFilter) -> AppResult<u64> {
        Self::trending_query(filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically increment the view counter.
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Topic::update_many()
            .col_expr(
                topic::Column::Views,
                Expr::col(topic::Column::Views).add(1),
            )
            .col_expr(topic::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(topic::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Persist a recomputed score.
    pub async fn update_score(&self, id: &str, score: f64) -> AppResult<()> {
        Topic::update_many()
            .col_expr(topic::Column::TrendingScore, Expr::value(score))
            .col_expr(topic::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(topic::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Persist a score together with its page-relative rank.
    pub async fn update_ranking(&self, id: &str, score: f64, rank: i32) -> AppResult<()> {
        Topic::update_many()
            .col_expr(topic::Column::TrendingScore, Expr::value(score))
            .col_expr(topic::Column::TrendingRank, Expr::value(rank))
            .col_expr(topic::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(topic::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Record reply or vote activity on a topic, returning the time written.
    pub async fn touch_activity(&self, id: &str) -> AppResult<DateTime<FixedOffset>> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Topic::update_many()
            .col_expr(topic::Column::LastActivityAt, Expr::value(now))
            .col_expr(topic::Column::UpdatedAt, Expr::value(now))
            .filter(topic::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(now)
    }
}
