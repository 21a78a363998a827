//! Post reply repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{PostReply, post_reply};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

#[derive(Debug, FromQueryResult)]
struct ReplyCountRow {
    post_id: String,
    count: i64,
}

/// Post reply repository for database operations.
#[derive(Clone)]
pub struct PostReplyRepository {
    db: Arc<DatabaseConnection>,
}

impl PostReplyRepository {
    /// Create a new post reply repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get a reply that belongs to the given post.
    pub async fn get_in_post(&self, post_id: &str, reply_id: &str) -> AppResult<post_reply::Model> {
        PostReply::find_by_id(reply_id)
            .filter(post_reply::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::ReplyNotFound(reply_id.to_string()))
    }

    /// Append a reply.
    pub async fn create(&self, model: post_reply::ActiveModel) -> AppResult<post_reply::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List replies of a post in creation order.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<post_reply::Model>> {
        PostReply::find()
            .filter(post_reply::Column::PostId.eq(post_id))
            .order_by_asc(post_reply::Column::CreatedAt)
            .order_by_asc(post_reply::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find replies by IDs, newest first.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<post_reply::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        PostReply::find()
            .filter(post_reply::Column::Id.is_in(ids.to_vec()))
            .order_by_desc(post_reply::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reply IDs of a post.
    pub async fn find_ids_by_post(&self, post_id: &str) -> AppResult<Vec<String>> {
        PostReply::find()
            .select_only()
            .column(post_reply::Column::Id)
            .filter(post_reply::Column::PostId.eq(post_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of the distinct posts a user has replied to.
    pub async fn find_post_ids_by_author(&self, author_id: &str) -> AppResult<Vec<String>> {
        PostReply::find()
            .select_only()
            .column(post_reply::Column::PostId)
            .distinct()
            .filter(post_reply::Column::AuthorId.eq(author_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count replies for each of the given posts.
    ///
    /// Posts without replies are absent from the map.
    pub async fn count_by_posts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = PostReply::find()
            .select_only()
            .column(post_reply::Column::PostId)
            .column_as(Expr::col(post_reply::Column::Id).count(), "count")
            .filter(post_reply::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(post_reply::Column::PostId)
            .into_model::<ReplyCountRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.post_id, row.count.max(0) as u64))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_get_in_post_wrong_parent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post_reply::Model>::new()])
                .into_connection(),
        );

        let repo = PostReplyRepository::new(db);
        let result = repo.get_in_post("p2", "r1").await;

        assert!(matches!(result, Err(AppError::ReplyNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_post() {
        let reply = post_reply::Model {
            id: "r1".to_string(),
            post_id: "p1".to_string(),
            author_id: "u1".to_string(),
            content: "Agreed".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reply]])
                .into_connection(),
        );

        let repo = PostReplyRepository::new(db);
        let replies = repo.find_by_post("p1").await.unwrap();

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content, "Agreed");
    }
}
