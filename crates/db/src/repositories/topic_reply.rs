//! Topic reply repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{TopicReply, topic_reply};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

#[derive(Debug, FromQueryResult)]
struct ReplyCountRow {
    topic_id: String,
    count: i64,
}

/// Topic reply repository for database operations.
#[derive(Clone)]
pub struct TopicReplyRepository {
    db: Arc<DatabaseConnection>,
}

impl TopicReplyRepository {
    /// Create a new topic reply repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get a reply that belongs to the given topic.
    pub async fn get_in_topic(
        &self,
        topic_id: &str,
        reply_id: &str,
    ) -> AppResult<topic_reply::Model> {
        TopicReply::find_by_id(reply_id)
            .filter(topic_reply::Column::TopicId.eq(topic_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::ReplyNotFound(reply_id.to_string()))
    }

    /// Append a reply.
    pub async fn create(&self, model: topic_reply::ActiveModel) -> AppResult<topic_reply::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List replies of a topic in creation order.
    pub async fn find_by_topic(&self, topic_id: &str) -> AppResult<Vec<topic_reply::Model>> {
        TopicReply::find()
            .filter(topic_reply::Column::TopicId.eq(topic_id))
            .order_by_asc(topic_reply::Column::CreatedAt)
            .order_by_asc(topic_reply::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List reply IDs of a topic.
    pub async fn find_ids_by_topic(&self, topic_id: &str) -> AppResult<Vec<String>> {
        TopicReply::find()
            .select_only()
            .column(topic_reply::Column::Id)
            .filter(topic_reply::Column::TopicId.eq(topic_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count replies of a topic.
    pub async fn count_by_topic(&self, topic_id: &str) -> AppResult<u64> {
        TopicReply::find()
            .filter(topic_reply::Column::TopicId.eq(topic_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count replies for each of the given topics.
    ///
    /// Topics without replies are absent from the map.
    pub async fn count_by_topics(&self, topic_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if topic_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = TopicReply::find()
            .select_only()
            .column(topic_reply::Column::TopicId)
            .column_as(Expr::col(topic_reply::Column::Id).count(), "count")
            .filter(topic_reply::Column::TopicId.is_in(topic_ids.to_vec()))
            .group_by(topic_reply::Column::TopicId)
            .into_model::<ReplyCountRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.topic_id, row.count.max(0) as u64))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_reply(id: &str, topic_id: &str) -> topic_reply::Model {
        topic_reply::Model {
            id: id.to_string(),
            topic_id: topic_id.to_string(),
            author_id: "user1".to_string(),
            content: "Nice".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_in_topic_found() {
        let reply = create_test_reply("r1", "t1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reply.clone()]])
                .into_connection(),
        );

        let repo = TopicReplyRepository::new(db);
        let found = repo.get_in_topic("t1", "r1").await.unwrap();

        assert_eq!(found.id, "r1");
    }

    #[tokio::test]
    async fn test_get_in_topic_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<topic_reply::Model>::new()])
                .into_connection(),
        );

        let repo = TopicReplyRepository::new(db);
        let result = repo.get_in_topic("t1", "r9").await;

        assert!(matches!(result, Err(AppError::ReplyNotFound(_))));
    }

    #[tokio::test]
    async fn test_count_by_topics() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "topic_id" => Value::from("t1".to_string()),
                    "count" => Value::from(4_i64),
                }]])
                .into_connection(),
        );

        let repo = TopicReplyRepository::new(db);
        let counts = repo
            .count_by_topics(&["t1".to_string(), "t2".to_string()])
            .await
            .unwrap();

        assert_eq!(counts.get("t1"), Some(&4));
        assert_eq!(counts.get("t2"), None);
    }
}
