//! Vote repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{
    Vote,
    vote::{self, VoteKind, VoteTarget},
};
use forum_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
    sea_query::{Expr, OnConflict},
};

#[derive(Debug, FromQueryResult)]
struct VoteCountRow {
    target_id: String,
    kind: VoteKind,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct VoteKindRow {
    target_id: String,
    kind: VoteKind,
}

/// Like and dislike totals for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteCounts {
    /// Number of likes.
    pub likes: u64,
    /// Number of dislikes.
    pub dislikes: u64,
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote on a target.
    pub async fn find(
        &self,
        user_id: &str,
        target_type: VoteTarget,
        target_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a vote, or switch the kind of the user's existing vote.
    pub async fn upsert(&self, model: vote::ActiveModel) -> AppResult<()> {
        Vote::insert(model)
            .on_conflict(
                OnConflict::columns([
                    vote::Column::UserId,
                    vote::Column::TargetType,
                    vote::Column::TargetId,
                ])
                .update_column(vote::Column::Kind)
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Remove a user's vote on a target.
    pub async fn delete(
        &self,
        user_id: &str,
        target_type: VoteTarget,
        target_id: &str,
    ) -> AppResult<()> {
        Vote::delete_many()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::TargetId.eq(target_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Remove every vote on the given targets.
    pub async fn delete_for_targets(
        &self,
        target_type: VoteTarget,
        target_ids: &[String],
    ) -> AppResult<()> {
        if target_ids.is_empty() {
            return Ok(());
        }

        Vote::delete_many()
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::TargetId.is_in(target_ids.to_vec()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Count likes and dislikes for each target.
    ///
    /// Targets without votes are absent from the map.
    pub async fn count_by_targets(
        &self,
        target_type: VoteTarget,
        target_ids: &[String],
    ) -> AppResult<HashMap<String, VoteCounts>> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Vote::find()
            .select_only()
            .column(vote::Column::TargetId)
            .column(vote::Column::Kind)
            .column_as(Expr::col(vote::Column::Id).count(), "count")
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::TargetId.is_in(target_ids.to_vec()))
            .group_by(vote::Column::TargetId)
            .group_by(vote::Column::Kind)
            .into_model::<VoteCountRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut counts: HashMap<String, VoteCounts> = HashMap::new();
        for row in rows {
            let entry = counts.entry(row.target_id).or_default();
            let count = row.count.max(0) as u64;
            match row.kind {
                VoteKind::Like => entry.likes = count,
                VoteKind::Dislike => entry.dislikes = count,
            }
        }

        Ok(counts)
    }

    /// Count likes and dislikes for a single target.
    pub async fn count_for_target(
        &self,
        target_type: VoteTarget,
        target_id: &str,
    ) -> AppResult<VoteCounts> {
        let counts = self
            .count_by_targets(target_type, &[target_id.to_string()])
            .await?;
        Ok(counts.get(target_id).copied().unwrap_or_default())
    }

    /// Get the kind of vote a user has cast on each of the given targets.
    pub async fn kinds_for_user(
        &self,
        user_id: &str,
        target_type: VoteTarget,
        target_ids: &[String],
    ) -> AppResult<HashMap<String, VoteKind>> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = Vote::find()
            .select_only()
            .column(vote::Column::TargetId)
            .column(vote::Column::Kind)
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::TargetId.is_in(target_ids.to_vec()))
            .into_model::<VoteKindRow>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.target_id, row.kind))
            .collect())
    }

    /// List IDs of targets a user has voted on with the given kind.
    pub async fn target_ids_by_user(
        &self,
        user_id: &str,
        target_type: VoteTarget,
        kind: VoteKind,
    ) -> AppResult<Vec<String>> {
        Vote::find()
            .select_only()
            .column(vote::Column::TargetId)
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::Kind.eq(kind))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn count_row(target_id: &str, kind: &str, count: i64) -> BTreeMap<&'static str, Value> {
        btreemap! {
            "target_id" => Value::from(target_id.to_string()),
            "kind" => Value::from(kind.to_string()),
            "count" => Value::from(count),
        }
    }

    #[tokio::test]
    async fn test_count_by_targets_groups_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    count_row("t1", "like", 3),
                    count_row("t1", "dislike", 1),
                    count_row("t2", "dislike", 2),
                ]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let counts = repo
            .count_by_targets(VoteTarget::Topic, &["t1".to_string(), "t2".to_string()])
            .await
            .unwrap();

        assert_eq!(counts["t1"], VoteCounts { likes: 3, dislikes: 1 });
        assert_eq!(counts["t2"], VoteCounts { likes: 0, dislikes: 2 });
    }

    #[tokio::test]
    async fn test_count_for_target_without_votes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let counts = repo.count_for_target(VoteTarget::Post, "p1").await.unwrap();

        assert_eq!(counts, VoteCounts::default());
    }

    #[tokio::test]
    async fn test_delete_for_no_targets_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VoteRepository::new(db);
        repo.delete_for_targets(VoteTarget::PostReply, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_kinds_for_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "target_id" => Value::from("r1".to_string()),
                    "kind" => Value::from("dislike".to_string()),
                }]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let kinds = repo
            .kinds_for_user("u1", VoteTarget::TopicReply, &["r1".to_string(), "r2".to_string()])
            .await
            .unwrap();

        assert_eq!(kinds.get("r1"), Some(&VoteKind::Dislike));
        assert!(!kinds.contains_key("r2"));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        repo.delete("u1", VoteTarget::Topic, "t1").await.unwrap();
    }
}
