//! Like/dislike toggles.

use chrono::Utc;
use forum_common::{AppResult, IdGenerator};
use forum_db::{
    entities::vote::{self, VoteKind, VoteTarget},
    repositories::VoteRepository,
};
use sea_orm::Set;
use serde::Serialize;

/// A user's vote on one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoteState {
    #[default]
    None,
    Liked,
    Disliked,
}

impl VoteState {
    /// State corresponding to a stored vote, if any.
    #[must_use]
    pub const fn from_kind(kind: Option<VoteKind>) -> Self {
        match kind {
            None => Self::None,
            Some(VoteKind::Like) => Self::Liked,
            Some(VoteKind::Dislike) => Self::Disliked,
        }
    }

    /// Stored vote kind for this state.
    #[must_use]
    pub const fn kind(self) -> Option<VoteKind> {
        match self {
            Self::None => None,
            Self::Liked => Some(VoteKind::Like),
            Self::Disliked => Some(VoteKind::Dislike),
        }
    }

    /// Like toggle: removes an existing like, otherwise likes
    /// (dropping any dislike).
    #[must_use]
    pub const fn toggle_like(self) -> Self {
        match self {
            Self::Liked => Self::None,
            Self::None | Self::Disliked => Self::Liked,
        }
    }

    /// Dislike toggle: removes an existing dislike, otherwise dislikes
    /// (dropping any like).
    #[must_use]
    pub const fn toggle_dislike(self) -> Self {
        match self {
            Self::Disliked => Self::None,
            Self::None | Self::Liked => Self::Disliked,
        }
    }

    /// Apply the toggle for `kind`.
    #[must_use]
    pub const fn toggle(self, kind: VoteKind) -> Self {
        match kind {
            VoteKind::Like => self.toggle_like(),
            VoteKind::Dislike => self.toggle_dislike(),
        }
    }
}

/// Vote totals of an item plus the caller's own vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSummary {
    pub likes: u64,
    pub dislikes: u64,
    pub user_liked: bool,
    pub user_disliked: bool,
}

impl VoteSummary {
    /// Combine counts with the caller's state.
    #[must_use]
    pub const fn new(likes: u64, dislikes: u64, state: VoteState) -> Self {
        Self {
            likes,
            dislikes,
            user_liked: matches!(state, VoteState::Liked),
            user_disliked: matches!(state, VoteState::Disliked),
        }
    }
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository) -> Self {
        Self {
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Access the underlying repository for read-side counting.
    #[must_use]
    pub const fn repository(&self) -> &VoteRepository {
        &self.vote_repo
    }

    /// Toggle a like or dislike and return the resulting summary.
    ///
    /// The write touches only the caller's vote row, so concurrent toggles
    /// by different users never overwrite each other.
    pub async fn toggle(
        &self,
        user_id: &str,
        target_type: VoteTarget,
        target_id: &str,
        kind: VoteKind,
    ) -> AppResult<VoteSummary> {
        let current = self
            .vote_repo
            .find(user_id, target_type, target_id)
            .await?
            .map(|v| v.kind);
        let next = VoteState::from_kind(current).toggle(kind);

        match next.kind() {
            None => {
                self.vote_repo.delete(user_id, target_type, target_id).await?;
            }
            Some(new_kind) => {
                let model = vote::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    target_type: Set(target_type),
                    target_id: Set(target_id.to_string()),
                    kind: Set(new_kind),
                    created_at: Set(Utc::now().into()),
                };
                self.vote_repo.upsert(model).await?;
            }
        }

        tracing::debug!(
            user_id = %user_id,
            target_id = %target_id,
            target_type = ?target_type,
            from = ?current,
            to = ?next.kind(),
            "Toggled vote"
        );

        let counts = self
            .vote_repo
            .count_for_target(target_type, target_id)
            .await?;

        Ok(VoteSummary::new(counts.likes, counts.dislikes, next))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    const ALL: [VoteState; 3] = [VoteState::None, VoteState::Liked, VoteState::Disliked];

    #[test]
    fn test_toggle_like_transitions() {
        assert_eq!(VoteState::None.toggle_like(), VoteState::Liked);
        assert_eq!(VoteState::Liked.toggle_like(), VoteState::None);
        assert_eq!(VoteState::Disliked.toggle_like(), VoteState::Liked);
    }

    #[test]
    fn test_toggle_dislike_transitions() {
        assert_eq!(VoteState::None.toggle_dislike(), VoteState::Disliked);
        assert_eq!(VoteState::Disliked.toggle_dislike(), VoteState::None);
        assert_eq!(VoteState::Liked.toggle_dislike(), VoteState::Disliked);
    }

    #[test]
    fn test_double_toggle_restores_unvoted_and_matching_states() {
        for kind in [VoteKind::Like, VoteKind::Dislike] {
            assert_eq!(VoteState::None.toggle(kind).toggle(kind), VoteState::None);
        }
        assert_eq!(
            VoteState::Liked.toggle_like().toggle_like(),
            VoteState::Liked
        );
        assert_eq!(
            VoteState::Disliked.toggle_dislike().toggle_dislike(),
            VoteState::Disliked
        );
    }

    #[test]
    fn test_never_both() {
        for state in ALL {
            for kind in [VoteKind::Like, VoteKind::Dislike] {
                let summary = VoteSummary::new(0, 0, state.toggle(kind));
                assert!(!(summary.user_liked && summary.user_disliked));
            }
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for state in ALL {
            assert_eq!(VoteState::from_kind(state.kind()), state);
        }
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_value(VoteSummary::new(2, 1, VoteState::Liked)).unwrap();
        assert_eq!(json["likes"], 2);
        assert_eq!(json["dislikes"], 1);
        assert_eq!(json["userLiked"], true);
        assert_eq!(json["userDisliked"], false);
    }

    #[tokio::test]
    async fn test_toggle_like_on_disliked_item() {
        let existing = vote::Model {
            id: "v1".to_string(),
            user_id: "u1".to_string(),
            target_type: VoteTarget::Post,
            target_id: "p1".to_string(),
            kind: VoteKind::Dislike,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([vec![btreemap! {
                    "target_id" => Value::from("p1".to_string()),
                    "kind" => Value::from("like".to_string()),
                    "count" => Value::from(1_i64),
                }]])
                .into_connection(),
        );

        let service = VoteService::new(VoteRepository::new(db));
        let summary = service
            .toggle("u1", VoteTarget::Post, "p1", VoteKind::Like)
            .await
            .unwrap();

        assert_eq!(
            summary,
            VoteSummary {
                likes: 1,
                dislikes: 0,
                user_liked: true,
                user_disliked: false,
            }
        );
    }
}
