//! Trending topic service.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use forum_common::{AppError, AppResult, IdGenerator};
use forum_db::{
    entities::{
        topic::{self, TopicStatus},
        topic_reply,
        vote::{VoteKind, VoteTarget},
    },
    repositories::{TopicReplyRepository, TopicRepository, TrendingFilter, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::trending::{Engagement, TimeRange, rank_page, score_at};
use super::view::{AuthorSummary, Pagination, ReplyInput, ReplyView, load_authors};
use super::vote::{VoteService, VoteState, VoteSummary};

/// Statuses shown by the trending feed when the caller names none.
pub const DEFAULT_STATUSES: [TopicStatus; 2] = [TopicStatus::Rising, TopicStatus::Trending];

/// Query for the trending feed.
#[derive(Debug, Clone)]
pub struct TrendingQuery {
    pub time_range: TimeRange,
    pub statuses: Vec<TopicStatus>,
    pub topic: Option<String>,
    pub pagination: Pagination,
}

impl Default for TrendingQuery {
    fn default() -> Self {
        Self {
            time_range: TimeRange::Day,
            statuses: DEFAULT_STATUSES.to_vec(),
            topic: None,
            pagination: Pagination::default(),
        }
    }
}

/// Input for creating a topic.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "Title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "Topic is required"))]
    pub topic: String,

    #[serde(default)]
    pub tags: Vec<String>,

    pub status: Option<TopicStatus>,
}

/// Input for updating a topic.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub topic: Option<String>,

    pub tags: Option<Vec<String>>,

    pub status: Option<TopicStatus>,
}

/// A topic as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub author: Option<AuthorSummary>,
    pub views: i64,
    pub trending_score: f64,
    pub trending_rank: Option<i32>,
    pub status: TopicStatus,
    #[serde(flatten)]
    pub votes: VoteSummary,
    pub replies_count: u64,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub last_activity_at: DateTime<FixedOffset>,
}

impl TopicView {
    fn build(
        model: topic::Model,
        author: Option<AuthorSummary>,
        votes: VoteSummary,
        replies_count: u64,
    ) -> Self {
        let tags = serde_json::from_value(model.tags).unwrap_or_default();
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            topic: model.topic,
            tags,
            author,
            views: model.views,
            trending_score: model.trending_score,
            trending_rank: model.trending_rank,
            status: model.status,
            votes,
            replies_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
            last_activity_at: model.last_activity_at,
        }
    }
}

/// A topic with its replies.
#[derive(Debug, Clone, Serialize)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub topic: TopicView,
    pub replies: Vec<ReplyView>,
}

/// One page of the trending feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPage {
    pub topics: Vec<TopicView>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_topics: u64,
}

/// Trending topic service for business logic.
#[derive(Clone)]
pub struct TopicService {
    topic_repo: TopicRepository,
    reply_repo: TopicReplyRepository,
    user_repo: UserRepository,
    vote_service: VoteService,
    id_gen: IdGenerator,
}

impl TopicService {
    /// Create a new topic service.
    #[must_use]
    pub const fn new(
        topic_repo: TopicRepository,
        reply_repo: TopicReplyRepository,
        user_repo: UserRepository,
        vote_service: VoteService,
    ) -> Self {
        Self {
            topic_repo,
            reply_repo,
            user_repo,
            vote_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get one page of the trending feed and run the ranking pass over it.
    ///
    /// Each topic on the page gets a fresh score and its 1-based position as
    /// rank, and both are persisted. The page keeps the order in which it was
    /// read. The first failed write aborts the request; rows already written
    /// keep their new values.
    pub async fn list_trending(
        &self,
        query: &TrendingQuery,
        viewer_id: Option<&str>,
    ) -> AppResult<TopicPage> {
        let now = Utc::now();
        let filter = TrendingFilter {
            since: query.time_range.since(now),
            statuses: query.statuses.clone(),
            topic: query.topic.clone(),
        };
        let pagination = query.pagination;

        let total = self.topic_repo.count_trending(&filter).await?;
        let mut topics = self
            .topic_repo
            .find_trending(&filter, pagination.offset(), pagination.limit)
            .await?;

        let ids: Vec<String> = topics.iter().map(|t| t.id.clone()).collect();
        let votes = self
            .vote_service
            .repository()
            .count_by_targets(VoteTarget::Topic, &ids)
            .await?;
        let replies = self.reply_repo.count_by_topics(&ids).await?;

        let ranked = rank_page(
            topics.iter().map(|t| {
                let engagement = Engagement {
                    likes: votes.get(&t.id).map_or(0, |c| c.likes),
                    replies: replies.get(&t.id).copied().unwrap_or(0),
                    views: t.views.max(0) as u64,
                };
                (engagement, t.created_at.with_timezone(&Utc))
            }),
            now,
        );

        for (topic, ranking) in topics.iter_mut().zip(&ranked) {
            self.topic_repo
                .update_ranking(&topic.id, ranking.score, ranking.rank)
                .await?;
            topic.trending_score = ranking.score;
            topic.trending_rank = Some(ranking.rank);
        }

        tracing::debug!(
            page = pagination.page,
            ranked = ranked.len(),
            total = total,
            "Ranked trending page"
        );

        let views = self.build_views(topics, &votes, &replies, viewer_id).await?;

        Ok(TopicPage {
            topics: views,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total),
            total_topics: total,
        })
    }

    /// Get a topic with its replies, counting the view and refreshing its score.
    pub async fn get_trending(&self, id: &str, viewer_id: Option<&str>) -> AppResult<TopicDetail> {
        let mut topic = self.topic_repo.get_by_id(id).await?;

        self.topic_repo.increment_views(id).await?;
        topic.views += 1;
        topic.trending_score = self.refresh_score(&topic).await?;

        let replies = self.reply_repo.find_by_topic(id).await?;
        let view = self.single_view(topic, viewer_id).await?;
        let replies = self.reply_views(replies, viewer_id).await?;

        Ok(TopicDetail {
            topic: view,
            replies,
        })
    }

    /// Create a topic authored by `author_id`.
    pub async fn create(&self, author_id: &str, input: CreateTopicInput) -> AppResult<TopicView> {
        input.validate()?;

        let now = Utc::now();
        let model = topic::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            content: Set(input.content),
            topic: Set(input.topic),
            author_id: Set(author_id.to_string()),
            tags: Set(serde_json::json!(input.tags)),
            views: Set(0),
            trending_score: Set(0.0),
            trending_rank: Set(None),
            status: Set(input.status.unwrap_or_default()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            last_activity_at: Set(now.into()),
        };

        let topic = self.topic_repo.create(model).await?;
        tracing::debug!(topic_id = %topic.id, author_id = %author_id, "Created topic");

        let author = self
            .user_repo
            .find_by_id(author_id)
            .await?
            .map(|u| AuthorSummary::from(&u));

        Ok(TopicView::build(topic, author, VoteSummary::default(), 0))
    }

    /// Update a topic. Only its author may do so.
    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        input: UpdateTopicInput,
    ) -> AppResult<TopicView> {
        input.validate()?;

        let topic = self.topic_repo.get_by_id(id).await?;
        if topic.author_id != user_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let mut active: topic::ActiveModel = topic.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(content);
        }
        if let Some(subject) = input.topic {
            active.topic = Set(subject);
        }
        if let Some(tags) = input.tags {
            active.tags = Set(serde_json::json!(tags));
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.topic_repo.update(active).await?;
        self.single_view(updated, Some(user_id)).await
    }

    /// Delete a topic with its replies and every vote on them.
    pub async fn delete(&self, id: &str, user_id: &str) -> AppResult<()> {
        let topic = self.topic_repo.get_by_id(id).await?;
        if topic.author_id != user_id {
            return Err(AppError::Forbidden("Not authorized".to_string()));
        }

        let reply_ids = self.reply_repo.find_ids_by_topic(id).await?;
        let votes = self.vote_service.repository();
        votes
            .delete_for_targets(VoteTarget::TopicReply, &reply_ids)
            .await?;
        votes
            .delete_for_targets(VoteTarget::Topic, &[id.to_string()])
            .await?;
        self.topic_repo.delete(id).await?;

        tracing::debug!(topic_id = %id, replies = reply_ids.len(), "Deleted topic");
        Ok(())
    }

    /// Append a reply and refresh the topic's activity time and score.
    pub async fn add_reply(
        &self,
        topic_id: &str,
        user_id: &str,
        input: ReplyInput,
    ) -> AppResult<ReplyView> {
        input.validate()?;

        let topic = self.topic_repo.get_by_id(topic_id).await?;

        let model = topic_reply::ActiveModel {
            id: Set(self.id_gen.generate()),
            topic_id: Set(topic_id.to_string()),
            author_id: Set(user_id.to_string()),
            content: Set(input.content),
            created_at: Set(Utc::now().into()),
        };
        let reply = self.reply_repo.create(model).await?;

        self.topic_repo.touch_activity(topic_id).await?;
        self.refresh_score(&topic).await?;

        let author = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .map(|u| AuthorSummary::from(&u));

        Ok(ReplyView {
            id: reply.id,
            content: reply.content,
            author,
            votes: VoteSummary::default(),
            created_at: reply.created_at,
        })
    }

    /// Toggle a like or dislike on a topic and return the updated topic.
    pub async fn toggle_vote(
        &self,
        topic_id: &str,
        user_id: &str,
        kind: VoteKind,
    ) -> AppResult<TopicView> {
        let mut topic = self.topic_repo.get_by_id(topic_id).await?;

        let votes = self
            .vote_service
            .toggle(user_id, VoteTarget::Topic, topic_id, kind)
            .await?;
        let touched_at = self.topic_repo.touch_activity(topic_id).await?;
        topic.last_activity_at = touched_at;
        topic.updated_at = touched_at;
        topic.trending_score = self.refresh_score(&topic).await?;

        let replies_count = self.reply_repo.count_by_topic(topic_id).await?;
        let author = self
            .user_repo
            .find_by_id(&topic.author_id)
            .await?
            .map(|u| AuthorSummary::from(&u));

        Ok(TopicView::build(topic, author, votes, replies_count))
    }

    /// Toggle a like or dislike on a reply of a topic.
    pub async fn toggle_reply_vote(
        &self,
        topic_id: &str,
        reply_id: &str,
        user_id: &str,
        kind: VoteKind,
    ) -> AppResult<VoteSummary> {
        let topic = self.topic_repo.get_by_id(topic_id).await?;
        self.reply_repo.get_in_topic(topic_id, reply_id).await?;

        let summary = self
            .vote_service
            .toggle(user_id, VoteTarget::TopicReply, reply_id, kind)
            .await?;
        self.topic_repo.touch_activity(topic_id).await?;
        self.refresh_score(&topic).await?;

        Ok(summary)
    }

    /// Recompute and persist a topic's score from current counts.
    async fn refresh_score(&self, topic: &topic::Model) -> AppResult<f64> {
        let votes = self
            .vote_service
            .repository()
            .count_for_target(VoteTarget::Topic, &topic.id)
            .await?;
        let replies = self.reply_repo.count_by_topic(&topic.id).await?;

        let engagement = Engagement {
            likes: votes.likes,
            replies,
            views: topic.views.max(0) as u64,
        };
        let score = score_at(engagement, topic.created_at.with_timezone(&Utc), Utc::now());

        self.topic_repo.update_score(&topic.id, score).await?;
        Ok(score)
    }

    async fn single_view(
        &self,
        topic: topic::Model,
        viewer_id: Option<&str>,
    ) -> AppResult<TopicView> {
        let ids = vec![topic.id.clone()];
        let votes = self
            .vote_service
            .repository()
            .count_by_targets(VoteTarget::Topic, &ids)
            .await?;
        let replies = self.reply_repo.count_by_topics(&ids).await?;

        let mut views = self
            .build_views(vec![topic], &votes, &replies, viewer_id)
            .await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Topic view missing".to_string()))
    }

    async fn build_views(
        &self,
        topics: Vec<topic::Model>,
        votes: &HashMap<String, forum_db::repositories::VoteCounts>,
        replies: &HashMap<String, u64>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<TopicView>> {
        let ids: Vec<String> = topics.iter().map(|t| t.id.clone()).collect();
        let own_votes = match viewer_id {
            Some(viewer) => {
                self.vote_service
                    .repository()
                    .kinds_for_user(viewer, VoteTarget::Topic, &ids)
                    .await?
            }
            None => HashMap::new(),
        };
        let authors = load_authors(&self.user_repo, topics.iter().map(|t| t.author_id.clone()))
            .await?;

        Ok(topics
            .into_iter()
            .map(|t| {
                let counts = votes.get(&t.id).copied().unwrap_or_default();
                let state = VoteState::from_kind(own_votes.get(&t.id).copied());
                let replies_count = replies.get(&t.id).copied().unwrap_or(0);
                let author = authors.get(&t.author_id).cloned();
                TopicView::build(
                    t,
                    author,
                    VoteSummary::new(counts.likes, counts.dislikes, state),
                    replies_count,
                )
            })
            .collect())
    }

    async fn reply_views(
        &self,
        replies: Vec<topic_reply::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<ReplyView>> {
        let ids: Vec<String> = replies.iter().map(|r| r.id.clone()).collect();
        let votes = self.vote_service.repository();
        let counts = votes.count_by_targets(VoteTarget::TopicReply, &ids).await?;
        let own_votes = match viewer_id {
            Some(viewer) => {
                votes
                    .kinds_for_user(viewer, VoteTarget::TopicReply, &ids)
                    .await?
            }
            None => HashMap::new(),
        };
        let authors =
            load_authors(&self.user_repo, replies.iter().map(|r| r.author_id.clone())).await?;

        Ok(replies
            .into_iter()
            .map(|r| {
                let c = counts.get(&r.id).copied().unwrap_or_default();
                let state = VoteState::from_kind(own_votes.get(&r.id).copied());
                ReplyView {
                    author: authors.get(&r.author_id).cloned(),
                    votes: VoteSummary::new(c.likes, c.dislikes, state),
                    id: r.id,
                    content: r.content,
                    created_at: r.created_at,
                }
            })
            .collect())
    }
}
