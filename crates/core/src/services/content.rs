//! Per-user content aggregation.

use chrono::{DateTime, FixedOffset};
use forum_common::AppResult;
use forum_db::{
    entities::{
        post::{self, PostCategory, PostStatus},
        post_reply,
        vote::{VoteKind, VoteTarget},
    },
    repositories::{PostReplyRepository, PostRepository, UserRepository, VoteRepository},
};
use serde::Serialize;

use super::view::{AuthorSummary, load_authors};

/// A post listed on a user's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    pub author: Option<AuthorSummary>,
    pub views: i64,
    pub status: PostStatus,
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub replies_count: u64,
    pub created_at: DateTime<FixedOffset>,
}

/// A post reply listed on a user's profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyItem {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub author: Option<AuthorSummary>,
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub created_at: DateTime<FixedOffset>,
}

/// Threads a user started and threads they replied to.
#[derive(Debug, Clone, Serialize)]
pub struct UserContent {
    pub threads: Vec<ContentItem>,
    pub responses: Vec<ContentItem>,
}

/// One entry of a user's liked content.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LikedItem {
    Post(ContentItem),
    Reply(ReplyItem),
}

/// Content service for profile pages.
#[derive(Clone)]
pub struct ContentService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    reply_repo: PostReplyRepository,
    vote_repo: VoteRepository,
}

impl ContentService {
    /// Create a new content service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        post_repo: PostRepository,
        reply_repo: PostReplyRepository,
        vote_repo: VoteRepository,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            reply_repo,
            vote_repo,
        }
    }

    /// Posts a user authored and posts they replied to, newest first.
    pub async fn user_content(&self, user_id: &str) -> AppResult<UserContent> {
        self.user_repo.get_by_id(user_id).await?;

        let threads = self.post_repo.find_by_author(user_id).await?;

        let replied_ids = self.reply_repo.find_post_ids_by_author(user_id).await?;
        let mut responses = self.post_repo.find_by_ids(&replied_ids).await?;
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(UserContent {
            threads: self.content_items(threads).await?,
            responses: self.content_items(responses).await?,
        })
    }

    /// Posts a user liked, followed by post replies they liked.
    pub async fn liked_content(&self, user_id: &str) -> AppResult<Vec<LikedItem>> {
        let post_ids = self
            .vote_repo
            .target_ids_by_user(user_id, VoteTarget::Post, VoteKind::Like)
            .await?;
        let mut posts = self.post_repo.find_by_ids(&post_ids).await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let reply_ids = self
            .vote_repo
            .target_ids_by_user(user_id, VoteTarget::PostReply, VoteKind::Like)
            .await?;
        let mut replies = self.reply_repo.find_by_ids(&reply_ids).await?;
        replies.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut items: Vec<LikedItem> = self
            .content_items(posts)
            .await?
            .into_iter()
            .map(LikedItem::Post)
            .collect();
        items.extend(
            self.reply_items(replies)
                .await?
                .into_iter()
                .map(LikedItem::Reply),
        );

        Ok(items)
    }

    async fn content_items(&self, posts: Vec<post::Model>) -> AppResult<Vec<ContentItem>> {
        let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let votes = self
            .vote_repo
            .count_by_targets(VoteTarget::Post, &ids)
            .await?;
        let replies = self.reply_repo.count_by_posts(&ids).await?;
        let authors =
            load_authors(&self.user_repo, posts.iter().map(|p| p.author_id.clone())).await?;

        Ok(posts
            .into_iter()
            .map(|p| {
                let counts = votes.get(&p.id).copied().unwrap_or_default();
                ContentItem {
                    author: authors.get(&p.author_id).cloned(),
                    likes_count: counts.likes,
                    dislikes_count: counts.dislikes,
                    replies_count: replies.get(&p.id).copied().unwrap_or(0),
                    id: p.id,
                    title: p.title,
                    content: p.content,
                    category: p.category,
                    views: p.views,
                    status: p.status,
                    created_at: p.created_at,
                }
            })
            .collect())
    }

    async fn reply_items(&self, replies: Vec<post_reply::Model>) -> AppResult<Vec<ReplyItem>> {
        let ids: Vec<String> = replies.iter().map(|r| r.id.clone()).collect();
        let votes = self
            .vote_repo
            .count_by_targets(VoteTarget::PostReply, &ids)
            .await?;
        let authors =
            load_authors(&self.user_repo, replies.iter().map(|r| r.author_id.clone())).await?;

        Ok(replies
            .into_iter()
            .map(|r| {
                let counts = votes.get(&r.id).copied().unwrap_or_default();
                ReplyItem {
                    author: authors.get(&r.author_id).cloned(),
                    likes_count: counts.likes,
                    dislikes_count: counts.dislikes,
                    id: r.id,
                    post_id: r.post_id,
                    content: r.content,
                    created_at: r.created_at,
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use forum_common::AppError;
    use forum_db::entities::user;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Value};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ContentService {
        let db = Arc::new(db);
        ContentService::new(
            UserRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            PostReplyRepository::new(Arc::clone(&db)),
            VoteRepository::new(db),
        )
    }

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            title: "Title".to_string(),
            content: "Body".to_string(),
            category: PostCategory::Music,
            author_id: "u1".to_string(),
            views: 7,
            is_sticky: false,
            status: PostStatus::Active,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_user_content_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let result = service(db).user_content("ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_liked_content_lists_posts_before_replies() {
        let reply = post_reply::Model {
            id: "r1".to_string(),
            post_id: "p9".to_string(),
            author_id: "u2".to_string(),
            content: "Agreed".to_string(),
            created_at: Utc::now().into(),
        };
        let no_rows: Vec<std::collections::BTreeMap<&str, Value>> = Vec::new();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // liked post ids
            .append_query_results([[btreemap! { "target_id" => Value::from("p1".to_string()) }]])
            .append_query_results([[create_test_post("p1")]])
            // liked reply ids
            .append_query_results([[btreemap! { "target_id" => Value::from("r1".to_string()) }]])
            .append_query_results([[reply]])
            // post vote counts, reply counts, authors
            .append_query_results([vec![btreemap! {
                "target_id" => Value::from("p1".to_string()),
                "kind" => Value::from("like".to_string()),
                "count" => Value::from(3_i64),
            }]])
            .append_query_results([no_rows.clone()])
            .append_query_results([Vec::<user::Model>::new()])
            // reply vote counts, authors
            .append_query_results([no_rows])
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let items = service(db).liked_content("u1").await.unwrap();

        assert_eq!(items.len(), 2);
        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(json[0]["type"], "post");
        assert_eq!(json[0]["likesCount"], 3);
        assert_eq!(json[0]["repliesCount"], 0);
        assert_eq!(json[1]["type"], "reply");
        assert_eq!(json[1]["postId"], "p9");
        assert_eq!(json[1]["likesCount"], 0);
    }
}
