//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `forum_test`)
//!   `TEST_DB_PASSWORD` (default: `forum_test`)
//!   `TEST_DB_NAME` (default: `forum_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use forum_common::AppError;
use forum_db::entities::{
    topic::{self, TopicStatus},
    user::{self, UserRole},
    vote::{self, VoteKind, VoteTarget},
};
use forum_db::repositories::{
    TopicReplyRepository, TopicRepository, TrendingFilter, UserRepository, VoteRepository,
};
use forum_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

async fn seed_user(users: &UserRepository, id: &str) -> user::Model {
    users
        .create(user::ActiveModel {
            id: Set(id.to_string()),
            name: Set(format!("User {id}")),
            email: Set(format!("{id}@example.com")),
            password_hash: Set("hash".to_string()),
            bio: Set(None),
            image: Set(user::DEFAULT_IMAGE.to_string()),
            role: Set(UserRole::User),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        })
        .await
        .unwrap()
}

async fn seed_topic(
    topics: &TopicRepository,
    id: &str,
    author_id: &str,
    score: f64,
    age: Duration,
) -> topic::Model {
    let created_at = Utc::now() - age;
    topics
        .create(topic::ActiveModel {
            id: Set(id.to_string()),
            title: Set(format!("Topic {id}")),
            content: Set("content".to_string()),
            topic: Set("rust".to_string()),
            author_id: Set(author_id.to_string()),
            tags: Set(serde_json::json!([])),
            views: Set(0),
            trending_score: Set(score),
            trending_rank: Set(None),
            status: Set(TopicStatus::Rising),
            created_at: Set(created_at.into()),
            updated_at: Set(created_at.into()),
            last_activity_at: Set(created_at.into()),
        })
        .await
        .unwrap()
}

fn vote_model(id: &str, user_id: &str, target_id: &str, kind: VoteKind) -> vote::ActiveModel {
    vote::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        target_type: Set(VoteTarget::Topic),
        target_id: Set(target_id.to_string()),
        kind: Set(kind),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_email_insert_is_bad_request() {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let users = UserRepository::new(Arc::new(db.connection().clone()));

    seed_user(&users, "u1").await;
    let result = users
        .create(user::ActiveModel {
            id: Set("u2".to_string()),
            name: Set("Copycat".to_string()),
            email: Set("u1@example.com".to_string()),
            password_hash: Set("hash".to_string()),
            bio: Set(None),
            image: Set(user::DEFAULT_IMAGE.to_string()),
            role: Set(UserRole::User),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        })
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_upsert_keeps_single_row() {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let conn = Arc::new(db.connection().clone());
    let users = UserRepository::new(Arc::clone(&conn));
    let topics = TopicRepository::new(Arc::clone(&conn));
    let votes = VoteRepository::new(Arc::clone(&conn));

    seed_user(&users, "u1").await;
    seed_topic(&topics, "t1", "u1", 0.0, Duration::zero()).await;

    votes.upsert(vote_model("v1", "u1", "t1", VoteKind::Like)).await.unwrap();
    votes.upsert(vote_model("v2", "u1", "t1", VoteKind::Dislike)).await.unwrap();

    let counts = votes.count_for_target(VoteTarget::Topic, "t1").await.unwrap();
    assert_eq!(counts.likes, 0);
    assert_eq!(counts.dislikes, 1);

    votes.delete("u1", VoteTarget::Topic, "t1").await.unwrap();
    let counts = votes.count_for_target(VoteTarget::Topic, "t1").await.unwrap();
    assert_eq!(counts.dislikes, 0);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_trending_page_order_and_filter() {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let conn = Arc::new(db.connection().clone());
    let users = UserRepository::new(Arc::clone(&conn));
    let topics = TopicRepository::new(Arc::clone(&conn));

    seed_user(&users, "u1").await;
    seed_topic(&topics, "low", "u1", 1.0, Duration::hours(1)).await;
    seed_topic(&topics, "high", "u1", 5.0, Duration::hours(2)).await;
    seed_topic(&topics, "old", "u1", 9.0, Duration::days(3)).await;

    let filter = TrendingFilter {
        since: Utc::now() - Duration::hours(24),
        statuses: vec![TopicStatus::Rising, TopicStatus::Trending],
        topic: None,
    };

    let page = topics.find_trending(&filter, 0, 10).await.unwrap();
    let ids: Vec<_> = page.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["high", "low"]);
    assert_eq!(topics.count_trending(&filter).await.unwrap(), 2);

    topics.increment_views("low").await.unwrap();
    topics.increment_views("low").await.unwrap();
    assert_eq!(topics.get_by_id("low").await.unwrap().views, 2);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_topic_delete_cascades_replies() {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let conn = Arc::new(db.connection().clone());
    let users = UserRepository::new(Arc::clone(&conn));
    let topics = TopicRepository::new(Arc::clone(&conn));
    let replies = TopicReplyRepository::new(Arc::clone(&conn));

    seed_user(&users, "u1").await;
    seed_topic(&topics, "t1", "u1", 0.0, Duration::zero()).await;
    replies
        .create(forum_db::entities::topic_reply::ActiveModel {
            id: Set("r1".to_string()),
            topic_id: Set("t1".to_string()),
            author_id: Set("u1".to_string()),
            content: Set("hello".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    assert_eq!(replies.count_by_topic("t1").await.unwrap(), 1);

    topics.delete("t1").await.unwrap();
    assert_eq!(replies.count_by_topic("t1").await.unwrap(), 0);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
