//! API integration tests.
//!
//! These drive the full router, including the auth middleware, against a
//! mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
    middleware::from_fn_with_state,
};
use chrono::{Duration, Utc};
use forum_api::{AppState, auth_middleware, router as api_router};
use forum_common::TokenIssuer;
use forum_core::{ContentService, PostService, TopicService, UserService, VoteService};
use forum_db::{
    entities::{
        topic::{self, TopicStatus},
        user::{self, UserRole},
    },
    repositories::{
        PostReplyRepository, PostRepository, TopicReplyRepository, TopicRepository,
        UserRepository, VoteRepository,
    },
};
use maplit::btreemap;
use sea_orm::{
    DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, MockExecResult, Value,
};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

fn tokens() -> TokenIssuer {
    TokenIssuer::new(SECRET, Duration::days(7))
}

/// Create test app state over the given database.
fn create_test_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let post_reply_repo = PostReplyRepository::new(Arc::clone(&db));
    let topic_repo = TopicRepository::new(Arc::clone(&db));
    let topic_reply_repo = TopicReplyRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let vote_service = VoteService::new(vote_repo.clone());

    AppState {
        user_service: UserService::new(user_repo.clone(), post_repo.clone(), tokens()),
        post_service: PostService::new(
            post_repo.clone(),
            post_reply_repo.clone(),
            user_repo.clone(),
            vote_service.clone(),
        ),
        topic_service: TopicService::new(
            topic_repo,
            topic_reply_repo,
            user_repo.clone(),
            vote_service,
        ),
        content_service: ContentService::new(user_repo, post_repo, post_reply_repo, vote_repo),
    }
}

/// Create the test router, mounted the way the server mounts it.
fn create_test_router(db: DatabaseConnection) -> Router {
    let state = create_test_state(db);
    Router::new()
        .nest("/api", api_router())
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn test_user(id: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$aGFzaA".to_string(),
        bio: None,
        image: user::DEFAULT_IMAGE.to_string(),
        role: UserRole::User,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn test_topic(id: &str, author_id: &str) -> topic::Model {
    let created = Utc::now() - Duration::hours(1);
    topic::Model {
        id: id.to_string(),
        title: "Async Rust".to_string(),
        content: "Thoughts?".to_string(),
        topic: "rust".to_string(),
        author_id: author_id.to_string(),
        tags: serde_json::json!([]),
        views: 4,
        trending_score: 0.0,
        trending_rank: None,
        status: TopicStatus::Rising,
        created_at: created.into(),
        updated_at: created.into(),
        last_activity_at: created.into(),
    }
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_without_token_returns_401() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_expired_token_returns_401() {
    let app = create_test_router(empty_db());
    let token = tokens()
        .issue_at("u1", Utc::now() - Duration::days(30))
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_valid_token() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1")]])
        .into_connection();
    let app = create_test_router(db);
    let token = tokens().issue("u1").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], "u1");
    assert_eq!(body["role"], "user");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_user_lookup_failure_is_500_not_401() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Custom("connection refused".to_string())])
        .into_connection();
    let app = create_test_router(db);
    let token = tokens().issue("u1").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert_eq!(body["error"]["message"], "Internal server error");
}

#[tokio::test]
async fn test_register_short_password_returns_400() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            r#"{"name":"Alice","email":"alice@example.com","password":"123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_missing_fields_returns_400() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(json_request("POST", "/api/auth/register", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_duplicate_email_returns_400() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_user("u1")]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            r#"{"name":"Alice","email":"Alice@Example.com","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_login_unknown_email_returns_400() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            r#"{"email":"nobody@example.com","password":"secret1"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_create_post_requires_auth() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/posts",
            r#"{"title":"t","content":"c","category":"news"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_content_requires_auth() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users/u1/content")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_topic_returns_404() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<topic::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/trending/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "TOPIC_NOT_FOUND");
}

#[tokio::test]
async fn test_empty_trending_feed_with_invalid_token_is_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[btreemap! { "num_items" => Value::from(0_i64) }]])
        .append_query_results([Vec::<topic::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/trending?timeRange=7d&status=rising,trending")
                .header("Authorization", "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["topics"], serde_json::json!([]));
    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["totalTopics"], 0);
}

#[tokio::test]
async fn test_trending_feed_ranks_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[btreemap! { "num_items" => Value::from(2_i64) }]])
        .append_query_results([[test_topic("t1", "u1"), test_topic("t2", "u1")]])
        // vote counts, reply counts
        .append_query_results([vec![btreemap! {
            "target_id" => Value::from("t2".to_string()),
            "kind" => Value::from("like".to_string()),
            "count" => Value::from(5_i64),
        }]])
        .append_query_results([vec![btreemap! {
            "topic_id" => Value::from("t1".to_string()),
            "count" => Value::from(1_i64),
        }]])
        // ranking writes
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        // authors
        .append_query_results([[test_user("u1")]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/trending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let topics = body["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0]["id"], "t1");
    assert_eq!(topics[0]["trendingRank"], 1);
    assert_eq!(topics[1]["trendingRank"], 2);
    assert_eq!(topics[1]["likes"], 5);
    assert_eq!(topics[0]["repliesCount"], 1);
    assert!(topics[1]["trendingScore"].as_f64().unwrap() > topics[0]["trendingScore"].as_f64().unwrap());
    assert_eq!(topics[0]["author"]["name"], "Alice");
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn test_posts_unknown_category_returns_400() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/posts?category=cooking")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
