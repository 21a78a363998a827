//! forum-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
};
use forum_api::{AppState, auth_middleware, router as api_router};
use forum_common::{Config, TokenIssuer};
use forum_core::{ContentService, PostService, TopicService, UserService, VoteService};
use forum_db::repositories::{
    PostReplyRepository, PostRepository, TopicReplyRepository, TopicRepository, UserRepository,
    VoteRepository,
};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// CORS for the configured origins, or any origin when none are listed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(origin = %o, error = %e, "Skipping invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forum=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting forum-rs server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = forum_db::init(&config.database).await?;
    info!("Connected to database");

    // Run migrations
    forum_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);

    // Initialize repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let post_reply_repo = PostReplyRepository::new(Arc::clone(&db));
    let topic_repo = TopicRepository::new(Arc::clone(&db));
    let topic_reply_repo = TopicReplyRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));

    // Initialize services
    let vote_service = VoteService::new(vote_repo.clone());
    let user_service = UserService::new(
        user_repo.clone(),
        post_repo.clone(),
        TokenIssuer::from_config(&config.auth),
    );
    let post_service = PostService::new(
        post_repo.clone(),
        post_reply_repo.clone(),
        user_repo.clone(),
        vote_service.clone(),
    );
    let topic_service = TopicService::new(
        topic_repo,
        topic_reply_repo,
        user_repo.clone(),
        vote_service,
    );
    let content_service = ContentService::new(user_repo, post_repo, post_reply_repo, vote_repo);

    let state = AppState {
        user_service,
        post_service,
        topic_service,
        content_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_allowed_origins))
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
