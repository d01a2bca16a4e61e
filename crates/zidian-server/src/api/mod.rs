//! HTTP API
//!
//! JSON endpoints for the review queue and the dictionary, bound to
//! localhost:3928 by default.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::state::AppState;

/// Build the axum router with all API routes
pub fn build_router(state: AppState, port: u16) -> Router {
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Review queue
        .route("/cards/due/next", get(handlers::next_due_card))
        .route("/cards/due", get(handlers::list_due_cards))
        .route("/cards/new", post(handlers::create_card))
        .route("/cards/find/entry/{entry_id}", get(handlers::cards_for_entry))
        .route("/cards/{id}", post(handlers::update_card))
        .route("/cards/{id}/review", post(handlers::review_card))
        .route("/cards/{id}/logs", get(handlers::card_logs))
        // Dictionary
        .route("/entries/new", post(handlers::create_entry))
        .route("/entries/{word}", get(handlers::entries_by_word))
        .route("/entry/{id}", get(handlers::get_entry))
        .route("/definitions/new", post(handlers::create_definition))
        .route("/definitions/{entry_id}", get(handlers::definitions_by_entry))
        .route("/examples/new", post(handlers::create_example))
        .route("/examples/{definition_id}", get(handlers::examples_by_definition))
        // Health
        .route("/health", get(handlers::health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .concurrency_limit(50)
                .layer(cors),
        )
        .with_state(state)
}

/// Serve the API on `addr` until Ctrl+C or SIGTERM
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = build_router(state, addr.port());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Zidian API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Zidian API shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
