//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    http::Uri,
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth::require_basic_auth;
use super::rest::{events, ApiError};
use super::state::AppState;

/// Create the Axum router with all endpoints
///
/// Authentication runs before routing, so an unknown path without valid
/// credentials is a 401, not a 404. Unsupported methods on the event
/// routes are a 404 like any other unknown request.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/events", get(events::list_events).fallback(not_found))
        .route(
            "/events/:type_or_instant",
            get(events::query_events)
                .post(events::append_event)
                .fallback(not_found),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), require_basic_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the router until Ctrl-C
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "event log listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
