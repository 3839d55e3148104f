use api_state::ApiState;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use routes::{ask::ask, health::health, ingest::ingest, stats::stats};

pub mod api_state;
pub mod error;
mod routes;

/// Router for the RAG API surface.
pub fn api_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/ingest", post(ingest))
        .route("/ask", post(ask))
}
