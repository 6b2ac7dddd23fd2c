use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::db::DocumentStore;
use crate::query_engine::QueryEngine;

pub mod handlers;
pub mod models;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(engine: Arc<QueryEngine>, store: Arc<dyn DocumentStore>) -> Self {
        Self { engine, store }
    }
}

pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // API routes
        .route("/results", post(handlers::results_handler))
        .route(
            "/documents",
            get(handlers::documents_list_handler).post(handlers::documents_search_handler),
        )
        .route("/documents/:id", get(handlers::document_handler))
        .with_state(state)
        // Static file serving for the UI
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
}

/// Binds `addr` and serves until ctrl-c.
pub async fn serve(addr: &str, state: AppState, static_dir: &Path) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state, static_dir))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("shutting down");
        })
        .await
        .context("server error")
}
