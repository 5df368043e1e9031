//! HTTP layer exposing the upload page and the prediction endpoint.

pub mod routes;
pub mod types;

use std::{
    net::SocketAddr,
    sync::{atomic::AtomicU64, Arc},
};

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::llm::{ChatClient, ChatTransport};

/// Largest workbook accepted by the upload endpoint.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub struct AppState<T> {
    pub client: Arc<ChatClient<T>>,
    /// Bumped after each download so the page renders a fresh upload form.
    pub uploader_key: Arc<AtomicU64>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            uploader_key: Arc::clone(&self.uploader_key),
        }
    }
}

impl<T> AppState<T> {
    pub fn new(client: ChatClient<T>) -> Self {
        Self {
            client: Arc::new(client),
            uploader_key: Arc::new(AtomicU64::new(0)),
        }
    }
}

pub fn router<T: ChatTransport + 'static>(state: AppState<T>) -> Router {
    Router::new()
        .route("/", get(routes::index::<T>))
        .route("/predictions", post(routes::predict::<T>))
        .route("/session/reset", post(routes::reset_uploader::<T>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve<T: ChatTransport + 'static>(
    client: ChatClient<T>,
    host: String,
    port: u16,
) -> Result<()> {
    let router = router(AppState::new(client));
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving biblio-assistant");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
