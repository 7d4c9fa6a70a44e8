use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use ov_storage::DatasetStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::info;

pub mod handlers;
pub mod html;
pub mod pages;
pub mod state;

pub use state::AppState;

/// Dataset text never runs as script; images may come from anywhere.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'none'; style-src 'self' 'unsafe-inline'; img-src * data:";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            data_dir: PathBuf::from("data"),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/articles/:filename", get(pages::dataset))
        .route("/articles/:filename/:index", get(pages::article))
        .route("/api/datasets", get(handlers::list_datasets))
        .route("/api/data/:filename", get(handlers::get_data))
        .route("/api/data/:filename/view", get(handlers::get_view))
        .route("/api/data/:filename/articles/:index", get(handlers::get_article))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY),
                )),
        )
        .with_state(Arc::new(state))
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let store = DatasetStore::from_dir(&config.data_dir);
    let app = create_app(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        "🌐 Serving datasets from {} on http://{}",
        config.data_dir.display(),
        listener.local_addr()?
    );
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use ov_core::{Dataset, Error, Result};
    pub use crate::{AppState, ServerConfig};
}
