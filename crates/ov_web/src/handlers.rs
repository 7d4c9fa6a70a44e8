use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ov_core::render::{render_article, ArticleBody, ViewMode};
use ov_core::{keyed_articles, ArticleKey, Dataset, DatasetMetadata, Error};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};
use crate::AppState;

/// JSON error body for a failed dataset request.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

pub(crate) fn error_status(error: &Error) -> StatusCode {
    match error {
        Error::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        e if e.is_load_failure() => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        let message = match status {
            StatusCode::BAD_REQUEST => "Invalid filename",
            StatusCode::NOT_FOUND => "Failed to load data file",
            _ => "Internal server error",
        };
        if status.is_server_error() {
            error!("Error loading YAML file: {}", self.0);
        } else {
            debug!("Dataset request failed: {}", self.0);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub filename: String,
    pub name: String,
    pub metadata: DatasetMetadata,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArticleQuery {
    pub mode: Option<ViewMode>,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
struct ArticleResponse<'a> {
    key: ArticleKey,
    url: &'a str,
    title: &'a str,
    body: ArticleBody<'a>,
}

pub async fn list_datasets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summaries: Vec<DatasetSummary> = state
        .store
        .list_datasets()
        .await
        .into_iter()
        .map(|entry| DatasetSummary {
            filename: entry.filename,
            name: entry.dataset.name,
            metadata: entry.dataset.metadata,
        })
        .collect();
    Json(summaries)
}

pub async fn get_data(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<Dataset>, ApiError> {
    Ok(Json(state.store.get_dataset(&filename).await?))
}

pub async fn get_view(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<Dataset>, ApiError> {
    Ok(Json(state.store.get_view(&filename).await?))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path((filename, index)): Path<(String, usize)>,
    Query(query): Query<ArticleQuery>,
) -> Result<Json<Value>, ApiError> {
    let dataset = state.load_articles(&filename, query.all).await?;
    let (key, article) = keyed_articles(&dataset)
        .nth(index)
        .ok_or_else(|| Error::NotFound(format!("{} article {}", filename, index)))?;
    let response = ArticleResponse {
        key,
        url: &article.url,
        title: &article.original_title,
        body: render_article(article, query.mode.unwrap_or_default()),
    };
    Ok(Json(serde_json::to_value(&response).map_err(Error::from)?))
}
