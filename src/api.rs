use crate::engine::{BuildReport, EngineStats, SearchEngine, SearchHit, SearchOptions};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// ========== Request/Response Types ==========

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Missing `q` is an empty query, not a rejected request.
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub top_k: Option<i64>,
    #[serde(default)]
    pub date_weight: Option<f64>,
    #[serde(default)]
    pub preview: Option<usize>,
}

impl SearchRequest {
    fn options(&self) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            top_k: self.top_k.unwrap_or(defaults.top_k),
            date_weight: self.date_weight.unwrap_or(defaults.date_weight),
            preview_chars: self.preview,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    fn error(message: String) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

// ========== Error Handling ==========

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = format!("{:#}", self.0);
        tracing::error!("API error: {}", message);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(message)),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ========== Handlers ==========

async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::success("OK"))
}

async fn search_documents(
    State(engine): State<Arc<SearchEngine>>,
    Query(req): Query<SearchRequest>,
) -> Json<ApiResponse<SearchResponse>> {
    let results = engine.search(&req.q, &req.options());
    Json(ApiResponse::success(SearchResponse {
        query: req.q,
        results,
    }))
}

async fn get_stats(State(engine): State<Arc<SearchEngine>>) -> Json<ApiResponse<EngineStats>> {
    Json(ApiResponse::success(engine.stats()))
}

/// Rebuild runs on a blocking thread; searches arriving meanwhile wait on the
/// engine's lock.
async fn rebuild_index(
    State(engine): State<Arc<SearchEngine>>,
) -> Result<Json<ApiResponse<BuildReport>>, AppError> {
    let report = tokio::task::spawn_blocking(move || engine.rebuild()).await??;
    Ok(Json(ApiResponse::success(report)))
}

// ========== Router ==========

pub fn create_router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/search", get(search_documents))
        .route("/stats", get(get_stats))
        .route("/rebuild", post(rebuild_index))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(engine)
}
