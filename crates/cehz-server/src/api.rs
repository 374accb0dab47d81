use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use cehz_scraper::SessionClient;
use cehz_sink::TableSink;

use crate::middleware::{request_id, RequestId};

/// Collaborators for one pipeline run, injected at startup. Overlapping
/// trigger requests share the clients but otherwise run independently.
#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<SessionClient>,
    pub sink: Option<Arc<TableSink>>,
}

/// Minimal JSON status body; fatal errors are deliberately generic so the
/// caller learns the failing stage from server logs, not the response.
#[derive(Debug, Serialize)]
struct StatusMessage {
    message: String,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/fetch-data", post(fetch_data))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id))
        .with_state(state)
}

/// Runs the pipeline end to end: login → fetch → normalize → extract →
/// (optionally) upsert. Any fatal scrape error yields a 500; per-record
/// sink failures do not.
async fn fetch_data(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    tracing::info!(request_id = %req_id.0, "received fetch-data trigger");

    let records = match state.scraper.fetch_summary().await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(request_id = %req_id.0, error = %e, "scrape pipeline failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusMessage {
                    message: "Failed to fetch data".to_string(),
                }),
            );
        }
    };

    let message = match &state.sink {
        Some(sink) => {
            let summary = sink.upsert_batch(&records).await;
            format!(
                "fetched {} records, wrote {} entities",
                records.len(),
                summary.written
            )
        }
        None => {
            for record in &records {
                tracing::info!(label = %record.label, value = %record.value, "extracted record");
            }
            format!("fetched {} records (no sink configured)", records.len())
        }
    };

    tracing::info!(request_id = %req_id.0, %message, "run complete");
    (StatusCode::OK, Json(StatusMessage { message }))
}
