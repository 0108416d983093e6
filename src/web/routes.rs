use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;

use super::AppState;
use crate::auth::RequireAdmin;
use crate::catalog;

/// Create the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/videos", get(list_videos))
        .route("/api/videos/:id", get(video_detail))
        .route("/api/collections", get(list_collections))
        .route("/api/collections/:slug", get(collection_detail))
        .route("/api/admin/sync", post(admin_sync))
        .route("/api/admin/status", get(admin_status))
        .route("/healthz", get(health))
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

// ========== Library ==========

#[derive(Debug, Default, Deserialize)]
pub struct VideoQuery {
    q: Option<String>,
    /// `YYYY-MM-DD`
    date: Option<String>,
}

async fn list_videos(State(state): State<AppState>, Query(params): Query<VideoQuery>) -> Response {
    let videos = state.sync.get_videos_with_auto_sync().await;

    let mut found = catalog::search(&videos, params.q.as_deref().unwrap_or_default());
    if let Some(date) = params.date.as_deref().filter(|d| !d.is_empty()) {
        found = catalog::filter_by_date(&found, date);
    }

    Json(found).into_response()
}

async fn video_detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.sync.get_video_by_id(&id).await {
        Some(video) => Json(video).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Video not found"),
    }
}

async fn list_collections(State(state): State<AppState>) -> Response {
    let videos = state.sync.get_videos_with_auto_sync().await;
    Json(catalog::collection_index(&videos)).into_response()
}

async fn collection_detail(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let videos = state.sync.get_videos_with_auto_sync().await;

    match catalog::find_collection(&videos, &slug) {
        Some(view) => Json(view).into_response(),
        None => json_error(StatusCode::NOT_FOUND, "Collection not found"),
    }
}

// ========== Admin ==========

/// Handler for a manual sync (POST /api/admin/sync).
///
/// Answers 502 when the upstream fetch or the save fails, so the caller can
/// tell a failed sync from an empty playlist.
async fn admin_sync(_admin: RequireAdmin, State(state): State<AppState>) -> Response {
    let report = state.sync.force_sync_now().await;
    let status = if report.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    tracing::info!(success = report.is_success(), "Manual sync requested");
    (status, Json(report)).into_response()
}

async fn admin_status(_admin: RequireAdmin, State(state): State<AppState>) -> Response {
    match state.sync.sync_status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            tracing::error!("Failed to read sync status: {e:#}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        }
    }
}

async fn health() -> &'static str {
    "OK"
}
