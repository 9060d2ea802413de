use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::model::FrameRequest;
use crate::monitor::Monitor;

/// Build the daemon's HTTP surface.
pub fn router(monitor: Arc<Monitor>) -> Router {
    Router::new()
        .route("/frame_result", post(frame_result))
        .route("/latest_status", get(latest_status))
        .route("/events", get(events))
        .route("/events/img/:filename", get(event_image))
        .route("/ack_alert", post(ack_alert))
        .route("/danger_list", get(danger_list).post(update_danger_list))
        .with_state(monitor)
}

// The body is parsed by hand so a malformed frame gets the `{"error": ...}`
// shape the perception client expects instead of axum's plain-text reject.
async fn frame_result(State(monitor): State<Arc<Monitor>>, body: Bytes) -> Response {
    let frame: FrameRequest = match serde_json::from_slice(&body) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "rejected frame body");
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid JSON"})))
                .into_response();
        }
    };
    Json(monitor.handle_frame(frame).await).into_response()
}

async fn latest_status(State(monitor): State<Arc<Monitor>>) -> Response {
    Json(monitor.latest_status().await).into_response()
}

#[derive(Deserialize)]
struct EventsQuery {
    limit: Option<usize>,
}

async fn events(State(monitor): State<Arc<Monitor>>, Query(q): Query<EventsQuery>) -> Response {
    let limit = q.limit.unwrap_or(100);
    Json(monitor.recent_events(limit).await).into_response()
}

async fn event_image(
    State(monitor): State<Arc<Monitor>>,
    Path(filename): Path<String>,
) -> Response {
    match monitor.snapshot_bytes(&filename).await {
        Some(bytes) => ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn ack_alert(State(monitor): State<Arc<Monitor>>) -> Response {
    monitor.ack_alert().await;
    Json(json!({"status": "ok"})).into_response()
}

async fn danger_list(State(monitor): State<Arc<Monitor>>) -> Response {
    Json(json!({"dangerous_persons": monitor.danger_names().await})).into_response()
}

#[derive(Deserialize, Default)]
struct DangerUpdate {
    name: Option<String>,
    action: Option<String>,
}

async fn update_danger_list(State(monitor): State<Arc<Monitor>>, body: Bytes) -> Response {
    let update: DangerUpdate = serde_json::from_slice(&body).unwrap_or_default();
    let name = update
        .name
        .as_deref()
        .map(|n| n.trim().to_lowercase())
        .unwrap_or_default();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "name required"})))
            .into_response();
    }
    let remove = update.action.as_deref() == Some("remove");
    let names = monitor.update_danger_list(&name, remove).await;
    Json(json!({"status": "ok", "dangerous_persons": names})).into_response()
}
