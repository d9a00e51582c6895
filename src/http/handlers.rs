use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info};

use super::app_server::AppState;
use super::error::ApiError;
use super::models::{
    ChartParams, DashboardResponse, DeletePointParams, DeletePointResponse, MessageRequest,
    MessageResponse, PointInfo,
};
use crate::model::{now, try_parse_timestamp, MetricName, Point, UserId};
use crate::store::series_key;

/// Handler for GET /health
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "measurelog"
        })),
    )
}

/// Handler for POST /messages
#[tracing::instrument(name = "handler_message", skip_all)]
pub async fn message_handler(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let bot = state.bot.clone();
    let reply =
        tokio::task::spawn_blocking(move || bot.handle(request.user_id, &request.text, now()))
            .await?;

    Ok(Json(MessageResponse { reply: reply.text }))
}

/// Handler for GET /u/{token}
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let user = user_for(&state, &token)?;

    let store = state.store.clone();
    let (latest, points) = blocking(move || {
        let latest = store.latest_per_key(user)?;
        let points = store.all_points(user)?.len();
        Ok((latest, points))
    })
    .await?;

    Ok(Json(DashboardResponse {
        keys: latest.keys().cloned().collect(),
        latest,
        points,
        chart: format!("/u/{}/chart.png", token),
    }))
}

/// Handler for GET /u/{token}/points
pub async fn points_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Vec<PointInfo>>, ApiError> {
    let user = user_for(&state, &token)?;

    let store = state.store.clone();
    let points = blocking(move || store.all_points(user)).await?;
    Ok(Json(points.into_iter().map(PointInfo::from).collect()))
}

/// Handler for DELETE /u/{token}/points
pub async fn delete_point_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<DeletePointParams>,
) -> Result<Json<DeletePointResponse>, ApiError> {
    let user = user_for(&state, &token)?;

    let timestamp = try_parse_timestamp(params.timestamp.trim()).ok_or_else(|| {
        ApiError::bad_request(format!("unsupported timestamp '{}'", params.timestamp))
    })?;

    let store = state.store.clone();
    let deleted = blocking(move || store.delete_point(user, &params.key, timestamp)).await?;
    info!(user, deleted, "point deletion requested");

    Ok(Json(DeletePointResponse { deleted }))
}

/// Handler for DELETE /u/{token}
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user = user_for(&state, &token)?;

    let store = state.store.clone();
    blocking(move || store.clear(user)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /u/{token}/chart.png
#[tracing::instrument(name = "handler_chart", skip_all)]
pub async fn chart_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Response, ApiError> {
    let user = user_for(&state, &token)?;

    let store = state.store.clone();
    let renderer = state.renderer.clone();
    let image = blocking(move || {
        let points = store.all_points(user)?;
        let visible = visible_keys(params.keys.as_deref(), &points);
        debug!(user, points = points.len(), keys = visible.len(), "rendering chart");
        renderer.render_series(&points, &visible)
    })
    .await?;

    Ok((
        [(header::CONTENT_TYPE, state.renderer.content_type())],
        image,
    )
        .into_response())
}

// Store access touches the disk and rendering is CPU-bound; both stay off the
// request workers.
async fn blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

fn user_for(state: &AppState, token: &str) -> Result<UserId, ApiError> {
    state
        .tokens
        .user_for(token)
        .ok_or_else(|| ApiError::not_found("unknown dashboard"))
}

fn visible_keys(requested: Option<&str>, points: &[Point]) -> Vec<MetricName> {
    match requested {
        Some(keys) => keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect(),
        None => {
            let mut keys: Vec<MetricName> = Vec::new();
            for point in points {
                let skey = series_key(&point.key);
                if !keys.iter().any(|k| series_key(k) == skey) {
                    keys.push(point.key.clone());
                }
            }
            keys
        }
    }
}
