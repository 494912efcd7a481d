//! Infinite-scroll windows

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use juris_common::phases::{initial_window, load_more, PhaseId, ScrollWindow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::views::{phase_views, PhaseView};
use crate::service::{load_map, MapSnapshot};
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct LoadMoreQuery {
    pub offset: usize,
    /// Defaults to `phases.load_more_batch_size`
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ScrollResponse {
    pub offset: usize,
    pub total: usize,
    pub current_phase_id: Option<PhaseId>,
    pub current_index: Option<usize>,
    pub has_more: bool,
    pub next_offset: Option<usize>,
    pub phases: Vec<PhaseView>,
}

impl ScrollResponse {
    fn new(window: ScrollWindow, snapshot: &MapSnapshot) -> Self {
        Self {
            offset: window.offset,
            total: window.total,
            current_phase_id: snapshot.evaluation.current_phase_id,
            current_index: window.current_index,
            has_more: window.has_more,
            next_offset: window.next_offset,
            phases: phase_views(&window.phases, snapshot),
        }
    }
}

/// GET /api/users/:user/scroll
///
/// Phases from the start up to a few past the current one.
pub async fn get_initial_window(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
) -> ApiResult<Json<ScrollResponse>> {
    let snapshot = load_map(&state, user).await?;
    let window = initial_window(&snapshot.evaluation, state.config.phases.scroll_lookahead);

    Ok(Json(ScrollResponse::new(window, &snapshot)))
}

/// GET /api/users/:user/scroll/more?offset=&limit=
pub async fn get_more(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
    Query(query): Query<LoadMoreQuery>,
) -> ApiResult<Json<ScrollResponse>> {
    let snapshot = load_map(&state, user).await?;
    let limit = query
        .limit
        .unwrap_or(state.config.phases.load_more_batch_size);
    let window = load_more(&snapshot.evaluation, query.offset, limit);

    Ok(Json(ScrollResponse::new(window, &snapshot)))
}

pub fn scroll_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:user/scroll", get(get_initial_window))
        .route("/api/users/:user/scroll/more", get(get_more))
}
