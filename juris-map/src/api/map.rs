//! Full map and module grouping

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use juris_common::phases::{group_modules, PhaseId};
use serde::Serialize;
use uuid::Uuid;

use super::views::{module_views, phase_views, ModuleView, PhaseView};
use crate::service::load_map;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub current_phase_id: Option<PhaseId>,
    pub total_phases: usize,
    /// Every phase is complete
    pub is_finished: bool,
    pub phases: Vec<PhaseView>,
    /// Empty when fewer than two laws are studied
    pub modules: Vec<ModuleView>,
}

#[derive(Debug, Serialize)]
pub struct ModulesResponse {
    pub current_phase_id: Option<PhaseId>,
    pub modules: Vec<ModuleView>,
}

/// GET /api/users/:user/map
///
/// Every evaluated phase in study order.
pub async fn get_map(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
) -> ApiResult<Json<MapResponse>> {
    let snapshot = load_map(&state, user).await?;
    let evaluation = &snapshot.evaluation;

    Ok(Json(MapResponse {
        current_phase_id: evaluation.current_phase_id,
        total_phases: evaluation.len(),
        is_finished: evaluation.is_finished(),
        phases: phase_views(&evaluation.phases, &snapshot),
        modules: module_views(group_modules(evaluation), &snapshot),
    }))
}

/// GET /api/users/:user/modules
pub async fn get_modules(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
) -> ApiResult<Json<ModulesResponse>> {
    let snapshot = load_map(&state, user).await?;

    Ok(Json(ModulesResponse {
        current_phase_id: snapshot.evaluation.current_phase_id,
        modules: module_views(group_modules(&snapshot.evaluation), &snapshot),
    }))
}

pub fn map_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/:user/map", get(get_map))
        .route("/api/users/:user/modules", get(get_modules))
}
