//! Single-phase access
//!
//! Direct links to a phase are checked against the live evaluation: stale
//! ids answer 404 and locked phases 403, both with a redirect to the map.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use juris_common::phases::{
    check_phase_access, resolve_review_scope, ArticleId, PhaseDescriptor, PhaseId,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::views::PhaseView;
use crate::service::load_map;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct PhaseDetailResponse {
    pub phase: PhaseView,
    /// Articles to practise: the chunk of a regular phase or the scope of
    /// a review phase
    pub article_ids: Vec<ArticleId>,
}

/// GET /api/users/:user/phases/:phase_id
pub async fn get_phase(
    State(state): State<AppState>,
    Path((user, phase_id)): Path<(Uuid, PhaseId)>,
) -> ApiResult<Json<PhaseDetailResponse>> {
    let snapshot = load_map(&state, user).await?;

    let phase = check_phase_access(&snapshot.evaluation, phase_id).map_err(|err| {
        info!("Phase {} refused for {}: {}", phase_id, user, err);
        err
    })?;

    let article_ids = match &phase.descriptor {
        PhaseDescriptor::Regular(regular) => regular.article_ids.clone(),
        PhaseDescriptor::Review(_) => resolve_review_scope(&snapshot.structure, phase_id)?,
    };

    Ok(Json(PhaseDetailResponse {
        phase: PhaseView::new(phase, &snapshot),
        article_ids,
    }))
}

pub fn phase_routes() -> Router<AppState> {
    Router::new().route("/api/users/:user/phases/:phase_id", get(get_phase))
}
