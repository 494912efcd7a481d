//! Journey pages
//!
//! Fixed-size pages over the evaluated map. Without `?page=` the page
//! holding the current phase is served.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use juris_common::phases::{journey_page, PhaseId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::views::{phase_views, PhaseView};
use crate::service::load_map;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct JourneyQuery {
    /// 1-indexed page; out-of-range values are clamped
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    pub page: usize,
    pub total_pages: usize,
    pub per_journey: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub current_phase_id: Option<PhaseId>,
    /// Page holding the current phase
    pub current_page: Option<usize>,
    pub phases: Vec<PhaseView>,
}

/// GET /api/users/:user/journeys?page=N
pub async fn get_journey(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
    Query(query): Query<JourneyQuery>,
) -> ApiResult<Json<JourneyResponse>> {
    if query.page == Some(0) {
        return Err(ApiError::BadRequest("page is 1-indexed".to_string()));
    }

    let snapshot = load_map(&state, user).await?;
    let per_journey = state.config.phases.phases_per_journey;
    let journey = journey_page(&snapshot.evaluation, query.page, per_journey);

    Ok(Json(JourneyResponse {
        page: journey.pagination.page,
        total_pages: journey.pagination.total_pages,
        per_journey,
        has_previous: journey.has_previous(),
        has_next: journey.has_next(),
        current_phase_id: journey.current_phase_id,
        current_page: journey.current_page,
        phases: phase_views(journey.phases, &snapshot),
    }))
}

pub fn journey_routes() -> Router<AppState> {
    Router::new().route("/api/users/:user/journeys", get(get_journey))
}
