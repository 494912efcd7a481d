//! Lives, XP and overall progression of a user

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use juris_common::db::users::{require_user, User};
use juris_common::phases::PhaseId;
use juris_common::Error as CommonError;
use serde::Serialize;
use uuid::Uuid;

use crate::service::load_map;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ProgressionSummary {
    pub total_phases: usize,
    pub completed_phases: usize,
    pub current_phase_id: Option<PhaseId>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub user: User,
    /// Absent while the user has nothing to study
    pub progression: Option<ProgressionSummary>,
}

/// GET /api/users/:user/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
) -> ApiResult<Json<StatsResponse>> {
    let record = require_user(&state.db, user).await?;

    let progression = match load_map(&state, user).await {
        Ok(snapshot) => {
            let evaluation = &snapshot.evaluation;
            Some(ProgressionSummary {
                total_phases: evaluation.len(),
                completed_phases: evaluation.phases.iter().filter(|p| p.is_complete).count(),
                current_phase_id: evaluation.current_phase_id,
            })
        }
        Err(CommonError::NoLawsAvailable | CommonError::EmptySelection) => None,
        Err(err) => return Err(err.into()),
    };

    Ok(Json(StatsResponse {
        user: record,
        progression,
    }))
}

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/api/users/:user/stats", get(get_stats))
}
