//! Practice attempts and progress resets

use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Json, Router,
};
use juris_common::db::progress::{record_attempt, reset_law_progress, AttemptOutcome};
use juris_common::phases::{ArticleId, LawId};
use juris_common::progress::AttemptInput;
use juris_common::time::now;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::service::invalidate_progress;
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub law_id: LawId,
    pub removed: u64,
}

/// POST /api/users/:user/articles/:article_id/attempts
///
/// Body: `{"correct_answers": 3, "total_answers": 5}`. Invalid counts are
/// rejected with 400 before anything is written.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path((user, article_id)): Path<(Uuid, ArticleId)>,
    Json(input): Json<AttemptInput>,
) -> ApiResult<Json<AttemptOutcome>> {
    let outcome = record_attempt(
        &state.db,
        user,
        article_id,
        input,
        &state.config.economy,
        now(),
    )
    .await?;

    invalidate_progress(&state, user).await;

    Ok(Json(outcome))
}

/// DELETE /api/users/:user/laws/:law_id/progress
pub async fn reset_progress(
    State(state): State<AppState>,
    Path((user, law_id)): Path<(Uuid, LawId)>,
) -> ApiResult<Json<ResetResponse>> {
    let removed = reset_law_progress(&state.db, user, law_id).await?;
    invalidate_progress(&state, user).await;

    info!("User {} reset law {}", user, law_id);

    Ok(Json(ResetResponse { law_id, removed }))
}

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/:user/articles/:article_id/attempts",
            post(submit_attempt),
        )
        .route("/api/users/:user/laws/:law_id/progress", delete(reset_progress))
}
