//! Law selection

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use juris_common::db::selection::{get_law_selection, set_law_selection};
use juris_common::db::users::require_user;
use juris_common::phases::LawId;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::service::invalidate_user;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub law_ids: Vec<LawId>,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    /// Selected laws in study order; empty means "all active laws"
    pub law_ids: Vec<LawId>,
}

/// GET /api/users/:user/laws
pub async fn get_selection(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
) -> ApiResult<Json<SelectionResponse>> {
    require_user(&state.db, user).await?;
    let law_ids = get_law_selection(&state.db, user).await?;

    Ok(Json(SelectionResponse { law_ids }))
}

/// PUT /api/users/:user/laws
///
/// Replaces the selection. Cached structures of the user are dropped since
/// the corpus changes.
pub async fn put_selection(
    State(state): State<AppState>,
    Path(user): Path<Uuid>,
    Json(request): Json<SelectionRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    let law_ids = set_law_selection(&state.db, user, &request.law_ids).await?;
    invalidate_user(&state, user).await;

    info!("User {} selected laws {:?}", user, law_ids);

    Ok(Json(SelectionResponse { law_ids }))
}

pub fn selection_routes() -> Router<AppState> {
    Router::new().route(
        "/api/users/:user/laws",
        get(get_selection).put(put_selection),
    )
}
