//! juris-map library - study map service
//!
//! Serves the evaluated phase map of a user in every presentation variant
//! (full map, journeys, infinite scroll, modules, single-phase access) and
//! records practice attempts.

pub mod api;
pub mod error;
pub mod service;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use juris_common::cache::TtlCache;
use juris_common::config::TomlConfig;
use juris_common::phases::PhaseDescriptor;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::service::MapSnapshot;

/// Phase structures keyed by user and corpus signature
pub type StructureCache = TtlCache<(Uuid, String), Arc<Vec<PhaseDescriptor>>>;

/// Evaluated maps keyed by user
pub type EvaluationCache = TtlCache<Uuid, Arc<MapSnapshot>>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Resolved configuration
    pub config: Arc<TomlConfig>,
    pub structure_cache: StructureCache,
    pub evaluation_cache: EvaluationCache,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: TomlConfig) -> Self {
        let structure_ttl = Duration::from_secs(config.cache.structure_ttl_secs);
        let evaluation_ttl = Duration::from_secs(config.cache.evaluation_ttl_secs);

        Self {
            db,
            config: Arc::new(config),
            structure_cache: TtlCache::new(structure_ttl),
            evaluation_cache: TtlCache::new(evaluation_ttl),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::map_routes())
        .merge(api::journey_routes())
        .merge(api::scroll_routes())
        .merge(api::phase_routes())
        .merge(api::progress_routes())
        .merge(api::selection_routes())
        .merge(api::stats_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
