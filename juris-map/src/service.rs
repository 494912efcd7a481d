//! Canonical map pipeline
//!
//! Every presentation variant goes through [`load_map`]:
//! corpus -> signature -> structure (cached) -> progress -> evaluation
//! (cached). Windowing happens in the handlers on the returned snapshot.

use juris_common::db::corpus::load_user_corpus;
use juris_common::db::progress::load_progress;
use juris_common::phases::{
    build_structure, evaluate, structure_signature, ArticleId, Evaluation, LawCorpus,
    PhaseDescriptor,
};
use juris_common::Result;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::AppState;

/// Evaluated map of one user plus everything needed to present it
#[derive(Debug, Clone)]
pub struct MapSnapshot {
    pub corpus: LawCorpus,
    pub structure: Arc<Vec<PhaseDescriptor>>,
    pub evaluation: Evaluation,
}

impl MapSnapshot {
    pub fn law_name(&self, law_id: i64) -> &str {
        self.corpus.law_name(law_id).unwrap_or_default()
    }
}

/// Structure for the corpus, from cache when the signature matches
async fn structure_for(
    state: &AppState,
    user: Uuid,
    corpus: &LawCorpus,
) -> Arc<Vec<PhaseDescriptor>> {
    let settings = &state.config.phases;
    let key = (user, structure_signature(corpus, settings));

    if let Some(structure) = state.structure_cache.get(&key).await {
        debug!("Structure cache hit for {}", user);
        return structure;
    }

    let structure = Arc::new(build_structure(corpus, settings));
    debug!("Built {} phases for {}", structure.len(), user);
    state.structure_cache.insert(key, Arc::clone(&structure)).await;
    structure
}

/// Evaluated map for `user`
pub async fn load_map(state: &AppState, user: Uuid) -> Result<Arc<MapSnapshot>> {
    if let Some(snapshot) = state.evaluation_cache.get(&user).await {
        debug!("Evaluation cache hit for {}", user);
        return Ok(snapshot);
    }

    let corpus = load_user_corpus(&state.db, user).await?;
    let structure = structure_for(state, user, &corpus).await;

    let article_ids: Vec<ArticleId> = corpus
        .laws
        .iter()
        .flat_map(|law| law.article_ids.iter().copied())
        .collect();
    let progress = load_progress(&state.db, user, &article_ids).await?;

    let evaluation = evaluate(&structure, &progress);
    debug!(
        "Evaluated {} phases for {} (current: {:?})",
        evaluation.len(),
        user,
        evaluation.current_phase_id
    );

    let snapshot = Arc::new(MapSnapshot {
        corpus,
        structure,
        evaluation,
    });
    state
        .evaluation_cache
        .insert(user, Arc::clone(&snapshot))
        .await;

    Ok(snapshot)
}

/// Forget the evaluation of `user` after a progress write
pub async fn invalidate_progress(state: &AppState, user: Uuid) {
    state.evaluation_cache.invalidate(&user).await;
}

/// Forget everything cached for `user` after a selection change
pub async fn invalidate_user(state: &AppState, user: Uuid) {
    state.evaluation_cache.invalidate(&user).await;
    state
        .structure_cache
        .invalidate_where(|(cached_user, _)| *cached_user == user)
        .await;
}

/// Drop expired cache entries; returns how many were removed
pub async fn purge_caches(state: &AppState) -> usize {
    state.structure_cache.purge_expired().await + state.evaluation_cache.purge_expired().await
}
