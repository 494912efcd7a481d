//! Phase structure and progression engine
//!
//! One canonical implementation shared by every presentation variant
//! (full map, journeys, infinite scroll, modules, single-phase access):
//!
//! 1. [`builder`] turns a [`LawCorpus`] into an ordered list of
//!    [`PhaseDescriptor`]s (pure, no user progress involved).
//! 2. [`evaluator`] folds that list against a [`ProgressOracle`] and marks
//!    completion, blocking and the single current phase.
//! 3. [`review_scope`] resolves which articles a review phase covers.
//! 4. [`windowing`] slices the evaluated list without touching progression.

pub mod builder;
pub mod evaluator;
pub mod review_scope;
pub mod windowing;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use builder::{build_structure, structure_signature};
pub use evaluator::{check_phase_access, evaluate, Evaluation};
pub use review_scope::{resolve_review_scope, ScopeCache};
pub use windowing::{
    calculate_pagination, group_modules, initial_window, journey_page, load_more, JourneyPage,
    ModuleGroup, ModuleLaw, Pagination, ScrollWindow,
};

pub type PhaseId = u32;
pub type LawId = i64;
pub type ArticleId = i64;

/// One law of a user's corpus with its articles in study order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawArticles {
    pub law_id: LawId,
    pub law_name: String,
    pub article_ids: Vec<ArticleId>,
}

/// Ordered laws a user studies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawCorpus {
    pub laws: Vec<LawArticles>,
}

impl LawCorpus {
    pub fn new(laws: Vec<LawArticles>) -> Self {
        Self { laws }
    }

    pub fn total_articles(&self) -> usize {
        self.laws.iter().map(|law| law.article_ids.len()).sum()
    }

    pub fn law_name(&self, law_id: LawId) -> Option<&str> {
        self.laws
            .iter()
            .find(|law| law.law_id == law_id)
            .map(|law| law.law_name.as_str())
    }
}

/// A fixed-size chunk of one law's articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularPhase {
    pub id: PhaseId,
    pub law_id: LawId,
    /// Chunk index within the law (0-based)
    pub chunk_index: usize,
    /// Interleaving module the phase was emitted in
    pub module_index: usize,
    pub article_ids: Vec<ArticleId>,
}

/// Aggregation of the articles studied since the previous review of a law
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPhase {
    pub id: PhaseId,
    pub law_id: LawId,
    /// Regular phases of this law emitted before the review (title/ordinal only)
    pub regular_phases_before: usize,
    pub module_index: usize,
}

/// Derived phase record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseDescriptor {
    Regular(RegularPhase),
    Review(ReviewPhase),
}

impl PhaseDescriptor {
    pub fn id(&self) -> PhaseId {
        match self {
            PhaseDescriptor::Regular(phase) => phase.id,
            PhaseDescriptor::Review(phase) => phase.id,
        }
    }

    pub fn law_id(&self) -> LawId {
        match self {
            PhaseDescriptor::Regular(phase) => phase.law_id,
            PhaseDescriptor::Review(phase) => phase.law_id,
        }
    }

    pub fn module_index(&self) -> usize {
        match self {
            PhaseDescriptor::Regular(phase) => phase.module_index,
            PhaseDescriptor::Review(phase) => phase.module_index,
        }
    }

    pub fn is_review(&self) -> bool {
        matches!(self, PhaseDescriptor::Review(_))
    }
}

/// Per-article progress as seen by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArticleStatus {
    /// Latest attempt percentage (0-100)
    pub percentage: f64,
    pub attempted: bool,
}

/// Source of per-article progress for one user
pub trait ProgressOracle {
    /// Progress for an article, `None` when the user never attempted it
    fn status(&self, article_id: ArticleId) -> Option<ArticleStatus>;
}

/// Progress for a set of articles, loaded once per evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    entries: HashMap<ArticleId, ArticleStatus>,
}

impl ProgressSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, article_id: ArticleId, percentage: f64) {
        self.entries.insert(
            article_id,
            ArticleStatus {
                percentage,
                attempted: true,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ArticleId, f64)> for ProgressSnapshot {
    fn from_iter<I: IntoIterator<Item = (ArticleId, f64)>>(iter: I) -> Self {
        let mut snapshot = ProgressSnapshot::new();
        for (article_id, percentage) in iter {
            snapshot.insert(article_id, percentage);
        }
        snapshot
    }
}

impl ProgressOracle for ProgressSnapshot {
    fn status(&self, article_id: ArticleId) -> Option<ArticleStatus> {
        self.entries.get(&article_id).copied()
    }
}

/// Progress summary attached to an evaluated phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseProgress {
    Regular {
        /// Articles attempted at least once
        completed: usize,
        total: usize,
        percentage: f64,
        /// Any attempted article below 100%
        has_incorrect: bool,
    },
    Review {
        scope_size: usize,
        needs_review: bool,
        needs_review_count: usize,
    },
}

/// A descriptor with the user's lock/unlock state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedPhase {
    pub descriptor: PhaseDescriptor,
    pub is_complete: bool,
    pub is_blocked: bool,
    pub is_current: bool,
    pub progress: PhaseProgress,
}

impl EvaluatedPhase {
    pub fn id(&self) -> PhaseId {
        self.descriptor.id()
    }

    pub fn law_id(&self) -> LawId {
        self.descriptor.law_id()
    }
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
