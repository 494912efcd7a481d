//! Review scope resolution
//!
//! A review covers exactly the run of consecutive regular phases of its own
//! law that immediately precede it, stopping at the previous review or at a
//! phase of another law.

use std::collections::{HashMap, HashSet};

use super::{ArticleId, PhaseDescriptor, PhaseId};
use crate::{Error, Result};

/// Article ids a review phase holds accountable, in study order
pub fn resolve_review_scope(phases: &[PhaseDescriptor], review_id: PhaseId) -> Result<Vec<ArticleId>> {
    let index = phases
        .iter()
        .position(|phase| phase.id() == review_id)
        .ok_or_else(|| Error::NotFound(format!("Phase {} does not exist", review_id)))?;

    let law_id = match &phases[index] {
        PhaseDescriptor::Review(review) => review.law_id,
        PhaseDescriptor::Regular(_) => {
            return Err(Error::Validation(format!(
                "Phase {} is not a review phase",
                review_id
            )))
        }
    };

    Ok(scope_at(phases, index, law_id))
}

/// Scope of the review at `index`, scanning backwards from its predecessor
fn scope_at(phases: &[PhaseDescriptor], index: usize, law_id: i64) -> Vec<ArticleId> {
    let window_start = phases[..index]
        .iter()
        .rposition(|phase| phase.is_review() || phase.law_id() != law_id)
        .map(|stop| stop + 1)
        .unwrap_or(0);

    let mut seen = HashSet::new();
    phases[window_start..index]
        .iter()
        .filter_map(|phase| match phase {
            PhaseDescriptor::Regular(regular) => Some(regular.article_ids.iter().copied()),
            PhaseDescriptor::Review(_) => None,
        })
        .flatten()
        .filter(|article_id| seen.insert(*article_id))
        .collect()
}

/// Read-through memo of review scopes, scoped to one evaluation call
#[derive(Debug, Default)]
pub struct ScopeCache {
    scopes: HashMap<PhaseId, Vec<ArticleId>>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope of the review at `index` of `phases`, computed at most once
    ///
    /// Returns an empty scope if `index` does not hold a review phase.
    pub fn scope_for(&mut self, phases: &[PhaseDescriptor], index: usize) -> &[ArticleId] {
        let (review_id, law_id) = match phases.get(index) {
            Some(PhaseDescriptor::Review(review)) => (review.id, review.law_id),
            _ => return &[],
        };

        self.scopes
            .entry(review_id)
            .or_insert_with(|| scope_at(phases, index, law_id))
            .as_slice()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhaseSettings;
    use crate::phases::{build_structure, LawArticles, LawCorpus, RegularPhase, ReviewPhase};

    fn regular(id: PhaseId, law_id: i64, article_ids: Vec<i64>) -> PhaseDescriptor {
        PhaseDescriptor::Regular(RegularPhase {
            id,
            law_id,
            chunk_index: 0,
            module_index: 0,
            article_ids,
        })
    }

    fn review(id: PhaseId, law_id: i64) -> PhaseDescriptor {
        PhaseDescriptor::Review(ReviewPhase {
            id,
            law_id,
            regular_phases_before: 0,
            module_index: 0,
        })
    }

    #[test]
    fn test_scope_of_first_review_covers_law_start() {
        let corpus = LawCorpus::new(vec![LawArticles {
            law_id: 1,
            law_name: "Civil Code".to_string(),
            article_ids: (1..=13).collect(),
        }]);
        let settings = PhaseSettings {
            articles_per_phase: 6,
            review_phase_interval: 2,
            ..PhaseSettings::default()
        };
        let phases = build_structure(&corpus, &settings);

        let scope = resolve_review_scope(&phases, 3).unwrap();
        assert_eq!(scope, (1..=12).collect::<Vec<i64>>());
    }

    #[test]
    fn test_scope_stops_at_previous_review() {
        let phases = vec![
            regular(1, 1, vec![1, 2]),
            regular(2, 1, vec![3, 4]),
            review(3, 1),
            regular(4, 1, vec![5, 6]),
            regular(5, 1, vec![7]),
            review(6, 1),
        ];

        assert_eq!(resolve_review_scope(&phases, 6).unwrap(), vec![5, 6, 7]);
    }

    #[test]
    fn test_scope_stops_at_other_law() {
        let phases = vec![
            regular(1, 1, vec![1, 2]),
            regular(2, 2, vec![100, 101]),
            regular(3, 2, vec![102]),
            review(4, 2),
        ];

        assert_eq!(resolve_review_scope(&phases, 4).unwrap(), vec![100, 101, 102]);
    }

    #[test]
    fn test_unknown_phase_is_not_found() {
        let phases = vec![regular(1, 1, vec![1])];
        assert!(matches!(resolve_review_scope(&phases, 9), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_regular_phase_is_rejected() {
        let phases = vec![regular(1, 1, vec![1])];
        assert!(matches!(resolve_review_scope(&phases, 1), Err(Error::Validation(_))));
    }

    #[test]
    fn test_cache_resolves_once_per_review() {
        let phases = vec![regular(1, 1, vec![1, 2]), review(2, 1)];
        let mut cache = ScopeCache::new();

        assert_eq!(cache.scope_for(&phases, 1), &[1, 2]);
        assert_eq!(cache.scope_for(&phases, 1), &[1, 2]);
        assert_eq!(cache.len(), 1);

        // Regular phases have no scope and are not memoized
        assert!(cache.scope_for(&phases, 0).is_empty());
        assert_eq!(cache.len(), 1);
    }
}
