//! Progression evaluator
//!
//! A single left-to-right fold over the phase structure. Each step is a pure
//! transition `(ScanState, phase) -> (ScanState', EvaluatedPhase)`.
//!
//! Rules:
//! - a phase is blocked when anything before it set `block_subsequent` or
//!   when the phase immediately before it is incomplete;
//! - the first unblocked, incomplete phase becomes the single current phase
//!   and blocks everything after it;
//! - moving from a law whose phases were not all complete to another law
//!   blocks everything from that point on.

use std::collections::HashMap;

use super::review_scope::ScopeCache;
use super::{
    round2, EvaluatedPhase, LawId, PhaseDescriptor, PhaseId, PhaseProgress, ProgressOracle,
};
use crate::{Error, Result};

/// Evaluated phase list for one user
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub phases: Vec<EvaluatedPhase>,
    pub current_phase_id: Option<PhaseId>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn index_of(&self, phase_id: PhaseId) -> Option<usize> {
        self.phases.iter().position(|phase| phase.id() == phase_id)
    }

    pub fn get(&self, phase_id: PhaseId) -> Option<&EvaluatedPhase> {
        self.index_of(phase_id).map(|index| &self.phases[index])
    }

    /// Index of the current phase, if any
    pub fn current_index(&self) -> Option<usize> {
        self.current_phase_id.and_then(|id| self.index_of(id))
    }

    /// True when there is at least one phase and all of them are complete
    pub fn is_finished(&self) -> bool {
        !self.phases.is_empty() && self.phases.iter().all(|phase| phase.is_complete)
    }
}

/// State carried across the scan
#[derive(Debug, Clone)]
struct ScanState {
    block_subsequent: bool,
    previous_phase_complete: bool,
    current_law_id: Option<LawId>,
    law_completion: HashMap<LawId, bool>,
    current_phase_id: Option<PhaseId>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            block_subsequent: false,
            previous_phase_complete: true,
            current_law_id: None,
            law_completion: HashMap::new(),
            current_phase_id: None,
        }
    }
}

impl ScanState {
    fn step(
        mut self,
        phase: &PhaseDescriptor,
        progress: PhaseProgress,
        is_complete: bool,
    ) -> (Self, EvaluatedPhase) {
        let law_id = phase.law_id();

        if self.current_law_id != Some(law_id) {
            if let Some(previous_law) = self.current_law_id {
                if self.law_completion.get(&previous_law) == Some(&false) {
                    self.block_subsequent = true;
                }
            }
            self.law_completion.insert(law_id, true);
            self.current_law_id = Some(law_id);
        }

        let is_blocked = self.block_subsequent || !self.previous_phase_complete;

        let mut is_current = false;
        if !is_blocked && !is_complete && self.current_phase_id.is_none() {
            is_current = true;
            self.current_phase_id = Some(phase.id());
            self.block_subsequent = true;
        }

        if !is_complete {
            self.law_completion.insert(law_id, false);
        }

        self.previous_phase_complete = is_complete;

        let evaluated = EvaluatedPhase {
            descriptor: phase.clone(),
            is_complete,
            is_blocked,
            is_current,
            progress,
        };

        (self, evaluated)
    }
}

/// Completion and progress summary of one phase, independent of ordering
fn phase_progress(
    phases: &[PhaseDescriptor],
    index: usize,
    oracle: &dyn ProgressOracle,
    scopes: &mut ScopeCache,
) -> (PhaseProgress, bool) {
    match &phases[index] {
        PhaseDescriptor::Regular(regular) => {
            let total = regular.article_ids.len();
            let mut completed = 0;
            let mut has_incorrect = false;

            for article_id in &regular.article_ids {
                if let Some(status) = oracle.status(*article_id).filter(|s| s.attempted) {
                    completed += 1;
                    if status.percentage < 100.0 {
                        has_incorrect = true;
                    }
                }
            }

            let percentage = if total == 0 {
                0.0
            } else {
                round2(completed as f64 / total as f64 * 100.0)
            };

            let progress = PhaseProgress::Regular {
                completed,
                total,
                percentage,
                has_incorrect,
            };
            (progress, completed == total)
        }
        PhaseDescriptor::Review(_) => {
            let scope = scopes.scope_for(phases, index);
            let needs_review_count = scope
                .iter()
                .filter(|article_id| {
                    oracle
                        .status(**article_id)
                        .map_or(true, |status| status.percentage < 100.0)
                })
                .count();

            let progress = PhaseProgress::Review {
                scope_size: scope.len(),
                needs_review: needs_review_count > 0,
                needs_review_count,
            };
            (progress, needs_review_count == 0)
        }
    }
}

/// Evaluate a phase structure against one user's progress
///
/// Deterministic: the same structure and progress always produce the same
/// evaluation. At most one phase is current and it is never blocked.
pub fn evaluate(phases: &[PhaseDescriptor], oracle: &dyn ProgressOracle) -> Evaluation {
    let mut scopes = ScopeCache::new();

    let (state, mut evaluated) = phases.iter().enumerate().fold(
        (ScanState::default(), Vec::with_capacity(phases.len())),
        |(state, mut out), (index, phase)| {
            let (progress, is_complete) = phase_progress(phases, index, oracle, &mut scopes);
            let (next, evaluated) = state.step(phase, progress, is_complete);
            out.push(evaluated);
            (next, out)
        },
    );

    // Post-pass correction: exactly the identified phase is current
    let current_phase_id = state.current_phase_id;
    for phase in &mut evaluated {
        phase.is_current = Some(phase.id()) == current_phase_id;
        if phase.is_current {
            phase.is_blocked = false;
        }
    }

    Evaluation {
        phases: evaluated,
        current_phase_id,
    }
}

/// Resolve a phase for direct access
///
/// Fails with `NotFound` for ids absent from the structure (stale links) and
/// with `BlockedAccess` for phases that are locked and not current.
pub fn check_phase_access(evaluation: &Evaluation, phase_id: PhaseId) -> Result<&EvaluatedPhase> {
    let phase = evaluation
        .get(phase_id)
        .ok_or_else(|| Error::NotFound(format!("Phase {} does not exist", phase_id)))?;

    if phase.is_blocked && !phase.is_current {
        return Err(Error::BlockedAccess { phase_id });
    }

    Ok(phase)
}
