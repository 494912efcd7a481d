//! JSON presentation of evaluated phases
//!
//! Pure mapping from engine types to response shapes; law names are
//! attached here so the engine stays free of display data.

use juris_common::phases::{
    EvaluatedPhase, LawId, ModuleGroup, PhaseDescriptor, PhaseId, PhaseProgress,
};
use serde::Serialize;

use crate::service::MapSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Regular,
    Review,
}

/// One phase as rendered on the map
#[derive(Debug, Clone, Serialize)]
pub struct PhaseView {
    pub id: PhaseId,
    pub kind: PhaseKind,
    pub law_id: LawId,
    pub law_name: String,
    pub module_index: usize,
    /// 1-based ordinal of the chunk within its law (regular phases)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_number: Option<usize>,
    /// Regular phases of the law covered so far (review phases)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_phases_before: Option<usize>,
    pub is_complete: bool,
    pub is_blocked: bool,
    pub is_current: bool,
    pub progress: PhaseProgress,
}

impl PhaseView {
    pub fn new(phase: &EvaluatedPhase, snapshot: &MapSnapshot) -> Self {
        let (kind, chunk_number, regular_phases_before) = match &phase.descriptor {
            PhaseDescriptor::Regular(regular) => {
                (PhaseKind::Regular, Some(regular.chunk_index + 1), None)
            }
            PhaseDescriptor::Review(review) => {
                (PhaseKind::Review, None, Some(review.regular_phases_before))
            }
        };

        Self {
            id: phase.id(),
            kind,
            law_id: phase.law_id(),
            law_name: snapshot.law_name(phase.law_id()).to_string(),
            module_index: phase.descriptor.module_index(),
            chunk_number,
            regular_phases_before,
            is_complete: phase.is_complete,
            is_blocked: phase.is_blocked,
            is_current: phase.is_current,
            progress: phase.progress.clone(),
        }
    }
}

pub fn phase_views(phases: &[EvaluatedPhase], snapshot: &MapSnapshot) -> Vec<PhaseView> {
    phases
        .iter()
        .map(|phase| PhaseView::new(phase, snapshot))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleLawView {
    pub law_id: LawId,
    pub law_name: String,
    pub phase_ids: Vec<PhaseId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    pub number: usize,
    pub phase_count: usize,
    pub laws: Vec<ModuleLawView>,
}

pub fn module_views(modules: Vec<ModuleGroup>, snapshot: &MapSnapshot) -> Vec<ModuleView> {
    modules
        .into_iter()
        .map(|module| ModuleView {
            number: module.number,
            phase_count: module.phase_count(),
            laws: module
                .laws
                .into_iter()
                .map(|law| ModuleLawView {
                    law_id: law.law_id,
                    law_name: snapshot.law_name(law.law_id).to_string(),
                    phase_ids: law.phase_ids,
                })
                .collect(),
        })
        .collect()
}
