//! Windowing of evaluated phases
//!
//! Journeys (fixed-size pages), infinite-scroll windows and module grouping.
//! None of these recompute progression; they only slice an [`Evaluation`].

use serde::{Deserialize, Serialize};

use super::{EvaluatedPhase, Evaluation, LawId, PhaseId};

/// Pagination metadata calculated from total results and requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first item on the page
    pub offset: usize,
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, total_pages]
///
/// # Examples
/// ```
/// use juris_common::phases::windowing::calculate_pagination;
///
/// // 25 phases, 10 per journey = 3 pages (10 + 10 + 5)
/// let p = calculate_pagination(25, 10, 2);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 10);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(25, 10, 99);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 20);
/// ```
pub fn calculate_pagination(total_results: usize, page_size: usize, requested_page: usize) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_results.div_ceil(page_size);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

/// One journey page
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyPage<'a> {
    pub pagination: Pagination,
    pub phases: &'a [EvaluatedPhase],
    pub current_phase_id: Option<PhaseId>,
    /// Page holding the current phase (for "jump to current")
    pub current_page: Option<usize>,
}

impl JourneyPage<'_> {
    pub fn has_previous(&self) -> bool {
        self.pagination.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.pagination.page < self.pagination.total_pages
    }
}

/// Page number (1-indexed) containing the phase at `index`
fn page_of(index: usize, per_journey: usize) -> usize {
    index / per_journey.max(1) + 1
}

/// Slice the evaluation into a journey page
///
/// Without an explicit page the page containing the current phase is
/// returned; when every phase is complete that is the last page.
pub fn journey_page(
    evaluation: &Evaluation,
    requested_page: Option<usize>,
    per_journey: usize,
) -> JourneyPage<'_> {
    let current_page = evaluation
        .current_index()
        .map(|index| page_of(index, per_journey));

    let page = requested_page.unwrap_or_else(|| {
        current_page.unwrap_or_else(|| {
            if evaluation.is_finished() {
                page_of(evaluation.len() - 1, per_journey)
            } else {
                1
            }
        })
    });

    let pagination = calculate_pagination(evaluation.len(), per_journey, page);
    let end = (pagination.offset + per_journey.max(1)).min(evaluation.len());
    let start = pagination.offset.min(end);

    JourneyPage {
        pagination,
        phases: &evaluation.phases[start..end],
        current_phase_id: evaluation.current_phase_id,
        current_page,
    }
}

/// One infinite-scroll window
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollWindow {
    pub phases: Vec<EvaluatedPhase>,
    pub offset: usize,
    pub total: usize,
    pub current_index: Option<usize>,
    pub has_more: bool,
    pub next_offset: Option<usize>,
}

impl ScrollWindow {
    fn new(evaluation: &Evaluation, start: usize, end: usize) -> Self {
        let total = evaluation.len();
        let has_more = end < total;

        Self {
            phases: evaluation.phases[start..end].to_vec(),
            offset: start,
            total,
            current_index: evaluation.current_index(),
            has_more,
            next_offset: has_more.then_some(end),
        }
    }
}

/// First scroll window: from the start up to `lookahead` phases past the
/// current one (or everything when all phases are complete)
pub fn initial_window(evaluation: &Evaluation, lookahead: usize) -> ScrollWindow {
    let total = evaluation.len();
    let end = match evaluation.current_index() {
        Some(index) => (index + lookahead + 1).min(total),
        None => total,
    };

    ScrollWindow::new(evaluation, 0, end)
}

/// Subsequent scroll window at an explicit offset
///
/// Flags are re-validated against the true global current phase, which may
/// lie outside the window: only that phase is current (and unblocked), and
/// every phase ordered after it is blocked.
pub fn load_more(evaluation: &Evaluation, offset: usize, limit: usize) -> ScrollWindow {
    let total = evaluation.len();
    let start = offset.min(total);
    let end = (start + limit.max(1)).min(total);

    let mut window = ScrollWindow::new(evaluation, start, end);
    let current = evaluation.current_phase_id;
    let current_index = window.current_index;

    for (position, phase) in window.phases.iter_mut().enumerate() {
        phase.is_current = Some(phase.id()) == current;
        if phase.is_current {
            phase.is_blocked = false;
        } else if current_index.is_some_and(|index| start + position > index) {
            phase.is_blocked = true;
        }
    }

    window
}

/// Phases of one law inside a display module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleLaw {
    pub law_id: LawId,
    pub phase_ids: Vec<PhaseId>,
}

/// Display module: consecutive phases across interleaved laws
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGroup {
    /// 1-indexed module number
    pub number: usize,
    pub laws: Vec<ModuleLaw>,
}

impl ModuleGroup {
    pub fn phase_count(&self) -> usize {
        self.laws.iter().map(|law| law.phase_ids.len()).sum()
    }
}

/// Group phases into display modules, each subdivided by law
///
/// Empty when fewer than two laws are in play.
pub fn group_modules(evaluation: &Evaluation) -> Vec<ModuleGroup> {
    let mut law_ids: Vec<LawId> = evaluation.phases.iter().map(|p| p.law_id()).collect();
    law_ids.sort_unstable();
    law_ids.dedup();
    if law_ids.len() < 2 {
        return Vec::new();
    }

    let mut modules: Vec<(usize, ModuleGroup)> = Vec::new();

    for phase in &evaluation.phases {
        let module_index = phase.descriptor.module_index();

        if modules.last().map(|(index, _)| *index) != Some(module_index) {
            modules.push((
                module_index,
                ModuleGroup {
                    number: modules.len() + 1,
                    laws: Vec::new(),
                },
            ));
        }

        if let Some((_, group)) = modules.last_mut() {
            match group.laws.iter_mut().find(|law| law.law_id == phase.law_id()) {
                Some(law) => law.phase_ids.push(phase.id()),
                None => group.laws.push(ModuleLaw {
                    law_id: phase.law_id(),
                    phase_ids: vec![phase.id()],
                }),
            }
        }
    }

    modules.into_iter().map(|(_, group)| group).collect()
}
