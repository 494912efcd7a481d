//! Phase structure builder
//!
//! Splits each law into chunks of `articles_per_phase`, interleaves laws in
//! modules of `phases_per_module_per_law` chunks each and inserts a review
//! phase after every `review_phase_interval`-th regular phase of a law.
//!
//! With two laws A and B, P = 2 and an interval of 2 the order is
//! `A1 A2 RevA B1 B2 RevB A3 A4 RevA B3 ...`.

use sha2::{Digest, Sha256};

use super::{ArticleId, LawCorpus, PhaseDescriptor, PhaseId, RegularPhase, ReviewPhase};
use crate::config::PhaseSettings;

/// Build the ordered phase list for a corpus
///
/// Ids are 1-based, strictly increasing and gap-free. An empty corpus (or one
/// whose laws have no articles) yields an empty list.
pub fn build_structure(corpus: &LawCorpus, settings: &PhaseSettings) -> Vec<PhaseDescriptor> {
    let chunk_size = settings.articles_per_phase.max(1);
    let per_module = settings.phases_per_module_per_law.max(1);
    let interval = settings.review_phase_interval.max(1);

    let chunked: Vec<Vec<&[ArticleId]>> = corpus
        .laws
        .iter()
        .map(|law| law.article_ids.chunks(chunk_size).collect())
        .collect();

    let max_chunks = chunked.iter().map(Vec::len).max().unwrap_or(0);
    let module_count = max_chunks.div_ceil(per_module);

    let mut phases = Vec::new();
    let mut next_id: PhaseId = 1;
    let mut regular_counts = vec![0usize; corpus.laws.len()];

    for module_index in 0..module_count {
        let module_start = module_index * per_module;
        let module_end = module_start + per_module;

        for (law_pos, law) in corpus.laws.iter().enumerate() {
            let chunks = &chunked[law_pos];
            if module_start >= chunks.len() {
                continue;
            }

            for chunk_index in module_start..module_end.min(chunks.len()) {
                phases.push(PhaseDescriptor::Regular(RegularPhase {
                    id: next_id,
                    law_id: law.law_id,
                    chunk_index,
                    module_index,
                    article_ids: chunks[chunk_index].to_vec(),
                }));
                next_id += 1;
                regular_counts[law_pos] += 1;

                if regular_counts[law_pos] % interval == 0 {
                    phases.push(PhaseDescriptor::Review(ReviewPhase {
                        id: next_id,
                        law_id: law.law_id,
                        regular_phases_before: regular_counts[law_pos],
                        module_index,
                    }));
                    next_id += 1;
                }
            }
        }
    }

    phases
}

/// Stable digest of everything the structure depends on
///
/// Two corpora with the same signature build identical structures, so the
/// signature is usable as a structure cache key.
pub fn structure_signature(corpus: &LawCorpus, settings: &PhaseSettings) -> String {
    let mut hasher = Sha256::new();
    hasher.update(settings.articles_per_phase.to_le_bytes());
    hasher.update(settings.review_phase_interval.to_le_bytes());
    hasher.update(settings.phases_per_module_per_law.to_le_bytes());

    for law in &corpus.laws {
        hasher.update(b"L");
        hasher.update(law.law_id.to_le_bytes());
        hasher.update((law.article_ids.len() as u64).to_le_bytes());
        for article_id in &law.article_ids {
            hasher.update(article_id.to_le_bytes());
        }
    }

    format!("{:x}", hasher.finalize())
}
