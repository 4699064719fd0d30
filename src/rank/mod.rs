//! Ranked retrieval models: BM25, TF-IDF cosine, and Rocchio feedback.

pub mod bm25;
pub mod feedback;
pub mod vsm;

pub use bm25::Bm25Ranker;
pub use feedback::RocchioExpander;
pub use vsm::VsmRanker;

use ordered_float::OrderedFloat;

use crate::models::ScoredDoc;

/// Best score first, ties on ascending document id, truncated to `top_k`
pub(crate) fn sort_and_truncate(ranked: &mut Vec<ScoredDoc>, top_k: usize) {
    ranked.sort_by(|a, b| {
        OrderedFloat(b.score)
            .cmp(&OrderedFloat(a.score))
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    ranked.truncate(top_k);
}
