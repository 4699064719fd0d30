//! Okapi BM25 ranking
//!
//! Scores accumulate per document over the unique query terms:
//!
//! ```text
//! idf(t)  = max(0, ln((N - df + 0.5) / (df + 0.5)))
//! norm(d) = max((1 - b) + b * dl/avgdl, 1e-9)
//! score  += idf(t) * tf * (k1 + 1) / (tf + k1 * norm(d))
//! ```
//!
//! The query-side saturation term (k3) stays out of the formula: query
//! terms are deduplicated first, so its contribution is always 1.
//! Documents that score zero are omitted from the result.

use std::collections::{HashMap, HashSet};

use crate::config::Bm25Params;
use crate::index::{CollectionStats, DocNo, IndexStore};
use crate::models::ScoredDoc;

use super::sort_and_truncate;

/// Floor for the length normalizer, keeps the denominator positive
const NORM_EPSILON: f64 = 1e-9;

pub struct Bm25Ranker<'a> {
    store: &'a IndexStore,
    stats: &'a CollectionStats,
    params: Bm25Params,
}

impl<'a> Bm25Ranker<'a> {
    pub fn new(store: &'a IndexStore, stats: &'a CollectionStats, params: Bm25Params) -> Self {
        Self {
            store,
            stats,
            params,
        }
    }

    /// Robertson-Sparck Jones IDF, clamped at zero for very common terms
    fn idf(&self, term: &str) -> f64 {
        let df = self.store.doc_frequency(term) as f64;
        if df == 0.0 {
            return 0.0;
        }
        let n = self.stats.doc_count as f64;
        ((n - df + 0.5) / (df + 0.5)).ln().max(0.0)
    }

    /// Rank the collection for tokenized query terms, best-first
    pub fn rank(&self, query_terms: &[String], top_k: usize) -> Vec<ScoredDoc> {
        let unique: HashSet<&String> = query_terms.iter().collect();

        let k1 = self.params.k1;
        let b = self.params.b;
        let avgdl = self.stats.avg_doc_length;

        let mut scores: HashMap<DocNo, f64> = HashMap::new();
        for term in unique {
            let postings = match self.store.term_postings(term) {
                Some(p) => p,
                None => continue,
            };
            let idf = self.idf(term);
            if idf == 0.0 {
                continue;
            }

            for (docno, posting) in postings.iter() {
                let tf = posting.term_frequency as f64;
                let dl = match self.store.doc_id(docno) {
                    Some(id) => self.stats.doc_length(id) as f64,
                    None => continue,
                };
                let rel_len = if avgdl > 0.0 { dl / avgdl } else { 0.0 };
                let norm = ((1.0 - b) + b * rel_len).max(NORM_EPSILON);
                let partial = idf * tf * (k1 + 1.0) / (tf + k1 * norm);
                *scores.entry(docno).or_insert(0.0) += partial;
            }
        }

        collect_top_k(self.store, scores, top_k)
    }
}

/// Turn a docno score map into a sorted, truncated result list.
/// Ties break on ascending external document id.
pub(crate) fn collect_top_k(
    store: &IndexStore,
    scores: HashMap<DocNo, f64>,
    top_k: usize,
) -> Vec<ScoredDoc> {
    let mut ranked: Vec<ScoredDoc> = scores
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .filter_map(|(docno, score)| {
            store
                .doc_id(docno)
                .map(|id| ScoredDoc::new(id.to_string(), score))
        })
        .collect();

    sort_and_truncate(&mut ranked, top_k);
    ranked
}
