//! Rocchio pseudo-relevance feedback
//!
//! One feedback round on top of the cosine ranker: retrieve, treat the top
//! `feedback_docs` results as relevant, build their TF-IDF centroid, keep
//! the `expansion_terms` heaviest centroid terms, and rescore with
//!
//! ```text
//! q_m = alpha * q_0 + beta * centroid
//! ```
//!
//! The centroid divides by `feedback_docs` even when fewer documents were
//! retrieved, matching the original run files this pipeline reproduces.

use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::config::RocchioParams;
use crate::index::VsmIndex;
use crate::models::ScoredDoc;

use super::vsm::VsmRanker;

pub struct RocchioExpander<'a> {
    vsm: &'a VsmIndex,
    params: RocchioParams,
}

impl<'a> RocchioExpander<'a> {
    pub fn new(vsm: &'a VsmIndex, params: RocchioParams) -> Self {
        Self { vsm, params }
    }

    /// Centroid of the pseudo-relevant documents, truncated to the
    /// heaviest `expansion_terms` terms. Ties break on the term itself.
    fn centroid(&self, feedback: &[ScoredDoc]) -> HashMap<String, f64> {
        let documents = self.vsm.document_vectors();

        let mut sums: HashMap<String, f64> = HashMap::new();
        for doc in feedback {
            let vector = match documents.get(&doc.doc_id) {
                Some(v) => v,
                None => continue,
            };
            for (term, &weight) in vector {
                *sums.entry(term.clone()).or_insert(0.0) += weight;
            }
        }

        let divisor = self.params.feedback_docs as f64;
        let mut terms: Vec<(String, f64)> = sums
            .into_iter()
            .map(|(term, sum)| (term, sum / divisor))
            .collect();
        terms.sort_by(|a, b| {
            OrderedFloat(b.1)
                .cmp(&OrderedFloat(a.1))
                .then_with(|| a.0.cmp(&b.0))
        });
        terms.truncate(self.params.expansion_terms);
        terms.into_iter().collect()
    }

    /// Rank with one round of feedback applied to the query vector
    pub fn rank(&self, query_terms: &[String], top_k: usize) -> Vec<ScoredDoc> {
        let ranker = VsmRanker::new(self.vsm);
        let q0 = ranker.query_vector(query_terms);

        let initial = ranker.rank_vector(&q0, self.params.feedback_docs);
        if initial.is_empty() {
            return Vec::new();
        }

        let centroid = self.centroid(&initial);

        let mut modified: HashMap<String, f64> = HashMap::new();
        for (term, weight) in &q0 {
            modified.insert(term.clone(), self.params.alpha * weight);
        }
        for (term, weight) in &centroid {
            *modified.entry(term.clone()).or_insert(0.0) += self.params.beta * weight;
        }

        ranker.rank_vector(&modified, top_k)
    }
}
