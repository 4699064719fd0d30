//! TF-IDF cosine ranking over the vector-space tables
//!
//! Query and document weights both use `(1 + ln tf) * idf`. Scores are
//! cosine similarities; normalization is skipped for a side whose norm is
//! zero, so a query of only out-of-vocabulary terms scores nothing rather
//! than dividing by zero.

use std::collections::HashMap;

use crate::index::VsmIndex;
use crate::models::ScoredDoc;

use super::sort_and_truncate;

pub struct VsmRanker<'a> {
    vsm: &'a VsmIndex,
}

impl<'a> VsmRanker<'a> {
    pub fn new(vsm: &'a VsmIndex) -> Self {
        Self { vsm }
    }

    /// TF-IDF query vector, restricted to indexed vocabulary
    pub fn query_vector(&self, query_terms: &[String]) -> HashMap<String, f64> {
        let mut tf: HashMap<&String, u32> = HashMap::new();
        for term in query_terms {
            *tf.entry(term).or_insert(0) += 1;
        }

        let mut vector = HashMap::new();
        for (term, count) in tf {
            if let Some(weight) = self.vsm.weight(term, count) {
                vector.insert(term.clone(), weight);
            }
        }
        vector
    }

    /// Rank documents by cosine similarity against an arbitrary query vector
    pub fn rank_vector(&self, query_vector: &HashMap<String, f64>, top_k: usize) -> Vec<ScoredDoc> {
        let query_norm: f64 = query_vector.values().map(|w| w * w).sum::<f64>().sqrt();

        let mut dots: HashMap<&str, f64> = HashMap::new();
        for (term, &q_weight) in query_vector {
            let doc_tfs = match self.vsm.postings.get(term) {
                Some(tfs) => tfs,
                None => continue,
            };
            for (doc_id, &tf) in doc_tfs {
                if let Some(d_weight) = self.vsm.weight(term, tf) {
                    *dots.entry(doc_id.as_str()).or_insert(0.0) += q_weight * d_weight;
                }
            }
        }

        let mut ranked: Vec<ScoredDoc> = dots
            .into_iter()
            .map(|(doc_id, dot)| {
                let doc_norm = self.vsm.doc_norm(doc_id).unwrap_or(0.0);
                let denom = query_norm * doc_norm;
                let score = if denom > 0.0 { dot / denom } else { dot };
                ScoredDoc::new(doc_id.to_string(), score)
            })
            .filter(|d| d.score > 0.0)
            .collect();

        sort_and_truncate(&mut ranked, top_k);
        ranked
    }

    /// Tokenized query to ranked documents
    pub fn rank(&self, query_terms: &[String], top_k: usize) -> Vec<ScoredDoc> {
        let vector = self.query_vector(query_terms);
        self.rank_vector(&vector, top_k)
    }
}
