//! Derived vector-space tables: IDF, document norms, tf-only postings
//!
//! Computed once from a built [`IndexStore`] and immutable afterwards.
//! Weights use the log-TF scheme `w = (1 + ln tf) * idf` with
//! `idf = ln(N / df)`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::store::IndexStore;
use super::types::DocumentId;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VsmIndex {
    /// Total number of documents at build time
    #[serde(rename = "N")]
    pub doc_count: u32,
    /// Per-term inverse document frequency, ln(N / df)
    pub idf: BTreeMap<String, f64>,
    /// Per-document weight-vector norms
    pub doc_norms: BTreeMap<DocumentId, f64>,
    /// Term -> (doc_id -> tf), positions dropped
    pub postings: BTreeMap<String, BTreeMap<DocumentId, u32>>,
}

impl VsmIndex {
    /// Derive the VSM tables from a built store
    pub fn from_store(store: &IndexStore, doc_count: u32) -> Self {
        let mut idf = BTreeMap::new();
        let mut doc_norms: BTreeMap<DocumentId, f64> = BTreeMap::new();
        let mut postings: BTreeMap<String, BTreeMap<DocumentId, u32>> = BTreeMap::new();

        let n = doc_count as f64;
        for (term, term_postings) in store.terms() {
            let df = term_postings.doc_frequency() as f64;
            if df == 0.0 || n == 0.0 {
                continue;
            }
            let term_idf = (n / df).ln();
            idf.insert(term.to_string(), term_idf);

            let out = postings.entry(term.to_string()).or_default();
            for (docno, posting) in term_postings.iter() {
                let doc_id = match store.doc_id(docno) {
                    Some(id) => id.to_string(),
                    None => continue,
                };
                let tf = posting.term_frequency;
                out.insert(doc_id.clone(), tf);

                let w_td = (1.0 + (tf as f64).ln()) * term_idf;
                *doc_norms.entry(doc_id).or_insert(0.0) += w_td * w_td;
            }
        }

        for norm in doc_norms.values_mut() {
            *norm = norm.sqrt();
        }

        Self {
            doc_count,
            idf,
            doc_norms,
            postings,
        }
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    pub fn doc_norm(&self, doc_id: &str) -> Option<f64> {
        self.doc_norms.get(doc_id).copied()
    }

    /// TF-IDF weight of a (term, doc) pair, None when either is absent
    pub fn weight(&self, term: &str, tf: u32) -> Option<f64> {
        self.idf(term).map(|idf| (1.0 + (tf as f64).ln()) * idf)
    }

    /// Reconstruct full document TF-IDF vectors, used by the feedback
    /// expander to form its centroid.
    pub fn document_vectors(&self) -> HashMap<DocumentId, HashMap<String, f64>> {
        let mut documents: HashMap<DocumentId, HashMap<String, f64>> = HashMap::new();
        for (term, doc_tfs) in &self.postings {
            let idf = match self.idf.get(term) {
                Some(idf) => *idf,
                None => continue,
            };
            for (doc_id, &tf) in doc_tfs {
                let w_td = (1.0 + (tf as f64).ln()) * idf;
                documents
                    .entry(doc_id.clone())
                    .or_default()
                    .insert(term.clone(), w_td);
            }
        }
        documents
    }
}
