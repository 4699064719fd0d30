//! Collection-level statistics for BM25 length normalization
//!
//! Document length counts every token seen during tokenization, including
//! out-of-vocabulary tokens that were never indexed. Keeping the unfiltered
//! count makes length normalization comparable across vocabulary variants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::DocumentId;

/// Global statistics recorded at build time and immutable afterwards
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Total number of documents
    #[serde(rename = "N")]
    pub doc_count: u32,
    /// Mean of all document lengths (0.0 for an empty collection)
    #[serde(rename = "avgdl")]
    pub avg_doc_length: f64,
    /// Per-document token counts
    #[serde(rename = "doc_len")]
    pub doc_length: BTreeMap<DocumentId, u32>,
    /// Sum of all document lengths, maintained during the build only
    #[serde(skip)]
    total_doc_length: u64,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document and its token count, updating the running average
    pub fn add_document(&mut self, doc_id: &str, length: u32) {
        self.doc_length.insert(doc_id.to_string(), length);
        self.doc_count += 1;
        self.total_doc_length += length as u64;
        self.avg_doc_length = self.total_doc_length as f64 / self.doc_count as f64;
    }

    pub fn doc_length(&self, doc_id: &str) -> u32 {
        self.doc_length.get(doc_id).copied().unwrap_or(0)
    }
}

/// The running total is build-time scaffolding and excluded from equality,
/// so a deserialized stats table compares equal to the one it was built from.
impl PartialEq for CollectionStats {
    fn eq(&self, other: &Self) -> bool {
        self.doc_count == other.doc_count
            && self.avg_doc_length == other.avg_doc_length
            && self.doc_length == other.doc_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average() {
        let mut stats = CollectionStats::new();
        stats.add_document("a", 100);
        stats.add_document("b", 200);
        stats.add_document("c", 150);

        assert_eq!(stats.doc_count, 3);
        assert!((stats.avg_doc_length - 150.0).abs() < 1e-9);
        assert_eq!(stats.doc_length("b"), 200);
        assert_eq!(stats.doc_length("missing"), 0);
    }

    #[test]
    fn test_empty_collection() {
        let stats = CollectionStats::new();
        assert_eq!(stats.doc_count, 0);
        assert_eq!(stats.avg_doc_length, 0.0);
    }
}
