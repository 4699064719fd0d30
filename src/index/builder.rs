//! Index construction from a stream of pre-tokenized documents
//!
//! The builder consumes `(doc_id, tokens)` pairs produced by the external
//! tokenizer and accumulates postings under a fixed vocabulary. Tokens
//! outside the vocabulary still advance the position counter and count
//! toward document length; they are just never indexed.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::statistics::CollectionStats;
use super::store::IndexStore;
use super::types::Posting;

/// A store plus its collection statistics, produced in one pass
#[derive(Clone, Debug, Default)]
pub struct BuiltIndex {
    pub store: IndexStore,
    pub stats: CollectionStats,
}

/// Accumulates a positional inverted index document by document
pub struct IndexBuilder {
    vocabulary: HashSet<String>,
    store: IndexStore,
    stats: CollectionStats,
    seen: HashSet<String>,
}

impl IndexBuilder {
    /// Create a builder restricted to the given vocabulary. An empty
    /// vocabulary yields an empty postings map (statistics still accrue).
    pub fn new(vocabulary: impl IntoIterator<Item = String>) -> Self {
        Self {
            vocabulary: vocabulary.into_iter().collect(),
            store: IndexStore::new(),
            stats: CollectionStats::new(),
            seen: HashSet::new(),
        }
    }

    /// Index one document. Duplicate doc_ids are skipped entirely: the first
    /// occurrence wins and later ones are never merged in.
    pub fn add_document(&mut self, doc_id: &str, tokens: &[String]) {
        if doc_id.is_empty() {
            debug!("skipping record with empty doc_id");
            return;
        }
        if !self.seen.insert(doc_id.to_string()) {
            debug!(doc_id, "skipping duplicate document");
            return;
        }

        let docno = self.store.register_document(doc_id);

        // One position counter across the whole token stream
        let mut per_term_positions: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
        let mut pos = 0u32;
        for token in tokens {
            if self.vocabulary.contains(token) {
                per_term_positions.entry(token.as_str()).or_default().push(pos);
            }
            pos += 1;
        }

        self.stats.add_document(doc_id, pos);

        for (term, positions) in per_term_positions {
            self.store
                .insert_posting(term, docno, Posting::from_positions(positions));
        }
    }

    /// Drain an ordered record stream into the builder and finish
    pub fn from_records<I, S>(records: I, vocabulary: impl IntoIterator<Item = String>) -> BuiltIndex
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: AsRef<str>,
    {
        let mut builder = Self::new(vocabulary);
        for (doc_id, tokens) in records {
            builder.add_document(doc_id.as_ref(), &tokens);
        }
        builder.build()
    }

    pub fn build(self) -> BuiltIndex {
        BuiltIndex {
            store: self.store,
            stats: self.stats,
        }
    }
}
