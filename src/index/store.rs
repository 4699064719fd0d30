//! In-memory positional inverted index
//!
//! Built once per corpus, then read-only. Queries may share a store across
//! threads; all per-query state lives in the evaluator's context.

use std::collections::{BTreeMap, HashMap};

use roaring::RoaringBitmap;

use super::types::{DocNo, DocumentId, Posting};

/// Postings for a single term: docno -> occurrence data.
/// Document frequency is the number of entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermPostings {
    docs: BTreeMap<DocNo, Posting>,
}

impl TermPostings {
    pub fn doc_frequency(&self) -> u32 {
        self.docs.len() as u32
    }

    pub fn get(&self, docno: DocNo) -> Option<&Posting> {
        self.docs.get(&docno)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocNo, &Posting)> {
        self.docs.iter().map(|(docno, posting)| (*docno, posting))
    }

    /// Docnos containing this term, as a bitmap for set operations
    pub fn doc_bitmap(&self) -> RoaringBitmap {
        self.docs.keys().map(|d| d.as_u32()).collect()
    }
}

/// Positional inverted index over one document collection.
///
/// Maps term -> postings, plus the docno <-> external-id registry and the
/// universe of docnos that appear in at least one postings list.
#[derive(Clone, Debug, Default)]
pub struct IndexStore {
    postings: BTreeMap<String, TermPostings>,
    doc_id_to_docno: HashMap<DocumentId, DocNo>,
    docno_to_doc_id: Vec<DocumentId>,
    universe: RoaringBitmap,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an external document id, assigning the next dense docno.
    /// Returns the existing docno if the id was already registered.
    pub fn register_document(&mut self, doc_id: &str) -> DocNo {
        if let Some(docno) = self.doc_id_to_docno.get(doc_id) {
            return *docno;
        }
        let docno = DocNo::new(self.docno_to_doc_id.len() as u32);
        self.docno_to_doc_id.push(doc_id.to_string());
        self.doc_id_to_docno.insert(doc_id.to_string(), docno);
        docno
    }

    /// Insert a posting for (term, docno). Last write wins; the builder and
    /// the deserializers each insert every pair exactly once.
    pub fn insert_posting(&mut self, term: &str, docno: DocNo, posting: Posting) {
        self.postings
            .entry(term.to_string())
            .or_default()
            .docs
            .insert(docno, posting);
        self.universe.insert(docno.as_u32());
    }

    pub fn term_postings(&self, term: &str) -> Option<&TermPostings> {
        self.postings.get(term)
    }

    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.postings
            .get(term)
            .map(|p| p.doc_frequency())
            .unwrap_or(0)
    }

    /// Docnos containing `term` (empty bitmap for absent terms)
    pub fn doc_bitmap(&self, term: &str) -> RoaringBitmap {
        self.postings
            .get(term)
            .map(|p| p.doc_bitmap())
            .unwrap_or_default()
    }

    /// Every docno present in any postings list. This is the complement
    /// domain for NOT.
    pub fn universe(&self) -> &RoaringBitmap {
        &self.universe
    }

    /// Terms in lexicographic order
    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermPostings)> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p))
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Number of registered documents (indexed or not)
    pub fn doc_count(&self) -> u32 {
        self.docno_to_doc_id.len() as u32
    }

    pub fn docno(&self, doc_id: &str) -> Option<DocNo> {
        self.doc_id_to_docno.get(doc_id).copied()
    }

    pub fn doc_id(&self, docno: DocNo) -> Option<&str> {
        self.docno_to_doc_id.get(docno.as_usize()).map(|s| s.as_str())
    }

    /// Resolve a bitmap of docnos to external ids, sorted lexicographically
    /// for deterministic output.
    pub fn resolve_sorted(&self, docnos: &RoaringBitmap) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = docnos
            .iter()
            .filter_map(|n| self.doc_id(DocNo::new(n)).map(|s| s.to_string()))
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> IndexStore {
        let mut store = IndexStore::new();
        let a = store.register_document("doc-a");
        let b = store.register_document("doc-b");
        store.insert_posting("retrieval", a, Posting::from_positions(vec![1]));
        store.insert_posting("retrieval", b, Posting::from_positions(vec![1]));
        store.insert_posting("data", a, Posting::from_positions(vec![0]));
        store
    }

    #[test]
    fn test_df_equals_postings_len() {
        let store = sample_store();
        for (term, postings) in store.terms() {
            assert_eq!(store.doc_frequency(term), postings.doc_frequency());
        }
        assert_eq!(store.doc_frequency("retrieval"), 2);
        assert_eq!(store.doc_frequency("data"), 1);
        assert_eq!(store.doc_frequency("absent"), 0);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut store = IndexStore::new();
        let first = store.register_document("doc-a");
        let again = store.register_document("doc-a");
        assert_eq!(first, again);
        assert_eq!(store.doc_count(), 1);
    }

    #[test]
    fn test_universe_covers_posted_docs() {
        let store = sample_store();
        assert_eq!(store.universe().len(), 2);
        let data_docs = store.doc_bitmap("data");
        assert!(data_docs.is_subset(store.universe()));
    }

    #[test]
    fn test_resolve_sorted_is_lexicographic() {
        let mut store = IndexStore::new();
        let z = store.register_document("zeta");
        let a = store.register_document("alpha");
        store.insert_posting("t", z, Posting::from_positions(vec![0]));
        store.insert_posting("t", a, Posting::from_positions(vec![0]));
        let ids = store.resolve_sorted(&store.doc_bitmap("t"));
        assert_eq!(ids, vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
