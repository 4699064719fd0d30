//! Retrieval engine: one loaded index, four query models
//!
//! Owns the loaded index artifacts and a tokenizer configured to match the
//! build. Per-query parse failures are recoverable; a batch run logs and
//! skips them rather than aborting.

use std::path::Path;

use tracing::warn;

use crate::config::RetrievalSettings;
use crate::error::Result;
use crate::index::{self, BuiltIndex, CollectionStats, DocumentId, IndexStore, VsmIndex};
use crate::models::{RankedHit, ScoredDoc, SearchMode};
use crate::query::{parser, EvalContext};
use crate::rank::{Bm25Ranker, RocchioExpander, VsmRanker};
use crate::tokenizer::Tokenizer;

/// Sentinel score for unranked boolean matches
const BOOLEAN_SCORE: f64 = 1.0;

pub struct RetrievalEngine {
    store: IndexStore,
    stats: CollectionStats,
    vsm: VsmIndex,
    tokenizer: Tokenizer,
    settings: RetrievalSettings,
}

impl RetrievalEngine {
    /// Load a previously saved index directory
    pub fn open(dir: &Path, settings: RetrievalSettings) -> Result<Self> {
        let (built, vsm) = index::json::load_from_dir(dir)?;
        Ok(Self::from_parts(built, vsm, settings))
    }

    /// Assemble an engine from freshly built artifacts
    pub fn from_parts(built: BuiltIndex, vsm: VsmIndex, settings: RetrievalSettings) -> Self {
        let tokenizer = Tokenizer::new(&settings.tokenizer);
        Self {
            store: built.store,
            stats: built.stats,
            vsm,
            tokenizer,
            settings,
        }
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }

    /// Boolean/phrase evaluation; matches come back in lexicographic
    /// doc_id order with no ranking.
    pub fn boolean_search(&self, query: &str) -> Result<Vec<DocumentId>> {
        let postfix = parser::parse(query, &self.tokenizer)?;
        let docs = EvalContext::new(&self.store).evaluate(&postfix)?;
        Ok(self.store.resolve_sorted(&docs))
    }

    pub fn bm25_search(&self, query: &str, top_k: usize) -> Vec<ScoredDoc> {
        let terms = self.tokenizer.tokenize(query);
        let params = self.settings.bm25_for_top_k(top_k);
        Bm25Ranker::new(&self.store, &self.stats, params).rank(&terms, top_k)
    }

    pub fn vsm_search(&self, query: &str, top_k: usize) -> Vec<ScoredDoc> {
        let terms = self.tokenizer.tokenize(query);
        VsmRanker::new(&self.vsm).rank(&terms, top_k)
    }

    pub fn feedback_search(&self, query: &str, top_k: usize) -> Vec<ScoredDoc> {
        let terms = self.tokenizer.tokenize(query);
        RocchioExpander::new(&self.vsm, self.settings.rocchio).rank(&terms, top_k)
    }

    /// Answer one query under the chosen model. Boolean results carry a
    /// uniform sentinel score and are truncated like the ranked models.
    pub fn search(&self, mode: SearchMode, query: &str, top_k: usize) -> Result<Vec<ScoredDoc>> {
        let results = match mode {
            SearchMode::Boolean => self
                .boolean_search(query)?
                .into_iter()
                .take(top_k)
                .map(|doc_id| ScoredDoc::new(doc_id, BOOLEAN_SCORE))
                .collect(),
            SearchMode::Bm25 => self.bm25_search(query, top_k),
            SearchMode::Vsm => self.vsm_search(query, top_k),
            SearchMode::Feedback => self.feedback_search(query, top_k),
        };
        Ok(results)
    }

    /// Run a query batch, ranking hits from 1 per query. Queries that fail
    /// to parse are logged and skipped; anything else aborts the batch.
    pub fn run_batch(
        &self,
        mode: SearchMode,
        queries: &[crate::corpus::Query],
        top_k: usize,
    ) -> Result<Vec<RankedHit>> {
        let mut hits = Vec::new();
        for query in queries {
            let results = match self.search(mode, &query.text, top_k) {
                Ok(results) => results,
                Err(e) if e.is_query_error() => {
                    warn!(query_id = %query.query_id, error = %e, "skipping unparsable query");
                    continue;
                }
                Err(e) => return Err(e),
            };
            for (i, doc) in results.into_iter().enumerate() {
                hits.push(RankedHit {
                    query_id: query.query_id.clone(),
                    doc_id: doc.doc_id,
                    rank: i + 1,
                    score: doc.score,
                });
            }
        }
        Ok(hits)
    }
}
