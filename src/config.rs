use serde::{Deserialize, Serialize};

/// Tokenizer configuration
///
/// Defaults mirror the indexing pipeline: raw tokens, no case folding, no
/// stopword removal, no stemming. Query-time tokenization must use the same
/// configuration as the build, or phrase positions stop lining up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: false,
            remove_stopwords: false,
            stem: false,
            language: "english".to_string(),
        }
    }
}

/// Okapi BM25 hyperparameters.
///
/// There is deliberately no k3 knob: query-term-frequency weighting is
/// permanently disabled and duplicate query terms count once.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation parameter
    pub k1: f64,
    /// Length normalization parameter
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

/// Externally tuned (k1, b) pairs keyed by the top-k cutoff they were
/// optimized for.
const TUNED_BY_TOP_K: &[(usize, Bm25Params)] = &[
    (20, Bm25Params { k1: 0.8, b: 0.08 }),
    (200, Bm25Params { k1: 1.618, b: 0.498 }),
];

impl Bm25Params {
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// Select the tuned parameter pair whose top-k cutoff is nearest to `k`.
    pub fn for_top_k(k: usize) -> Self {
        TUNED_BY_TOP_K
            .iter()
            .min_by_key(|(cutoff, _)| cutoff.abs_diff(k))
            .map(|(_, params)| *params)
            .unwrap_or_default()
    }
}

/// Rocchio pseudo-relevance-feedback tunables
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RocchioParams {
    /// Number of top-ranked documents treated as pseudo-relevant
    pub feedback_docs: usize,
    /// Weight of the original query vector
    pub alpha: f64,
    /// Weight of the feedback centroid
    pub beta: f64,
    /// Number of highest-weight centroid terms kept for expansion
    pub expansion_terms: usize,
}

impl Default for RocchioParams {
    fn default() -> Self {
        Self {
            feedback_docs: 55,
            alpha: 1.0,
            beta: 0.8,
            expansion_terms: 45,
        }
    }
}

/// Engine-level settings bundling the per-component configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub tokenizer: TokenizerConfig,
    pub bm25: Option<Bm25Params>,
    pub rocchio: RocchioParams,
}

impl RetrievalSettings {
    /// BM25 parameters for a given cutoff: explicit settings win, otherwise
    /// the nearest tuned pair.
    pub fn bm25_for_top_k(&self, k: usize) -> Bm25Params {
        self.bm25.unwrap_or_else(|| Bm25Params::for_top_k(k))
    }
}
