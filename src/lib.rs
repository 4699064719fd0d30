//! remora: a positional-index document retrieval engine.
//!
//! Builds a positional inverted index over a JSONL corpus under a fixed
//! vocabulary, then answers queries under four models: boolean/phrase
//! matching, Okapi BM25, TF-IDF cosine similarity, and cosine with one
//! round of Rocchio pseudo-relevance feedback.

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod models;
pub mod query;
pub mod rank;
pub mod tokenizer;

pub use config::{Bm25Params, RetrievalSettings, RocchioParams, TokenizerConfig};
pub use engine::RetrievalEngine;
pub use error::{RemoraError, Result};
pub use index::{BuiltIndex, CollectionStats, IndexBuilder, IndexStore, VsmIndex};
pub use models::{RankedHit, ScoredDoc, SearchMode};
pub use tokenizer::Tokenizer;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
