//! Shared result and output types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::DocumentId;

/// A document with its retrieval score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    pub doc_id: DocumentId,
    pub score: f64,
}

impl ScoredDoc {
    pub fn new(doc_id: impl Into<DocumentId>, score: f64) -> Self {
        Self {
            doc_id: doc_id.into(),
            score,
        }
    }
}

/// One line of a ranked run: a query, a document, its rank and score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    pub query_id: String,
    pub doc_id: DocumentId,
    pub rank: usize,
    pub score: f64,
}

impl RankedHit {
    /// TREC-style run line: `qid docid rank score`
    pub fn run_line(&self) -> String {
        format!(
            "{} {} {} {:.6}",
            self.query_id, self.doc_id, self.rank, self.score
        )
    }
}

/// Which retrieval model answers a query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Boolean and phrase matching, unranked
    Boolean,
    /// Okapi BM25 ranking
    Bm25,
    /// TF-IDF cosine ranking
    Vsm,
    /// VSM with Rocchio pseudo-relevance feedback
    Feedback,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Boolean => "boolean",
            SearchMode::Bm25 => "bm25",
            SearchMode::Vsm => "vsm",
            SearchMode::Feedback => "feedback",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "boolean" | "bool" => Ok(SearchMode::Boolean),
            "bm25" => Ok(SearchMode::Bm25),
            "vsm" | "cosine" => Ok(SearchMode::Vsm),
            "feedback" | "rocchio" => Ok(SearchMode::Feedback),
            other => Err(format!("unknown search mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_line() {
        let hit = RankedHit {
            query_id: "12".to_string(),
            doc_id: "doi:10.1/abc".to_string(),
            rank: 1,
            score: 3.25,
        };
        assert_eq!(hit.run_line(), "12 doi:10.1/abc 1 3.250000");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("BM25".parse::<SearchMode>().unwrap(), SearchMode::Bm25);
        assert_eq!("rocchio".parse::<SearchMode>().unwrap(), SearchMode::Feedback);
        assert!("pagerank".parse::<SearchMode>().is_err());
    }
}
