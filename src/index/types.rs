//! Core types for the positional index

use serde::{Deserialize, Serialize};

/// External document identifier (string form, as found in the corpus)
pub type DocumentId = String;

/// Dense document number (0..doc_count), assigned in first-seen order.
/// Used internally for posting storage and set operations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocNo(pub u32);

impl DocNo {
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Occurrences of one term within one document.
///
/// Invariant: `positions` is strictly increasing and
/// `positions.len() == term_frequency as usize`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Term frequency in this document
    pub term_frequency: u32,
    /// Zero-based token offsets within the concatenated document text
    pub positions: Vec<u32>,
}

impl Posting {
    /// Build a posting from sorted positions; tf is derived from the length.
    pub fn from_positions(positions: Vec<u32>) -> Self {
        Self {
            term_frequency: positions.len() as u32,
            positions,
        }
    }
}
