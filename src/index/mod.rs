//! Positional inverted index: storage, construction, statistics, and the
//! persisted formats.

pub mod binary;
pub mod builder;
pub mod json;
pub mod statistics;
pub mod store;
pub mod types;
pub mod vsm;

pub use builder::{BuiltIndex, IndexBuilder};
pub use statistics::CollectionStats;
pub use store::{IndexStore, TermPostings};
pub use types::{DocNo, DocumentId, Posting};
pub use vsm::VsmIndex;
