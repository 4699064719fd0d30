//! Persisted JSON index formats
//!
//! Three files per index directory, all compact JSON with deterministic
//! ordering (terms lexicographic, per-term documents lexicographic by
//! external id):
//!
//! - `index.json`: `term -> { df, postings: { doc_id -> { tf, pos } } }`
//! - `stats.json`: `{ N, avgdl, doc_len }`
//! - `vsm.json`:   `{ N, idf, doc_norms, postings }`
//!
//! Loading tolerates the historical postings shapes (`{tf, pos}`,
//! `{tf, positions}`, bare position array, and term entries without the
//! `{df, postings}` wrapper) and normalizes everything to [`Posting`] here,
//! so shape ambiguity never reaches the evaluators.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RemoraError, Result};

use super::builder::BuiltIndex;
use super::statistics::CollectionStats;
use super::store::IndexStore;
use super::types::Posting;
use super::vsm::VsmIndex;

pub const INDEX_FILE: &str = "index.json";
pub const STATS_FILE: &str = "stats.json";
pub const VSM_FILE: &str = "vsm.json";

#[derive(Serialize)]
struct TermEntryOut<'a> {
    df: u32,
    postings: BTreeMap<&'a str, PostingOut<'a>>,
}

#[derive(Serialize)]
struct PostingOut<'a> {
    tf: u32,
    pos: &'a [u32],
}

/// Tolerated on-disk posting shapes, normalized right after parsing
#[derive(Deserialize)]
#[serde(untagged)]
enum PostingShape {
    Entry {
        #[allow(dead_code)]
        #[serde(default)]
        tf: Option<u32>,
        #[serde(alias = "positions", default)]
        pos: Vec<u32>,
    },
    Positions(Vec<u32>),
}

impl PostingShape {
    fn normalize(self) -> Posting {
        let mut positions = match self {
            PostingShape::Entry { pos, .. } => pos,
            PostingShape::Positions(pos) => pos,
        };
        positions.sort_unstable();
        positions.dedup();
        // tf always derived from positions so the invariant holds
        Posting::from_positions(positions)
    }
}

/// Term entries with or without the `{df, postings}` wrapper
#[derive(Deserialize)]
#[serde(untagged)]
enum TermShape {
    Wrapped {
        #[allow(dead_code)]
        df: u32,
        postings: BTreeMap<String, PostingShape>,
    },
    Direct(BTreeMap<String, PostingShape>),
}

impl TermShape {
    fn into_postings(self) -> BTreeMap<String, PostingShape> {
        match self {
            TermShape::Wrapped { postings, .. } => postings,
            TermShape::Direct(postings) => postings,
        }
    }
}

/// Serialize the postings map. `BTreeMap` keys give the deterministic
/// term/doc ordering the format requires.
pub fn write_index<W: Write>(store: &IndexStore, writer: W) -> Result<()> {
    let mut out: BTreeMap<&str, TermEntryOut> = BTreeMap::new();
    for (term, term_postings) in store.terms() {
        let mut postings: BTreeMap<&str, PostingOut> = BTreeMap::new();
        for (docno, posting) in term_postings.iter() {
            if let Some(doc_id) = store.doc_id(docno) {
                postings.insert(
                    doc_id,
                    PostingOut {
                        tf: posting.term_frequency,
                        pos: &posting.positions,
                    },
                );
            }
        }
        out.insert(
            term,
            TermEntryOut {
                df: postings.len() as u32,
                postings,
            },
        );
    }
    serde_json::to_writer(writer, &out)?;
    Ok(())
}

/// Parse and normalize a postings map into a fresh store
pub fn read_index<R: Read>(reader: R) -> Result<IndexStore> {
    let raw: BTreeMap<String, TermShape> = serde_json::from_reader(reader)?;

    let mut store = IndexStore::new();
    for (term, shape) in raw {
        for (doc_id, posting) in shape.into_postings() {
            let docno = store.register_document(&doc_id);
            store.insert_posting(&term, docno, posting.normalize());
        }
    }
    Ok(store)
}

/// Write all three index files into `dir`, creating it if needed
pub fn save_to_dir(dir: &Path, built: &BuiltIndex, vsm: &VsmIndex) -> Result<()> {
    fs::create_dir_all(dir)?;

    let index_path = dir.join(INDEX_FILE);
    write_index(&built.store, BufWriter::new(File::create(&index_path)?))?;

    let stats_path = dir.join(STATS_FILE);
    serde_json::to_writer(BufWriter::new(File::create(&stats_path)?), &built.stats)?;

    let vsm_path = dir.join(VSM_FILE);
    serde_json::to_writer(BufWriter::new(File::create(&vsm_path)?), vsm)?;

    info!(dir = %dir.display(), terms = built.store.term_count(), docs = built.stats.doc_count, "index written");
    Ok(())
}

/// Load all three index files from `dir`. A missing file is a fatal setup
/// error for the whole run.
pub fn load_from_dir(dir: &Path) -> Result<(BuiltIndex, VsmIndex)> {
    let open = |name: &str| -> Result<BufReader<File>> {
        let path = dir.join(name);
        File::open(&path)
            .map(BufReader::new)
            .map_err(|e| RemoraError::IndexNotFound {
                path: dir.to_path_buf(),
                reason: format!("{}: {}", name, e),
            })
    };

    let store = read_index(open(INDEX_FILE)?)?;
    let stats: CollectionStats = serde_json::from_reader(open(STATS_FILE)?)?;
    let vsm: VsmIndex = serde_json::from_reader(open(VSM_FILE)?)?;

    info!(dir = %dir.display(), terms = store.term_count(), docs = stats.doc_count, "index loaded");
    Ok((BuiltIndex { store, stats }, vsm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_full_entry() {
        let json = r#"{"term":{"df":1,"postings":{"d1":{"tf":2,"pos":[3,7]}}}}"#;
        let store = read_index(json.as_bytes()).unwrap();
        let docno = store.docno("d1").unwrap();
        let posting = store.term_postings("term").unwrap().get(docno).unwrap();
        assert_eq!(posting.term_frequency, 2);
        assert_eq!(posting.positions, vec![3, 7]);
    }

    #[test]
    fn test_shape_positions_alias() {
        let json = r#"{"term":{"d1":{"tf":2,"positions":[3,7]}}}"#;
        let store = read_index(json.as_bytes()).unwrap();
        let docno = store.docno("d1").unwrap();
        let posting = store.term_postings("term").unwrap().get(docno).unwrap();
        assert_eq!(posting.positions, vec![3, 7]);
    }

    #[test]
    fn test_shape_bare_position_list() {
        let json = r#"{"term":{"d1":[7,3,3]}}"#;
        let store = read_index(json.as_bytes()).unwrap();
        let docno = store.docno("d1").unwrap();
        let posting = store.term_postings("term").unwrap().get(docno).unwrap();
        // normalized: sorted, deduplicated, tf derived
        assert_eq!(posting.positions, vec![3, 7]);
        assert_eq!(posting.term_frequency, 2);
    }

    #[test]
    fn test_write_is_deterministic() {
        let mut store = IndexStore::new();
        let z = store.register_document("zz");
        let a = store.register_document("aa");
        store.insert_posting("beta", z, Posting::from_positions(vec![1]));
        store.insert_posting("beta", a, Posting::from_positions(vec![2]));
        store.insert_posting("alpha", z, Posting::from_positions(vec![0]));

        let mut first = Vec::new();
        write_index(&store, &mut first).unwrap();
        let mut second = Vec::new();
        write_index(&store, &mut second).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        // lexicographic term and doc ordering in the serialized text
        assert!(text.find("alpha").unwrap() < text.find("beta").unwrap());
        assert!(text.find("aa").unwrap() < text.find("zz").unwrap());
    }
}
