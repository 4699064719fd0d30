//! Legacy binary index layout
//!
//! Variable-byte encoded alternative to `index.json`, kept readable and
//! writable behind the same [`IndexStore`] interface. Two files:
//!
//! - `docmap.bin`: vbyte doc count, then per document (in docno order)
//!   vbyte id length, the UTF-8 id bytes, vbyte docno.
//! - `index.bin`: per term (lexicographic) vbyte term length, term bytes,
//!   vbyte df, then per document (ascending docno) a gap-coded docno,
//!   vbyte tf, and tf gap-coded positions.
//!
//! Unlike the JSON side this format has no statistics companion; it covers
//! the postings only.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{RemoraError, Result};

use super::store::IndexStore;
use super::types::{DocNo, Posting};

pub const INDEX_BIN: &str = "index.bin";
pub const DOCMAP_BIN: &str = "docmap.bin";

/// Variable-byte encoding: 7 bits per byte, high bit marks the last byte
pub fn encode_vbyte(value: u32, output: &mut Vec<u8>) {
    let mut v = value;
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            output.push(byte | 0x80);
            break;
        } else {
            output.push(byte);
        }
    }
}

/// Decode a variable-byte encoded integer
pub fn decode_vbyte(input: &[u8], pos: &mut usize) -> Result<u32> {
    let mut result: u32 = 0;
    let mut shift = 0;

    loop {
        let byte = *input
            .get(*pos)
            .ok_or_else(|| RemoraError::CorruptIndex("unexpected end of vbyte".to_string()))?;
        *pos += 1;

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 != 0 {
            return Ok(result);
        }

        shift += 7;
        if shift > 28 {
            return Err(RemoraError::CorruptIndex("vbyte value too large".to_string()));
        }
    }
}

fn read_bytes<'a>(input: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = *pos + len;
    let slice = input
        .get(*pos..end)
        .ok_or_else(|| RemoraError::CorruptIndex("truncated record".to_string()))?;
    *pos = end;
    Ok(slice)
}

fn read_str(input: &[u8], pos: &mut usize) -> Result<String> {
    let len = decode_vbyte(input, pos)? as usize;
    let bytes = read_bytes(input, pos, len)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| RemoraError::CorruptIndex("invalid UTF-8 in record".to_string()))
}

/// Write the legacy pair of files into `dir`
pub fn write_legacy(store: &IndexStore, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    // Document map, docno order
    let mut docmap = Vec::new();
    encode_vbyte(store.doc_count(), &mut docmap);
    for n in 0..store.doc_count() {
        let docno = DocNo::new(n);
        let doc_id = store
            .doc_id(docno)
            .ok_or_else(|| RemoraError::CorruptIndex(format!("missing doc_id for docno {}", n)))?;
        encode_vbyte(doc_id.len() as u32, &mut docmap);
        docmap.extend_from_slice(doc_id.as_bytes());
        encode_vbyte(docno.as_u32(), &mut docmap);
    }
    File::create(dir.join(DOCMAP_BIN))?.write_all(&docmap)?;

    // Postings, terms lexicographic, docs gap-coded in ascending docno order
    let mut index = Vec::new();
    for (term, term_postings) in store.terms() {
        encode_vbyte(term.len() as u32, &mut index);
        index.extend_from_slice(term.as_bytes());
        encode_vbyte(term_postings.doc_frequency(), &mut index);

        let mut prev_docno = 0u32;
        for (docno, posting) in term_postings.iter() {
            encode_vbyte(docno.as_u32() - prev_docno, &mut index);
            prev_docno = docno.as_u32();

            encode_vbyte(posting.term_frequency, &mut index);
            let mut prev_pos = 0u32;
            for &p in &posting.positions {
                encode_vbyte(p - prev_pos, &mut index);
                prev_pos = p;
            }
        }
    }
    File::create(dir.join(INDEX_BIN))?.write_all(&index)?;
    Ok(())
}

/// Read the legacy pair of files from `dir` into a fresh store
pub fn read_legacy(dir: &Path) -> Result<IndexStore> {
    let mut docmap = Vec::new();
    File::open(dir.join(DOCMAP_BIN))
        .map_err(|e| RemoraError::IndexNotFound {
            path: dir.to_path_buf(),
            reason: format!("{}: {}", DOCMAP_BIN, e),
        })?
        .read_to_end(&mut docmap)?;

    let mut store = IndexStore::new();
    let mut pos = 0usize;
    let doc_count = decode_vbyte(&docmap, &mut pos)?;
    for expected in 0..doc_count {
        let doc_id = read_str(&docmap, &mut pos)?;
        let stored_docno = decode_vbyte(&docmap, &mut pos)?;
        let assigned = store.register_document(&doc_id);
        if stored_docno != expected || assigned.as_u32() != stored_docno {
            return Err(RemoraError::CorruptIndex(format!(
                "docmap out of order: doc '{}' stored as {} assigned {}",
                doc_id,
                stored_docno,
                assigned.as_u32()
            )));
        }
    }

    let mut index = Vec::new();
    File::open(dir.join(INDEX_BIN))
        .map_err(|e| RemoraError::IndexNotFound {
            path: dir.to_path_buf(),
            reason: format!("{}: {}", INDEX_BIN, e),
        })?
        .read_to_end(&mut index)?;

    let mut pos = 0usize;
    while pos < index.len() {
        let term = read_str(&index, &mut pos)?;
        let df = decode_vbyte(&index, &mut pos)?;

        let mut docno = 0u32;
        for i in 0..df {
            let gap = decode_vbyte(&index, &mut pos)?;
            docno = if i == 0 { gap } else { docno + gap };
            if docno >= doc_count {
                return Err(RemoraError::CorruptIndex(format!(
                    "docno {} out of range for term '{}'",
                    docno, term
                )));
            }

            let tf = decode_vbyte(&index, &mut pos)?;
            let mut positions = Vec::with_capacity(tf as usize);
            let mut p = 0u32;
            for j in 0..tf {
                let gap = decode_vbyte(&index, &mut pos)?;
                p = if j == 0 { gap } else { p + gap };
                positions.push(p);
            }

            store.insert_posting(&term, DocNo::new(docno), Posting::from_positions(positions));
        }
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vbyte_roundtrip() {
        let mut output = Vec::new();
        for v in [0u32, 1, 127, 128, 16383, 1_000_000] {
            encode_vbyte(v, &mut output);
        }

        let mut pos = 0;
        for expected in [0u32, 1, 127, 128, 16383, 1_000_000] {
            assert_eq!(decode_vbyte(&output, &mut pos).unwrap(), expected);
        }
        assert_eq!(pos, output.len());
    }

    #[test]
    fn test_vbyte_truncated() {
        // continuation byte with nothing after it
        let buf = vec![0x01];
        let mut pos = 0;
        assert!(decode_vbyte(&buf, &mut pos).is_err());
    }

    #[test]
    fn test_legacy_roundtrip() {
        let mut store = IndexStore::new();
        let a = store.register_document("doc-a");
        let b = store.register_document("doc-b");
        store.insert_posting("retrieval", a, Posting::from_positions(vec![1, 5, 9]));
        store.insert_posting("retrieval", b, Posting::from_positions(vec![0]));
        store.insert_posting("data", a, Posting::from_positions(vec![0]));

        let dir = tempfile::tempdir().unwrap();
        write_legacy(&store, dir.path()).unwrap();
        let restored = read_legacy(dir.path()).unwrap();

        assert_eq!(restored.doc_count(), 2);
        assert_eq!(restored.doc_frequency("retrieval"), 2);
        let docno = restored.docno("doc-a").unwrap();
        let posting = restored.term_postings("retrieval").unwrap().get(docno).unwrap();
        assert_eq!(posting.positions, vec![1, 5, 9]);
        assert_eq!(posting.term_frequency, 3);
    }
}
