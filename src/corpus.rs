//! Corpus, vocabulary, and query file readers
//!
//! The corpus is one or more JSON-lines files, each line one document
//! object with a `doc_id` and the text fields `title`, `doi`, `date`,
//! `abstract`. Document text is the present fields joined in that fixed
//! order with single spaces. Malformed lines and records without a
//! `doc_id` are skipped, not fatal.
//!
//! Query files are JSON lines as well, tolerating the id under
//! `query_id`, `qid`, or `id` and the text under `title`, `query`, or
//! `text`.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

/// Text fields concatenated into the indexable document text, in order
const TEXT_FIELDS: [&str; 4] = ["title", "doi", "date", "abstract"];

/// One corpus document: external id plus its concatenated text
#[derive(Clone, Debug, PartialEq)]
pub struct CorpusDoc {
    pub doc_id: String,
    pub text: String,
}

/// One query: id plus raw query text
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub query_id: String,
    pub text: String,
}

#[derive(Deserialize)]
struct RawQuery {
    #[serde(alias = "qid", alias = "id")]
    query_id: Option<serde_json::Value>,
    #[serde(alias = "query", alias = "text")]
    title: Option<String>,
}

fn corpus_doc_from_line(line: &str) -> Option<CorpusDoc> {
    let obj: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(line) {
        Ok(obj) => obj,
        Err(e) => {
            debug!(error = %e, "skipping malformed corpus line");
            return None;
        }
    };

    let doc_id = match obj.get("doc_id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            debug!("skipping corpus record without doc_id");
            return None;
        }
    };

    let mut parts: Vec<String> = Vec::new();
    for field in TEXT_FIELDS {
        match obj.get(field) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => parts.push(s.clone()),
            Some(serde_json::Value::Null) | None => {}
            Some(other) => parts.push(other.to_string()),
        }
    }

    Some(CorpusDoc {
        doc_id,
        text: parts.join(" "),
    })
}

fn read_corpus_file(path: &Path, out: &mut Vec<CorpusDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(doc) = corpus_doc_from_line(line) {
            out.push(doc);
        }
    }
    Ok(())
}

/// Read a corpus from a JSONL file or a directory of JSONL files.
/// Directory entries are visited in lexicographic order so document
/// numbering is reproducible.
pub fn read_corpus(path: &Path) -> Result<Vec<CorpusDoc>> {
    let mut docs = Vec::new();
    if path.is_dir() {
        let mut entries: Vec<_> = fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();
        for entry in entries {
            read_corpus_file(&entry, &mut docs)?;
        }
    } else {
        read_corpus_file(path, &mut docs)?;
    }
    Ok(docs)
}

/// Read a vocabulary file, one token per line, blanks skipped
pub fn read_vocabulary(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut tokens = Vec::new();
    for line in reader.lines() {
        let token = line?.trim().to_string();
        if !token.is_empty() {
            tokens.push(token);
        }
    }
    Ok(tokens)
}

fn query_from_value(value: serde_json::Value) -> Option<Query> {
    let raw: RawQuery = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(error = %e, "skipping malformed query record");
            return None;
        }
    };

    let text = raw.title.unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        debug!("skipping query without text");
        return None;
    }

    // A missing id falls back to a text prefix, matching the run files
    let query_id = match raw.query_id {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => text.chars().take(30).collect(),
    };

    Some(Query {
        query_id,
        text: text.to_string(),
    })
}

/// Read queries from a JSON-lines file, or a file holding one JSON array
pub fn read_queries(path: &Path) -> Result<Vec<Query>> {
    let content = fs::read_to_string(path)?;
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        return Ok(values.into_iter().filter_map(query_from_value).collect());
    }

    let mut queries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => {
                if let Some(query) = query_from_value(value) {
                    queries.push(query);
                }
            }
            Err(e) => debug!(error = %e, "skipping malformed query line"),
        }
    }
    Ok(queries)
}
