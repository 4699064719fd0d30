//! Postfix query evaluation over document bitmaps
//!
//! Walks a postfix token stream with a stack of [`RoaringBitmap`]s. `AND`
//! and `OR` map to bitmap intersection and union; `NOT` complements
//! against the universe of indexed documents. Phrase atoms intersect
//! candidate documents smallest-df-first, then verify word adjacency with
//! a forward-only sweep over the per-document position lists.
//!
//! The context caches per-token and per-phrase bitmaps so repeated atoms
//! inside one query resolve once.

use std::collections::HashMap;

use roaring::RoaringBitmap;

use crate::error::{RemoraError, Result};
use crate::index::IndexStore;

use super::lexer::QueryToken;

pub struct EvalContext<'a> {
    store: &'a IndexStore,
    token_cache: HashMap<String, RoaringBitmap>,
    phrase_cache: HashMap<Vec<String>, RoaringBitmap>,
}

impl<'a> EvalContext<'a> {
    pub fn new(store: &'a IndexStore) -> Self {
        Self {
            store,
            token_cache: HashMap::new(),
            phrase_cache: HashMap::new(),
        }
    }

    /// Evaluate a postfix stream into the matching document set
    pub fn evaluate(&mut self, postfix: &[QueryToken]) -> Result<RoaringBitmap> {
        let mut stack: Vec<RoaringBitmap> = Vec::new();

        for token in postfix {
            match token {
                QueryToken::Term(term) => stack.push(self.docs_for_token(term)),
                QueryToken::Phrase(tokens) => stack.push(self.docs_for_phrase(tokens)),
                QueryToken::Not => {
                    let operand = stack.pop().ok_or_else(|| {
                        RemoraError::QueryParse("NOT is missing an operand".to_string())
                    })?;
                    stack.push(self.store.universe() - operand);
                }
                QueryToken::And | QueryToken::Or => {
                    let right = stack.pop();
                    let left = stack.pop();
                    let (left, right) = match (left, right) {
                        (Some(l), Some(r)) => (l, r),
                        _ => {
                            return Err(RemoraError::QueryParse(
                                "binary operator is missing an operand".to_string(),
                            ))
                        }
                    };
                    stack.push(match token {
                        QueryToken::And => left & right,
                        _ => left | right,
                    });
                }
                QueryToken::LeftParen | QueryToken::RightParen => {
                    return Err(RemoraError::QueryParse(
                        "parenthesis in postfix stream".to_string(),
                    ))
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(result), true) => Ok(result),
            (None, _) => Ok(RoaringBitmap::new()),
            _ => Err(RemoraError::QueryParse(
                "query leaves extra operands".to_string(),
            )),
        }
    }

    /// Documents containing a single token; absent tokens match nothing
    fn docs_for_token(&mut self, term: &str) -> RoaringBitmap {
        if let Some(cached) = self.token_cache.get(term) {
            return cached.clone();
        }
        let docs = self.store.doc_bitmap(term);
        self.token_cache.insert(term.to_string(), docs.clone());
        docs
    }

    /// Documents containing the tokens as a contiguous phrase
    fn docs_for_phrase(&mut self, tokens: &[String]) -> RoaringBitmap {
        if let Some(cached) = self.phrase_cache.get(tokens) {
            return cached.clone();
        }
        let docs = self.resolve_phrase(tokens);
        self.phrase_cache.insert(tokens.to_vec(), docs.clone());
        docs
    }

    fn resolve_phrase(&self, tokens: &[String]) -> RoaringBitmap {
        if tokens.is_empty() {
            return RoaringBitmap::new();
        }
        if tokens.len() == 1 {
            return self.store.doc_bitmap(&tokens[0]);
        }

        let mut term_postings = Vec::with_capacity(tokens.len());
        for token in tokens {
            match self.store.term_postings(token) {
                Some(postings) => term_postings.push(postings),
                None => return RoaringBitmap::new(),
            }
        }

        // Intersect candidates starting from the rarest term
        let mut order: Vec<usize> = (0..term_postings.len()).collect();
        order.sort_by_key(|&i| term_postings[i].doc_frequency());

        let mut candidates = term_postings[order[0]].doc_bitmap();
        for &i in &order[1..] {
            if candidates.is_empty() {
                return candidates;
            }
            candidates &= term_postings[i].doc_bitmap();
        }

        let mut matches = RoaringBitmap::new();
        for docno in candidates.iter().map(crate::index::DocNo::new) {
            let mut position_lists: Vec<&[u32]> = Vec::with_capacity(tokens.len());
            for postings in &term_postings {
                match postings.get(docno) {
                    Some(posting) => position_lists.push(&posting.positions),
                    None => break,
                }
            }
            if position_lists.len() == tokens.len() && phrase_occurs(&position_lists) {
                matches.insert(docno.as_u32());
            }
        }
        matches
    }
}

/// Adjacency check over sorted position lists, one list per phrase token.
/// Forward-only pointers: each list is scanned at most once per document.
fn phrase_occurs(position_lists: &[&[u32]]) -> bool {
    let mut pointers = vec![0usize; position_lists.len()];

    'starts: for &start in position_lists[0] {
        let mut prev = start;
        for (i, list) in position_lists.iter().enumerate().skip(1) {
            let want = prev + 1;
            while pointers[i] < list.len() && list[pointers[i]] < want {
                pointers[i] += 1;
            }
            match list.get(pointers[i]) {
                Some(&p) if p == want => prev = p,
                Some(_) => continue 'starts,
                None => return false,
            }
        }
        return true;
    }
    false
}
