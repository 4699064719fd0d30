//! Lexer for boolean/phrase query strings
//!
//! Splits a raw query into atoms and operators. Atoms are run through the
//! external tokenizer so that query terms line up with indexed terms:
//! a quoted phrase becomes one `Phrase` atom holding its token sequence,
//! a bare chunk becomes one `Term` atom per token it yields. Operator
//! keywords (`AND`, `OR`, `NOT`) are case-insensitive. Unknown words are
//! atoms, never an error; an unterminated quote runs to the end of the
//! string.

use crate::tokenizer::Tokenizer;

/// Token stream elements for query parsing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryToken {
    /// Single-token atom
    Term(String),
    /// Quoted multi-token phrase atom
    Phrase(Vec<String>),
    /// AND operator
    And,
    /// OR operator
    Or,
    /// NOT operator
    Not,
    /// Left parenthesis (grouping)
    LeftParen,
    /// Right parenthesis (grouping)
    RightParen,
}

impl QueryToken {
    pub fn is_atom(&self) -> bool {
        matches!(self, QueryToken::Term(_) | QueryToken::Phrase(_))
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, QueryToken::And | QueryToken::Or | QueryToken::Not)
    }
}

/// Lexer over a raw query string
pub struct Lexer<'a> {
    input: Vec<char>,
    position: usize,
    tokenizer: &'a Tokenizer,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &str, tokenizer: &'a Tokenizer) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            tokenizer,
        }
    }

    /// Consume the whole input into a token stream
    pub fn lex(mut self) -> Vec<QueryToken> {
        let mut out = Vec::new();

        while self.position < self.input.len() {
            let ch = self.input[self.position];

            if ch.is_whitespace() {
                self.position += 1;
                continue;
            }

            match ch {
                '(' => {
                    out.push(QueryToken::LeftParen);
                    self.position += 1;
                }
                ')' => {
                    out.push(QueryToken::RightParen);
                    self.position += 1;
                }
                '"' => {
                    let phrase_text = self.read_quoted();
                    let tokens = self.tokenizer.tokenize(&phrase_text);
                    if !tokens.is_empty() {
                        out.push(QueryToken::Phrase(tokens));
                    }
                }
                _ => {
                    let chunk = self.read_chunk();
                    match chunk.to_uppercase().as_str() {
                        "AND" => out.push(QueryToken::And),
                        "OR" => out.push(QueryToken::Or),
                        "NOT" => out.push(QueryToken::Not),
                        _ => {
                            for token in self.tokenizer.tokenize(&chunk) {
                                out.push(QueryToken::Term(token));
                            }
                        }
                    }
                }
            }
        }

        out
    }

    /// Read a quoted phrase; a missing closing quote runs to end of input
    fn read_quoted(&mut self) -> String {
        self.position += 1; // opening quote
        let start = self.position;
        while self.position < self.input.len() && self.input[self.position] != '"' {
            self.position += 1;
        }
        let text: String = self.input[start..self.position].iter().collect();
        if self.position < self.input.len() {
            self.position += 1; // closing quote
        }
        text
    }

    /// Read a word-ish chunk up to whitespace, parenthesis, or quote
    fn read_chunk(&mut self) -> String {
        let start = self.position;
        while self.position < self.input.len() {
            let ch = self.input[self.position];
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            self.position += 1;
        }
        self.input[start..self.position].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<QueryToken> {
        let tokenizer = Tokenizer::default();
        Lexer::new(input, &tokenizer).lex()
    }

    #[test]
    fn test_terms_and_operators() {
        let tokens = lex("data AND retrieval OR system NOT index");
        assert_eq!(
            tokens,
            vec![
                QueryToken::Term("data".to_string()),
                QueryToken::And,
                QueryToken::Term("retrieval".to_string()),
                QueryToken::Or,
                QueryToken::Term("system".to_string()),
                QueryToken::Not,
                QueryToken::Term("index".to_string()),
            ]
        );
    }

    #[test]
    fn test_case_insensitive_operators() {
        let tokens = lex("a and b or c not d");
        assert_eq!(tokens[1], QueryToken::And);
        assert_eq!(tokens[3], QueryToken::Or);
        assert_eq!(tokens[5], QueryToken::Not);
    }

    #[test]
    fn test_phrase() {
        let tokens = lex("\"information retrieval\" survey");
        assert_eq!(
            tokens,
            vec![
                QueryToken::Phrase(vec![
                    "information".to_string(),
                    "retrieval".to_string()
                ]),
                QueryToken::Term("survey".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_phrase_runs_to_end() {
        let tokens = lex("\"deep learning");
        assert_eq!(
            tokens,
            vec![QueryToken::Phrase(vec![
                "deep".to_string(),
                "learning".to_string()
            ])]
        );
    }

    #[test]
    fn test_empty_phrase_emits_nothing() {
        assert!(lex("\"\"").is_empty());
    }

    #[test]
    fn test_parentheses() {
        let tokens = lex("(a OR b)");
        assert_eq!(tokens[0], QueryToken::LeftParen);
        assert_eq!(tokens[4], QueryToken::RightParen);
    }

    #[test]
    fn test_parens_adjacent_to_words() {
        let tokens = lex("(neural)AND(survey)");
        assert_eq!(
            tokens,
            vec![
                QueryToken::LeftParen,
                QueryToken::Term("neural".to_string()),
                QueryToken::RightParen,
                QueryToken::And,
                QueryToken::LeftParen,
                QueryToken::Term("survey".to_string()),
                QueryToken::RightParen,
            ]
        );
    }
}
