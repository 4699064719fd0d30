//! Infix-to-postfix query parsing
//!
//! Two passes over the lexed stream: first implicit `AND` insertion
//! (juxtaposed atoms, an atom before `(` or `NOT`, `)` before an atom),
//! then shunting-yard with `NOT` binding tightest and right-associative,
//! `AND` above `OR`. Mismatched parentheses are the only parse failure.

use crate::error::{RemoraError, Result};
use crate::tokenizer::Tokenizer;

use super::lexer::{Lexer, QueryToken};

fn precedence(token: &QueryToken) -> u8 {
    match token {
        QueryToken::Not => 3,
        QueryToken::And => 2,
        QueryToken::Or => 1,
        _ => 0,
    }
}

fn is_right_associative(token: &QueryToken) -> bool {
    matches!(token, QueryToken::Not)
}

/// Insert the `AND` operators the original query left implicit
pub fn insert_implicit_and(tokens: Vec<QueryToken>) -> Vec<QueryToken> {
    let mut out: Vec<QueryToken> = Vec::with_capacity(tokens.len());

    for token in tokens {
        if let Some(prev) = out.last() {
            let prev_ends_operand = prev.is_atom() || *prev == QueryToken::RightParen;
            let starts_operand = token.is_atom()
                || token == QueryToken::LeftParen
                || token == QueryToken::Not;
            if prev_ends_operand && starts_operand {
                out.push(QueryToken::And);
            }
        }
        out.push(token);
    }

    out
}

/// Shunting-yard conversion to postfix order
pub fn to_postfix(tokens: Vec<QueryToken>) -> Result<Vec<QueryToken>> {
    let mut output: Vec<QueryToken> = Vec::with_capacity(tokens.len());
    let mut operators: Vec<QueryToken> = Vec::new();

    for token in tokens {
        match token {
            QueryToken::Term(_) | QueryToken::Phrase(_) => output.push(token),
            QueryToken::And | QueryToken::Or | QueryToken::Not => {
                while let Some(top) = operators.last() {
                    if *top == QueryToken::LeftParen {
                        break;
                    }
                    let keep_popping = if is_right_associative(&token) {
                        precedence(&token) < precedence(top)
                    } else {
                        precedence(&token) <= precedence(top)
                    };
                    if !keep_popping {
                        break;
                    }
                    output.push(operators.pop().ok_or_else(|| {
                        RemoraError::QueryParse("operator stack underflow".to_string())
                    })?);
                }
                operators.push(token);
            }
            QueryToken::LeftParen => operators.push(token),
            QueryToken::RightParen => loop {
                match operators.pop() {
                    Some(QueryToken::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => {
                        return Err(RemoraError::QueryParse(
                            "mismatched closing parenthesis".to_string(),
                        ))
                    }
                }
            },
        }
    }

    while let Some(op) = operators.pop() {
        if op == QueryToken::LeftParen {
            return Err(RemoraError::QueryParse(
                "mismatched opening parenthesis".to_string(),
            ));
        }
        output.push(op);
    }

    Ok(output)
}

/// Full pipeline from raw query text to a postfix token stream
pub fn parse(raw: &str, tokenizer: &Tokenizer) -> Result<Vec<QueryToken>> {
    let tokens = Lexer::new(raw, tokenizer).lex();
    to_postfix(insert_implicit_and(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(t: &str) -> QueryToken {
        QueryToken::Term(t.to_string())
    }

    fn parsed(input: &str) -> Result<Vec<QueryToken>> {
        let tokenizer = Tokenizer::default();
        parse(input, &tokenizer)
    }

    #[test]
    fn test_implicit_and_between_atoms() {
        let tokens = vec![term("a"), term("b")];
        assert_eq!(
            insert_implicit_and(tokens),
            vec![term("a"), QueryToken::And, term("b")]
        );
    }

    #[test]
    fn test_implicit_and_around_parens_and_not() {
        // a (b) NOT c  ->  a AND ( b ) AND NOT c
        let tokens = vec![
            term("a"),
            QueryToken::LeftParen,
            term("b"),
            QueryToken::RightParen,
            QueryToken::Not,
            term("c"),
        ];
        assert_eq!(
            insert_implicit_and(tokens),
            vec![
                term("a"),
                QueryToken::And,
                QueryToken::LeftParen,
                term("b"),
                QueryToken::RightParen,
                QueryToken::And,
                QueryToken::Not,
                term("c"),
            ]
        );
    }

    #[test]
    fn test_no_implicit_and_after_operator() {
        let tokens = vec![term("a"), QueryToken::Or, term("b")];
        assert_eq!(
            insert_implicit_and(tokens),
            vec![term("a"), QueryToken::Or, term("b")]
        );
    }

    #[test]
    fn test_postfix_precedence() {
        // a OR b AND c  ->  a b c AND OR
        let out = parsed("a OR b AND c").unwrap();
        assert_eq!(
            out,
            vec![
                term("a"),
                term("b"),
                term("c"),
                QueryToken::And,
                QueryToken::Or
            ]
        );
    }

    #[test]
    fn test_postfix_not_binds_tightest() {
        // NOT a AND b  ->  a NOT b AND
        let out = parsed("NOT a AND b").unwrap();
        assert_eq!(
            out,
            vec![term("a"), QueryToken::Not, term("b"), QueryToken::And]
        );
    }

    #[test]
    fn test_postfix_double_not_right_associative() {
        // NOT NOT a  ->  a NOT NOT
        let out = parsed("NOT NOT a").unwrap();
        assert_eq!(
            out,
            vec![term("a"), QueryToken::Not, QueryToken::Not]
        );
    }

    #[test]
    fn test_parens_override_precedence() {
        // (a OR b) AND c  ->  a b OR c AND
        let out = parsed("(a OR b) AND c").unwrap();
        assert_eq!(
            out,
            vec![
                term("a"),
                term("b"),
                QueryToken::Or,
                term("c"),
                QueryToken::And
            ]
        );
    }

    #[test]
    fn test_mismatched_parens_rejected() {
        assert!(parsed("(a OR b").is_err());
        assert!(parsed("a OR b)").is_err());
    }

    #[test]
    fn test_phrase_is_one_operand() {
        let out = parsed("\"information retrieval\" AND survey").unwrap();
        assert_eq!(
            out,
            vec![
                QueryToken::Phrase(vec![
                    "information".to_string(),
                    "retrieval".to_string()
                ]),
                term("survey"),
                QueryToken::And,
            ]
        );
    }
}
