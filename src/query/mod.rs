//! Boolean and phrase query pipeline: lex, parse to postfix, evaluate.

pub mod eval;
pub mod lexer;
pub mod parser;

pub use eval::EvalContext;
pub use lexer::{Lexer, QueryToken};
pub use parser::{insert_implicit_and, parse, to_postfix};
