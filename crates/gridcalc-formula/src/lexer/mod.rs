//! Lexical analysis: formula text to a validated token stream

mod analyzer;
mod token;
mod tokenizer;

pub use analyzer::SyntacticAnalyzer;
pub use token::{Token, TokenType};
pub use tokenizer::Tokenizer;
