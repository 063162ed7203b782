//! Token stream validation
//!
//! Runs after tokenization and before graph building. Checks structural
//! well-formedness only; semantic problems (unknown functions, bad
//! references) surface later as spreadsheet error values.

use super::token::{Token, TokenType};
use crate::error::{FormulaError, FormulaResult};

/// Validates a token stream before it reaches the graph builder
pub struct SyntacticAnalyzer;

impl SyntacticAnalyzer {
    /// Check delimiter balance and reject unrecognized tokens.
    pub fn analyze(tokens: &[Token]) -> FormulaResult<()> {
        let mut parens: i32 = 0;
        let mut enumerables: i32 = 0;
        let mut brackets: i32 = 0;
        let mut in_string = false;

        for token in tokens {
            if token.is(TokenType::String) {
                in_string = !in_string;
                continue;
            }
            if in_string {
                continue;
            }
            match token.token_type() {
                TokenType::Unrecognized => {
                    return Err(FormulaError::UnrecognizedToken(token.value().to_string()));
                }
                TokenType::OpeningParenthesis => parens += 1,
                TokenType::ClosingParenthesis => parens -= 1,
                TokenType::OpeningEnumerable => enumerables += 1,
                TokenType::ClosingEnumerable => enumerables -= 1,
                TokenType::OpeningBracket => brackets += 1,
                TokenType::ClosingBracket => brackets -= 1,
                _ => {}
            }
            if parens < 0 || enumerables < 0 || brackets < 0 {
                return Err(FormulaError::Format(
                    "closing delimiter without matching opening delimiter".to_string(),
                ));
            }
        }

        if in_string {
            return Err(FormulaError::Format("unclosed string literal".to_string()));
        }
        if parens != 0 {
            return Err(FormulaError::Format("unbalanced parentheses".to_string()));
        }
        if enumerables != 0 {
            return Err(FormulaError::Format("unbalanced array braces".to_string()));
        }
        if brackets != 0 {
            return Err(FormulaError::Format("unbalanced brackets".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;

    fn analyze(formula: &str) -> FormulaResult<()> {
        SyntacticAnalyzer::analyze(&Tokenizer::tokenize(formula))
    }

    #[test]
    fn accepts_well_formed_formula() {
        assert!(analyze("SUM(A1:A3,IF(B1>0,1,2))").is_ok());
        assert!(analyze("{1,2;3,4}").is_ok());
    }

    #[test]
    fn rejects_unbalanced_parentheses() {
        assert!(matches!(analyze("(1+2"), Err(FormulaError::Format(_))));
        assert!(matches!(analyze("1+2)"), Err(FormulaError::Format(_))));
    }

    #[test]
    fn rejects_closing_before_opening() {
        assert!(matches!(analyze(")1+2("), Err(FormulaError::Format(_))));
    }

    #[test]
    fn rejects_unbalanced_enumerable() {
        assert!(matches!(analyze("{1,2"), Err(FormulaError::Format(_))));
    }

    #[test]
    fn rejects_unclosed_string() {
        let tokens = vec![
            Token::new("\"", TokenType::String),
            Token::new("abc", TokenType::StringContent),
        ];
        assert!(matches!(
            SyntacticAnalyzer::analyze(&tokens),
            Err(FormulaError::Format(_))
        ));
    }

    #[test]
    fn rejects_unrecognized_token() {
        match analyze("1+@x") {
            Err(FormulaError::UnrecognizedToken(value)) => assert_eq!(value, "@x"),
            other => panic!("expected UnrecognizedToken, got {other:?}"),
        }
    }

    #[test]
    fn operators_inside_strings_are_ignored() {
        assert!(analyze("\"(((\"").is_ok());
    }
}
