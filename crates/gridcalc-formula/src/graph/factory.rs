//! Leaf expression construction
//!
//! Maps a single value-bearing token onto an [`Expression`] leaf. Structural
//! tokens (operators, delimiters, separators) never reach the factory; if
//! one does, that is a builder bug and surfaces as `UnsupportedToken`.

use super::{Expression, ExpressionKind};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{Token, TokenType};
use gridcalc_core::ExcelError;

pub struct ExpressionFactory;

impl ExpressionFactory {
    pub fn create(token: &Token) -> FormulaResult<Expression> {
        let kind = match token.token_type() {
            TokenType::Integer => {
                let n: f64 = token
                    .value()
                    .parse()
                    .map_err(|_| FormulaError::Format(format!("bad integer: {}", token.value())))?;
                ExpressionKind::Integer(n)
            }
            TokenType::Decimal => {
                let n: f64 = token
                    .value()
                    .parse()
                    .map_err(|_| FormulaError::Format(format!("bad decimal: {}", token.value())))?;
                ExpressionKind::Decimal(n)
            }
            TokenType::Boolean => ExpressionKind::Boolean(token.value().eq_ignore_ascii_case("true")),
            TokenType::StringContent => ExpressionKind::String(token.value().to_string()),
            TokenType::ExcelAddress => ExpressionKind::CellAddress(token.value().to_string()),
            TokenType::NameValue => match ExcelError::parse(token.value()) {
                Ok(error) => ExpressionKind::Error(error),
                Err(_) => ExpressionKind::NamedValue(token.value().to_string()),
            },
            _ => {
                return Err(FormulaError::UnsupportedToken(token.value().to_string()));
            }
        };
        Ok(Expression::new(kind))
    }
}
