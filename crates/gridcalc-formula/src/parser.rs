//! Formula parsing facade
//!
//! Runs the whole pipeline for one formula: tokenize, validate, build the
//! expression graph, compile. [`FormulaParser::parse_at`] additionally maps
//! structural failures onto spreadsheet error values, which is what a cell
//! ultimately displays.

use crate::compiler::{result_to_cell_value, CompileResult, ExpressionCompiler};
use crate::context::ParsingContext;
use crate::dependency::CellKey;
use crate::error::{FormulaError, FormulaResult};
use crate::graph::ExpressionGraphBuilder;
use crate::lexer::{SyntacticAnalyzer, Tokenizer};
use gridcalc_core::{CellValue, ExcelError};

pub struct FormulaParser;

impl FormulaParser {
    /// Parse and compile a formula in the given context.
    pub fn parse(formula: &str, ctx: &mut ParsingContext) -> FormulaResult<CompileResult> {
        let tokens = Tokenizer::tokenize(formula);
        SyntacticAnalyzer::analyze(&tokens)?;
        let graph = ExpressionGraphBuilder::build(&tokens)?;
        ExpressionCompiler::compile(&graph.expressions, ctx)
    }

    /// Evaluate a formula as the given cell, yielding the value the cell
    /// would hold. An unrecognized token surfaces as `#NAME?`; any other
    /// structural failure as `#VALUE!`.
    pub fn parse_at(ctx: &mut ParsingContext, key: CellKey, formula: &str) -> CellValue {
        ctx.push_scope(key);
        let result = Self::parse(formula, ctx);
        ctx.pop_scope();
        match result {
            Ok(compiled) => result_to_cell_value(&compiled),
            Err(FormulaError::UnrecognizedToken(_)) => CellValue::Error(ExcelError::Name),
            Err(_) => CellValue::Error(ExcelError::Value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Value;
    use crate::functions::FunctionRepository;
    use crate::provider::InMemoryProvider;
    use pretty_assertions::assert_eq;

    fn eval_at(provider: &InMemoryProvider, key: CellKey, formula: &str) -> CellValue {
        let repository = FunctionRepository::with_builtins();
        let mut ctx = ParsingContext::new(provider, &repository);
        FormulaParser::parse_at(&mut ctx, key, formula)
    }

    #[test]
    fn full_pipeline_with_references() {
        let mut provider = InMemoryProvider::new();
        provider.set_cell_value(0, 0, 1, 3.0);
        let value = eval_at(&provider, CellKey::new(0, 0, 0), "=B1*2+4");
        assert_eq!(value, CellValue::Number(10.0));
    }

    #[test]
    fn scope_is_visible_to_positional_functions() {
        let provider = InMemoryProvider::new();
        let value = eval_at(&provider, CellKey::new(0, 9, 3), "=ROW()&\":\"&COLUMN()");
        assert_eq!(value, CellValue::String("10:4".to_string()));
    }

    #[test]
    fn malformed_formula_is_value_error() {
        let provider = InMemoryProvider::new();
        assert_eq!(
            eval_at(&provider, CellKey::new(0, 0, 0), "=(1+2"),
            CellValue::Error(ExcelError::Value)
        );
    }

    #[test]
    fn unrecognized_token_is_name_error() {
        let provider = InMemoryProvider::new();
        assert_eq!(
            eval_at(&provider, CellKey::new(0, 0, 0), "=1+@x"),
            CellValue::Error(ExcelError::Name)
        );
    }

    #[test]
    fn parse_returns_typed_results() {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut ctx = ParsingContext::new(&provider, &repository);
        let result = FormulaParser::parse("=1=1", &mut ctx).unwrap();
        assert_eq!(result.result, Value::Boolean(true));
    }
}
