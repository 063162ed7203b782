//! Expression compilation
//!
//! Walks a built expression tree and produces a single [`CompileResult`].
//! Sibling chains reduce by operator precedence: exponentiation first and
//! right-to-left, then each remaining tier left-to-right.

mod operators;
mod result;

pub use operators::Operator;
pub use result::{parse_date_string, parse_numeric_string, value_to_string};
pub use result::{CompileResult, DataType, Value};

use crate::context::ParsingContext;
use crate::error::{FormulaError, FormulaResult};
use crate::functions::compilers::FunctionCompilerFactory;
use crate::graph::{Expression, ExpressionKind};
use gridcalc_core::{CellRange, CellValue, ExcelError};

pub struct ExpressionCompiler;

impl ExpressionCompiler {
    /// Compile a sibling chain down to one result.
    pub fn compile(
        expressions: &[Expression],
        ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        if expressions.is_empty() {
            return Ok(CompileResult::empty());
        }
        let mut units: Vec<(CompileResult, Option<Operator>)> = Vec::with_capacity(expressions.len());
        for expression in expressions {
            units.push((expression.compile(ctx)?, expression.operator));
        }
        // adjacency without an operator multiplies, as in 2(3+4)
        for i in 0..units.len() - 1 {
            if units[i].1.is_none() {
                units[i].1 = Some(Operator::Multiply);
            }
        }

        // exponentiation binds tightest and associates right
        while let Some(i) = units
            .iter()
            .rposition(|(_, op)| *op == Some(Operator::Power))
        {
            combine(&mut units, i);
        }
        for tier in [
            operators::PRECEDENCE_MULTIPLICATIVE,
            operators::PRECEDENCE_ADDITIVE,
            operators::PRECEDENCE_CONCAT,
            operators::PRECEDENCE_COMPARISON,
        ] {
            let mut i = 0;
            while i + 1 < units.len() {
                match units[i].1 {
                    Some(op) if op.precedence() == tier => combine(&mut units, i),
                    _ => i += 1,
                }
            }
        }

        let (result, trailing) = units.pop().expect("at least one unit");
        if trailing.is_some() || !units.is_empty() {
            return Err(FormulaError::Format(
                "operator without right operand".to_string(),
            ));
        }
        Ok(result)
    }
}

fn combine(units: &mut Vec<(CompileResult, Option<Operator>)>, i: usize) {
    let op = units[i].1.expect("combine at operator position");
    let (right, next_op) = units.remove(i + 1);
    let merged = op.apply(&units[i].0, &right);
    units[i] = (merged, next_op);
}

impl Expression {
    /// Compile one node, then apply its negation and percent decorations.
    pub fn compile(&self, ctx: &mut ParsingContext) -> FormulaResult<CompileResult> {
        let mut result = match &self.kind {
            ExpressionKind::Integer(n) => CompileResult::new(Value::Number(*n), DataType::Integer),
            ExpressionKind::Decimal(n) => CompileResult::from_number(*n),
            ExpressionKind::Boolean(b) => CompileResult::from_boolean(*b),
            ExpressionKind::String(s) => CompileResult::from_string(s.clone()),
            ExpressionKind::Error(e) => CompileResult::from_error(*e),
            ExpressionKind::Empty => CompileResult::empty(),
            ExpressionKind::Group(children) | ExpressionKind::FunctionArgument(children) => {
                ExpressionCompiler::compile(children, ctx)?
            }
            ExpressionKind::Enumerable(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(item.compile(ctx)?.result_value());
                }
                CompileResult::new(Value::Array(values), DataType::Enumerable)
            }
            ExpressionKind::CellAddress(text) => resolve_address(text, ctx)?,
            ExpressionKind::NamedValue(name) => resolve_name(name, ctx),
            ExpressionKind::Function { name, args } => {
                FunctionCompilerFactory::compile_function(name, args, ctx)?
            }
        };
        if self.negated {
            result = negate_result(&result);
        }
        for _ in 0..self.percent {
            result = percent_result(&result);
        }
        Ok(result)
    }
}

/// Resolve reference text against the provider. A single cell dereferences
/// to its value; a multi-cell range stays a [`Value::Range`].
pub(crate) fn resolve_address(
    text: &str,
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    let (worksheet, range_text) = split_worksheet(text);
    if ctx.provider.sheet_id(worksheet).is_none() {
        return Ok(CompileResult::from_error(ExcelError::Ref));
    }
    let range = match CellRange::parse(range_text) {
        Ok(range) => range,
        Err(_) => return Err(FormulaError::InvalidReference(text.to_string())),
    };
    let ref_id = ctx.next_address_ref_id();
    let mut result = if range.is_single_cell() {
        let value = ctx
            .provider
            .get_cell_value(worksheet, range.start.row, range.start.col);
        CompileResult::from_cell_value(value)
    } else {
        let info = ctx.provider.get_range(worksheet, &range);
        CompileResult::new(Value::Range(info), DataType::Enumerable)
    };
    result.address_ref_id = ref_id;
    Ok(result)
}

/// Resolve a whole reference to a [`Value::Range`], even for a single cell.
/// Range-aware functions need the coordinates, not just the value.
pub(crate) fn resolve_address_as_range(
    text: &str,
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    let (worksheet, range_text) = split_worksheet(text);
    if ctx.provider.sheet_id(worksheet).is_none() {
        return Ok(CompileResult::from_error(ExcelError::Ref));
    }
    let range = match CellRange::parse(range_text) {
        Ok(range) => range,
        Err(_) => return Err(FormulaError::InvalidReference(text.to_string())),
    };
    let ref_id = ctx.next_address_ref_id();
    let info = ctx.provider.get_range(worksheet, &range);
    let mut result = CompileResult::new(Value::Range(info), DataType::Enumerable);
    result.address_ref_id = ref_id;
    Ok(result)
}

/// Split `[Book]Sheet!A1` into the worksheet qualifier and the range text.
/// The external book part, when present, is folded into the worksheet name
/// and will fail sheet resolution.
pub(crate) fn split_worksheet(text: &str) -> (Option<&str>, &str) {
    match text.rfind('!') {
        Some(i) => {
            let sheet = &text[..i];
            let sheet = sheet.strip_suffix('\'').unwrap_or(sheet);
            let sheet = sheet.strip_prefix('\'').unwrap_or(sheet);
            (Some(sheet), &text[i + 1..])
        }
        None => (None, text),
    }
}

fn resolve_name(name: &str, ctx: &mut ParsingContext) -> CompileResult {
    match ctx.provider.get_name(name) {
        Some(crate::provider::NameInfo::Value(value)) => CompileResult::from_cell_value(value),
        Some(crate::provider::NameInfo::Range(info)) => {
            if info.range.is_single_cell() {
                CompileResult::from_cell_value(info.first_value())
            } else {
                CompileResult::new(Value::Range(info), DataType::Enumerable)
            }
        }
        None => CompileResult::from_error(ExcelError::Name),
    }
}

fn negate_result(result: &CompileResult) -> CompileResult {
    if result.is_error() {
        return result.clone();
    }
    let coercible = result.is_numeric()
        || result.is_numeric_string()
        || result.is_date_string()
        || matches!(result.result, Value::Range(_));
    if !coercible {
        return CompileResult::from_error(ExcelError::Value);
    }
    let data_type = if result.data_type == DataType::Integer {
        DataType::Integer
    } else {
        DataType::Decimal
    };
    CompileResult::new(Value::Number(-result.result_numeric()), data_type)
}

fn percent_result(result: &CompileResult) -> CompileResult {
    if result.is_error() {
        return result.clone();
    }
    if !result.is_numeric() && !result.is_numeric_string() {
        return CompileResult::from_error(ExcelError::Value);
    }
    CompileResult::from_number(result.result_numeric() / 100.0)
}

// keeps the provider-facing From available where compile results cross back
// into grid values
pub fn result_to_cell_value(result: &CompileResult) -> CellValue {
    match result.result_value() {
        Value::Empty => CellValue::Number(0.0),
        Value::Number(n) => CellValue::Number(n),
        Value::String(s) => CellValue::String(s),
        Value::Boolean(b) => CellValue::Boolean(b),
        Value::Error(e) => CellValue::Error(e),
        Value::DateTime(dt) => CellValue::DateTime(dt),
        Value::Array(values) => match values.into_iter().next() {
            Some(v) => result_to_cell_value(&CompileResult::new(v, DataType::Unknown)),
            None => CellValue::Empty,
        },
        Value::Range(_) => unreachable!("result_value dereferences ranges"),
    }
}
