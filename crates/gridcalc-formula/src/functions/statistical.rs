//! Statistical functions

use super::{
    collect_values, literal_string_number, ExcelFunction, FunctionArgument, ValueOrigin,
};
use crate::compiler::{CompileResult, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;
use gridcalc_core::ExcelError;

fn datetime_serial(value: Value) -> f64 {
    match value {
        Value::DateTime(dt) => {
            CompileResult::from_cell_value(gridcalc_core::CellValue::DateTime(dt)).result_numeric()
        }
        _ => 0.0,
    }
}

pub struct Average;

impl ExcelFunction for Average {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let mut total = 0.0;
        let mut count = 0usize;
        for (value, origin) in collect_values(args) {
            match value {
                Value::Error(e) => return Ok(CompileResult::from_error(e)),
                Value::Number(n) => {
                    total += n;
                    count += 1;
                }
                Value::DateTime(_) => {
                    total += datetime_serial(value);
                    count += 1;
                }
                Value::Boolean(b) if origin == ValueOrigin::Literal => {
                    total += if b { 1.0 } else { 0.0 };
                    count += 1;
                }
                Value::String(s) if origin == ValueOrigin::Literal => {
                    match literal_string_number(&s) {
                        Some(n) => {
                            total += n;
                            count += 1;
                        }
                        None => return Ok(CompileResult::from_error(ExcelError::Value)),
                    }
                }
                _ => {}
            }
        }
        if count == 0 {
            return Ok(CompileResult::from_error(ExcelError::Div0));
        }
        Ok(CompileResult::from_number(total / count as f64))
    }

    fn min_args(&self) -> usize {
        1
    }
}

/// AVERAGEA counts more than AVERAGE does, and how a value counts depends
/// on where it came from:
/// - literal arguments: numbers, booleans and parsable strings all
///   contribute their value; an unparsable literal string is `#VALUE!`
/// - cells: numbers, dates and booleans contribute their value; text
///   contributes 0 but still counts; empty cells are skipped
/// - array members: numbers contribute; text counts as 0; booleans are
///   not counted at all
pub struct AverageA;

impl ExcelFunction for AverageA {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let mut total = 0.0;
        let mut count = 0usize;
        for (value, origin) in collect_values(args) {
            match (value, origin) {
                (Value::Error(e), _) => return Ok(CompileResult::from_error(e)),
                (Value::Number(n), _) => {
                    total += n;
                    count += 1;
                }
                (value @ Value::DateTime(_), _) => {
                    total += datetime_serial(value);
                    count += 1;
                }
                (Value::Boolean(b), ValueOrigin::Literal | ValueOrigin::Cell) => {
                    total += if b { 1.0 } else { 0.0 };
                    count += 1;
                }
                (Value::Boolean(_), ValueOrigin::Array) => {}
                (Value::String(s), ValueOrigin::Literal) => match literal_string_number(&s) {
                    Some(n) => {
                        total += n;
                        count += 1;
                    }
                    None => return Ok(CompileResult::from_error(ExcelError::Value)),
                },
                (Value::String(_), _) => {
                    count += 1;
                }
                (Value::Empty, _) => {}
                _ => {}
            }
        }
        if count == 0 {
            return Ok(CompileResult::from_error(ExcelError::Div0));
        }
        Ok(CompileResult::from_number(total / count as f64))
    }

    fn min_args(&self) -> usize {
        1
    }
}

pub struct Count;

impl ExcelFunction for Count {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let mut count = 0usize;
        for (value, origin) in collect_values(args) {
            match value {
                Value::Number(_) | Value::DateTime(_) => count += 1,
                Value::Boolean(_) if origin == ValueOrigin::Literal => count += 1,
                Value::String(s) if origin == ValueOrigin::Literal => {
                    if literal_string_number(&s).is_some() {
                        count += 1;
                    }
                }
                // errors and non-numeric cell content are simply not counted
                _ => {}
            }
        }
        Ok(CompileResult::from_number(count as f64))
    }

    fn min_args(&self) -> usize {
        1
    }
}

pub struct Min;

impl ExcelFunction for Min {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        fold_numbers(args, |best, n| n < best)
    }

    fn min_args(&self) -> usize {
        1
    }
}

pub struct Max;

impl ExcelFunction for Max {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        fold_numbers(args, |best, n| n > best)
    }

    fn min_args(&self) -> usize {
        1
    }
}

fn fold_numbers(
    args: &[FunctionArgument],
    replace: impl Fn(f64, f64) -> bool,
) -> FormulaResult<CompileResult> {
    let mut best: Option<f64> = None;
    for (value, _) in collect_values(args) {
        let n = match value {
            Value::Error(e) => return Ok(CompileResult::from_error(e)),
            Value::Number(n) => n,
            value @ Value::DateTime(_) => datetime_serial(value),
            _ => continue,
        };
        best = Some(match best {
            Some(current) if !replace(current, n) => current,
            _ => n,
        });
    }
    Ok(CompileResult::from_number(best.unwrap_or(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::DataType;
    use crate::functions::FunctionRepository;
    use crate::provider::{CellInfo, InMemoryProvider, RangeInfo};
    use gridcalc_core::{CellAddress, CellRange, CellValue};
    use pretty_assertions::assert_eq;

    fn arg(value: Value, data_type: DataType) -> FunctionArgument {
        FunctionArgument::new(value, data_type)
    }

    fn num(n: f64) -> FunctionArgument {
        arg(Value::Number(n), DataType::Decimal)
    }

    fn range_of(values: Vec<CellValue>) -> FunctionArgument {
        let cells = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| CellInfo {
                row: i as u32,
                col: 0,
                value,
            })
            .collect::<Vec<_>>();
        let end = (cells.len().max(1) - 1) as u32;
        let info = RangeInfo {
            sheet_id: 0,
            range: CellRange::new(CellAddress::new(0, 0), CellAddress::new(end, 0)),
            cells,
        };
        arg(Value::Range(info), DataType::Enumerable)
    }

    fn run(function: &dyn ExcelFunction, args: &[FunctionArgument]) -> CompileResult {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut ctx = ParsingContext::new(&provider, &repository);
        function.execute(args, &mut ctx).unwrap()
    }

    #[test]
    fn average_skips_range_text() {
        let result = run(
            &Average,
            &[range_of(vec![
                CellValue::Number(2.0),
                CellValue::String("x".to_string()),
                CellValue::Number(4.0),
            ])],
        );
        assert_eq!(result.result, Value::Number(3.0));
    }

    #[test]
    fn average_of_nothing_is_div0() {
        let result = run(&Average, &[range_of(vec![CellValue::Empty])]);
        assert_eq!(result.error(), Some(ExcelError::Div0));
    }

    #[test]
    fn averagea_counts_cell_text_as_zero() {
        let result = run(
            &AverageA,
            &[range_of(vec![
                CellValue::Number(3.0),
                CellValue::String("x".to_string()),
            ])],
        );
        // (3 + 0) / 2
        assert_eq!(result.result, Value::Number(1.5));
    }

    #[test]
    fn averagea_counts_cell_booleans() {
        let result = run(
            &AverageA,
            &[range_of(vec![
                CellValue::Boolean(true),
                CellValue::Number(3.0),
            ])],
        );
        assert_eq!(result.result, Value::Number(2.0));
    }

    #[test]
    fn averagea_parses_literal_strings() {
        let result = run(
            &AverageA,
            &[
                num(1.0),
                arg(Value::String("3".to_string()), DataType::String),
            ],
        );
        assert_eq!(result.result, Value::Number(2.0));
    }

    #[test]
    fn averagea_counts_literal_date_strings() {
        // 2013-01-05 is serial 41279; a literal date string contributes it
        let result = run(
            &AverageA,
            &[
                num(41279.0),
                arg(Value::String("2013-01-05".to_string()), DataType::String),
            ],
        );
        assert_eq!(result.result, Value::Number(41279.0));
    }

    #[test]
    fn averagea_rejects_unparsable_literal() {
        let result = run(
            &AverageA,
            &[num(1.0), arg(Value::String("abc".to_string()), DataType::String)],
        );
        assert_eq!(result.error(), Some(ExcelError::Value));
    }

    #[test]
    fn averagea_array_semantics() {
        // strings count as zero, booleans are excluded entirely
        let result = run(
            &AverageA,
            &[arg(
                Value::Array(vec![
                    Value::Number(4.0),
                    Value::String("x".to_string()),
                    Value::Boolean(true),
                ]),
                DataType::Enumerable,
            )],
        );
        // (4 + 0) / 2
        assert_eq!(result.result, Value::Number(2.0));
    }

    #[test]
    fn count_ignores_errors_and_text() {
        let result = run(
            &Count,
            &[range_of(vec![
                CellValue::Number(1.0),
                CellValue::Error(ExcelError::NA),
                CellValue::String("x".to_string()),
                CellValue::Number(2.0),
            ])],
        );
        assert_eq!(result.result, Value::Number(2.0));
    }

    #[test]
    fn count_includes_literal_numeric_strings() {
        let result = run(
            &Count,
            &[
                num(1.0),
                arg(Value::String("2".to_string()), DataType::String),
                arg(Value::String("x".to_string()), DataType::String),
            ],
        );
        assert_eq!(result.result, Value::Number(2.0));
    }

    #[test]
    fn min_and_max_over_ranges() {
        let cells = vec![
            CellValue::Number(5.0),
            CellValue::Number(-2.0),
            CellValue::String("ignored".to_string()),
            CellValue::Number(9.0),
        ];
        assert_eq!(
            run(&Min, &[range_of(cells.clone())]).result,
            Value::Number(-2.0)
        );
        assert_eq!(run(&Max, &[range_of(cells)]).result, Value::Number(9.0));
    }

    #[test]
    fn min_of_no_numbers_is_zero() {
        let result = run(&Min, &[range_of(vec![CellValue::Empty])]);
        assert_eq!(result.result, Value::Number(0.0));
    }
}
