//! Math functions

use super::{
    collect_values, literal_string_number, numeric_arg, ExcelFunction, FunctionArgument,
    ValueOrigin,
};
use crate::compiler::{CompileResult, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;
use gridcalc_core::ExcelError;
use rand::Rng;

pub struct Sum;

impl ExcelFunction for Sum {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let mut total = 0.0;
        for (value, origin) in collect_values(args) {
            match value {
                Value::Error(e) => return Ok(CompileResult::from_error(e)),
                Value::Number(n) => total += n,
                Value::DateTime(dt) => {
                    total += CompileResult::from_cell_value(gridcalc_core::CellValue::DateTime(dt))
                        .result_numeric();
                }
                Value::Boolean(b) if origin == ValueOrigin::Literal => {
                    total += if b { 1.0 } else { 0.0 };
                }
                Value::String(s) if origin == ValueOrigin::Literal => {
                    match literal_string_number(&s) {
                        Some(n) => total += n,
                        None => return Ok(CompileResult::from_error(ExcelError::Value)),
                    }
                }
                // booleans and text inside ranges and arrays are ignored
                _ => {}
            }
        }
        Ok(CompileResult::from_number(total))
    }

    fn min_args(&self) -> usize {
        1
    }
}

pub struct Abs;

impl ExcelFunction for Abs {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        match numeric_arg(&args[0]) {
            Ok(n) => Ok(CompileResult::from_number(n.abs())),
            Err(e) => Ok(CompileResult::from_error(e)),
        }
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

pub struct Round;

impl Round {
    /// Round half away from zero, the spreadsheet convention. `digits`
    /// may be negative to round left of the decimal point.
    fn round(number: f64, digits: i32) -> f64 {
        let multiplier = 10f64.powi(digits);
        let scaled = number * multiplier;
        if scaled >= 0.0 {
            (scaled + 0.5).floor() / multiplier
        } else {
            (scaled - 0.5).ceil() / multiplier
        }
    }
}

impl ExcelFunction for Round {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let number = match numeric_arg(&args[0]) {
            Ok(n) => n,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        let digits = match numeric_arg(&args[1]) {
            Ok(n) => n.trunc() as i32,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        Ok(CompileResult::from_number(Self::round(number, digits)))
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

pub struct Power;

impl ExcelFunction for Power {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let base = match numeric_arg(&args[0]) {
            Ok(n) => n,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        let exponent = match numeric_arg(&args[1]) {
            Ok(n) => n,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        if base == 0.0 && exponent < 0.0 {
            return Ok(CompileResult::from_error(ExcelError::Div0));
        }
        let value = base.powf(exponent);
        if !value.is_finite() {
            return Ok(CompileResult::from_error(ExcelError::Num));
        }
        Ok(CompileResult::from_number(value))
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

pub struct Rand;

impl ExcelFunction for Rand {
    fn execute(
        &self,
        _args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        Ok(CompileResult::from_number(rand::thread_rng().gen::<f64>()))
    }

    fn is_volatile(&self) -> bool {
        true
    }

    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
}

pub struct RandBetween;

impl ExcelFunction for RandBetween {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let bottom = match numeric_arg(&args[0]) {
            Ok(n) => n.ceil() as i64,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        let top = match numeric_arg(&args[1]) {
            Ok(n) => n.floor() as i64,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        if bottom > top {
            return Ok(CompileResult::from_error(ExcelError::Num));
        }
        let value = rand::thread_rng().gen_range(bottom..=top);
        Ok(CompileResult::from_number(value as f64))
    }

    fn is_volatile(&self) -> bool {
        true
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}
