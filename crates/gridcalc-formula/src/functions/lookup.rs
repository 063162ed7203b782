//! Lookup and reference functions
//!
//! These run under the lookup compiler, which hands references over as
//! ranges so that coordinates stay visible.

use super::{numeric_arg, ExcelFunction, FunctionArgument};
use crate::compiler::{CompileResult, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;
use gridcalc_core::ExcelError;

/// ROW() is the calculating cell's 1-based row; ROW(ref) is the reference's
/// first row.
pub struct Row;

impl ExcelFunction for Row {
    fn execute(
        &self,
        args: &[FunctionArgument],
        ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        match args.first() {
            None => match ctx.scope() {
                Some(key) => Ok(CompileResult::from_number((key.row + 1) as f64)),
                None => Ok(CompileResult::from_error(ExcelError::Value)),
            },
            Some(arg) => match &arg.value {
                Value::Range(info) => {
                    Ok(CompileResult::from_number((info.range.start.row + 1) as f64))
                }
                _ => Ok(CompileResult::from_error(ExcelError::Value)),
            },
        }
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

pub struct Column;

impl ExcelFunction for Column {
    fn execute(
        &self,
        args: &[FunctionArgument],
        ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        match args.first() {
            None => match ctx.scope() {
                Some(key) => Ok(CompileResult::from_number((key.col + 1) as f64)),
                None => Ok(CompileResult::from_error(ExcelError::Value)),
            },
            Some(arg) => match &arg.value {
                Value::Range(info) => {
                    Ok(CompileResult::from_number((info.range.start.col + 1) as f64))
                }
                _ => Ok(CompileResult::from_error(ExcelError::Value)),
            },
        }
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

pub struct Choose;

impl ExcelFunction for Choose {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let index = match numeric_arg(&args[0]) {
            Ok(n) => n.trunc() as i64,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        if index < 1 || index as usize >= args.len() {
            return Ok(CompileResult::from_error(ExcelError::Value));
        }
        Ok(args[index as usize].to_compile_result())
    }

    fn min_args(&self) -> usize {
        2
    }
}

/// Exact-match vertical lookup. The first column of the table is searched
/// for the lookup value; a hit returns the cell `col_index` columns in.
pub struct VLookup;

impl ExcelFunction for VLookup {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let lookup = args[0].value_first();
        if let Value::Error(e) = lookup {
            return Ok(CompileResult::from_error(e));
        }
        let Value::Range(info) = &args[1].value else {
            return Ok(CompileResult::from_error(ExcelError::Value));
        };
        let col_index = match numeric_arg(&args[2]) {
            Ok(n) => n.trunc() as i64,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        if col_index < 1 {
            return Ok(CompileResult::from_error(ExcelError::Value));
        }
        let width = info.range.col_count() as usize;
        if col_index as usize > width {
            return Ok(CompileResult::from_error(ExcelError::Ref));
        }
        for row in info.cells.chunks(width) {
            let candidate = Value::from(row[0].value.clone());
            if values_match(&lookup, &candidate) {
                return Ok(CompileResult::from_cell_value(
                    row[col_index as usize - 1].value.clone(),
                ));
            }
        }
        Ok(CompileResult::from_error(ExcelError::NA))
    }

    fn min_args(&self) -> usize {
        3
    }

    fn max_args(&self) -> Option<usize> {
        Some(4)
    }
}

fn values_match(lookup: &Value, candidate: &Value) -> bool {
    match (lookup, candidate) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Empty, Value::Empty) => true,
        _ => false,
    }
}
