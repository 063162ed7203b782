//! Information functions
//!
//! These run under the error-handling compiler, so error values reach them
//! as arguments instead of short-circuiting the call.

use super::{ExcelFunction, FunctionArgument};
use crate::compiler::{CompileResult, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;
use gridcalc_core::ExcelError;

pub struct IsError;

impl ExcelFunction for IsError {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let is_error = matches!(args[0].value_first(), Value::Error(_));
        Ok(CompileResult::from_boolean(is_error))
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// Like ISERROR, except `#N/A` does not count
pub struct IsErr;

impl ExcelFunction for IsErr {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let is_err = matches!(args[0].value_first(), Value::Error(e) if e != ExcelError::NA);
        Ok(CompileResult::from_boolean(is_err))
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

pub struct IsNa;

impl ExcelFunction for IsNa {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let is_na = args[0].value_first() == Value::Error(ExcelError::NA);
        Ok(CompileResult::from_boolean(is_na))
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

/// Maps an error value to its numeric classification; a non-error argument
/// is itself an `#N/A`.
pub struct ErrorType;

impl ExcelFunction for ErrorType {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        match args[0].value_first() {
            Value::Error(e) => Ok(CompileResult::from_number(e.error_type() as f64)),
            _ => Ok(CompileResult::from_error(ExcelError::NA)),
        }
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}

pub struct Na;

impl ExcelFunction for Na {
    fn execute(
        &self,
        _args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        Ok(CompileResult::from_error(ExcelError::NA))
    }

    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
}
