//! Text functions

use super::{ExcelFunction, FunctionArgument};
use crate::compiler::{value_to_string, CompileResult, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;

pub struct Concatenate;

impl ExcelFunction for Concatenate {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let mut out = String::new();
        for arg in args {
            let value = arg.value_first();
            if let Value::Error(e) = value {
                return Ok(CompileResult::from_error(e));
            }
            out.push_str(&value_to_string(&value));
        }
        Ok(CompileResult::from_string(out))
    }

    fn min_args(&self) -> usize {
        1
    }
}

pub struct Len;

impl ExcelFunction for Len {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let value = args[0].value_first();
        if let Value::Error(e) = value {
            return Ok(CompileResult::from_error(e));
        }
        let length = value_to_string(&value).chars().count();
        Ok(CompileResult::from_number(length as f64))
    }

    fn min_args(&self) -> usize {
        1
    }

    fn max_args(&self) -> Option<usize> {
        Some(1)
    }
}
