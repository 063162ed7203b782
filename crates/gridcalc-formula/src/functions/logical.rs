//! Logical functions
//!
//! IF, IFERROR and IFNA are normally short-circuited by their dedicated
//! compilers; the `execute` bodies here cover direct invocation with
//! already-compiled arguments and agree with the short-circuit semantics.

use super::{boolean_arg, collect_values, ExcelFunction, FunctionArgument, ValueOrigin};
use crate::compiler::{CompileResult, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;
use gridcalc_core::ExcelError;

pub struct If;

impl ExcelFunction for If {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let condition = match boolean_arg(&args[0]) {
            Ok(b) => b,
            Err(e) => return Ok(CompileResult::from_error(e)),
        };
        let branch = if condition { args.get(1) } else { args.get(2) };
        Ok(match branch {
            Some(arg) => arg.to_compile_result(),
            None => CompileResult::from_boolean(condition),
        })
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(3)
    }
}

pub struct IfError;

impl ExcelFunction for IfError {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        if args[0].is_error() {
            return Ok(args[1].to_compile_result());
        }
        Ok(args[0].to_compile_result())
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

pub struct IfNa;

impl ExcelFunction for IfNa {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        if args[0].error() == Some(ExcelError::NA) {
            return Ok(args[1].to_compile_result());
        }
        Ok(args[0].to_compile_result())
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> Option<usize> {
        Some(2)
    }
}

pub struct And;

impl ExcelFunction for And {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        fold_logical(args, true, |acc, b| acc && b)
    }

    fn min_args(&self) -> usize {
        1
    }
}

pub struct Or;

impl ExcelFunction for Or {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        fold_logical(args, false, |acc, b| acc || b)
    }

    fn min_args(&self) -> usize {
        1
    }
}

/// AND/OR fold truthiness over every collected value. Literal strings must
/// be coercible; text inside ranges is ignored, as are empty cells. When
/// nothing at all is usable the result is `#VALUE!`.
fn fold_logical(
    args: &[FunctionArgument],
    seed: bool,
    fold: impl Fn(bool, bool) -> bool,
) -> FormulaResult<CompileResult> {
    let mut acc = seed;
    let mut seen = false;
    for (value, origin) in collect_values(args) {
        let truthy = match value {
            Value::Error(e) => return Ok(CompileResult::from_error(e)),
            Value::Boolean(b) => b,
            Value::Number(n) => n != 0.0,
            Value::String(s) if origin == ValueOrigin::Literal => {
                if s.eq_ignore_ascii_case("true") {
                    true
                } else if s.eq_ignore_ascii_case("false") {
                    false
                } else {
                    return Ok(CompileResult::from_error(ExcelError::Value));
                }
            }
            _ => continue,
        };
        seen = true;
        acc = fold(acc, truthy);
    }
    if !seen {
        return Ok(CompileResult::from_error(ExcelError::Value));
    }
    Ok(CompileResult::from_boolean(acc))
}

pub struct Not;

impl ExcelFunction for Not {
    fn execute(
        &self,
        args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        match boolean_arg(&args[0]) {
            Ok(b) => Ok(CompileResult::from_boolean(!b)),
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

pub struct True;

impl ExcelFunction for True {
    fn execute(
        &self,
        _args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        Ok(CompileResult::from_boolean(true))
    }

    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
}

pub struct False;

impl ExcelFunction for False {
    fn execute(
        &self,
        _args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        Ok(CompileResult::from_boolean(false))
    }

    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
}
