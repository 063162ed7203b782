//! Function compilation dispatch
//!
//! Most functions get their arguments eagerly compiled, but a few need
//! control over compilation itself: IF only compiles the branch it takes,
//! IFERROR/IFNA trap failures in their first argument, lookup functions
//! need references kept as ranges, and the IS* family must receive error
//! values instead of propagating them. Dispatch order: a registered custom
//! compiler always wins, then the special families, then the default.

use super::{ExcelFunction, FunctionArgument};
use crate::compiler::{resolve_address_as_range, CompileResult};
use crate::context::ParsingContext;
use crate::error::{FormulaError, FormulaResult};
use crate::graph::{Expression, ExpressionKind};
use gridcalc_core::ExcelError;

/// Full control over how a function's argument expressions are compiled
pub trait CustomFunctionCompiler: Send + Sync {
    fn compile(
        &self,
        args: &[Expression],
        ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult>;
}

const LOOKUP_FUNCTIONS: &[&str] = &["ROW", "COLUMN", "CHOOSE", "VLOOKUP"];
const ERROR_HANDLING_FUNCTIONS: &[&str] = &["ISERROR", "ISERR", "ISNA", "ERROR.TYPE"];

pub struct FunctionCompilerFactory;

impl FunctionCompilerFactory {
    /// Compile a function call. An unregistered name compiles to `#NAME?`.
    pub fn compile_function(
        name: &str,
        args: &[Expression],
        ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let repository = ctx.repository;
        if let Some(custom) = repository.get_custom_compiler(name) {
            return custom.compile(args, ctx);
        }
        let Some(function) = repository.get(name) else {
            return Ok(CompileResult::from_error(ExcelError::Name));
        };
        let canonical = name.to_uppercase();
        match canonical.as_str() {
            "IF" => compile_if(&*function, &canonical, args, ctx),
            "IFERROR" => compile_if_error(&*function, &canonical, args, ctx),
            "IFNA" => compile_if_na(&*function, &canonical, args, ctx),
            n if LOOKUP_FUNCTIONS.contains(&n) => {
                compile_lookup(&*function, &canonical, args, ctx)
            }
            n if ERROR_HANDLING_FUNCTIONS.contains(&n) => {
                compile_error_handling(&*function, &canonical, args, ctx)
            }
            _ => compile_default(&*function, &canonical, args, ctx),
        }
    }
}

fn check_arity(
    function: &dyn ExcelFunction,
    name: &str,
    actual: usize,
) -> FormulaResult<()> {
    let min = function.min_args();
    let max = function.max_args();
    let ok = actual >= min && max.map_or(true, |max| actual <= max);
    if ok {
        return Ok(());
    }
    let expected = match max {
        Some(max) if max == min => format!("{min}"),
        Some(max) => format!("{min}..{max}"),
        None => format!("at least {min}"),
    };
    Err(FormulaError::ArgumentCount {
        function: name.to_string(),
        expected,
        actual,
    })
}

/// Eager compilation: every argument compiles before the function runs.
/// Error-valued arguments are passed through; the function decides what to
/// do with them.
fn compile_default(
    function: &dyn ExcelFunction,
    name: &str,
    args: &[Expression],
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    check_arity(function, name, args.len())?;
    let mut compiled = Vec::with_capacity(args.len());
    for arg in args {
        compiled.push(FunctionArgument::from_compile_result(arg.compile(ctx)?));
    }
    function.execute(&compiled, ctx)
}

/// IF compiles its condition, then only the branch the condition selects.
fn compile_if(
    function: &dyn ExcelFunction,
    name: &str,
    args: &[Expression],
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    check_arity(function, name, args.len())?;
    let condition = args[0].compile(ctx)?;
    if let Some(e) = condition.error() {
        return Ok(CompileResult::from_error(e));
    }
    let truthy = match super::boolean_arg(&FunctionArgument::from_compile_result(condition)) {
        Ok(b) => b,
        Err(e) => return Ok(CompileResult::from_error(e)),
    };
    let branch = if truthy { args.get(1) } else { args.get(2) };
    match branch {
        Some(expression) => expression.compile(ctx),
        // untaken-side default: IF with a missing branch yields the
        // condition's boolean
        None => Ok(CompileResult::from_boolean(truthy)),
    }
}

/// IFERROR traps any error, value-level or structural, in its first
/// argument and compiles the fallback instead.
fn compile_if_error(
    function: &dyn ExcelFunction,
    name: &str,
    args: &[Expression],
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    check_arity(function, name, args.len())?;
    match args[0].compile(ctx) {
        Ok(result) if !result.is_error() => Ok(result),
        _ => args[1].compile(ctx),
    }
}

/// IFNA traps only `#N/A`; every other error propagates.
fn compile_if_na(
    function: &dyn ExcelFunction,
    name: &str,
    args: &[Expression],
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    check_arity(function, name, args.len())?;
    let result = args[0].compile(ctx)?;
    if result.error() == Some(ExcelError::NA) {
        return args[1].compile(ctx);
    }
    Ok(result)
}

/// Lookup functions receive references as ranges, single cells included,
/// so they can see coordinates rather than dereferenced values.
fn compile_lookup(
    function: &dyn ExcelFunction,
    name: &str,
    args: &[Expression],
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    check_arity(function, name, args.len())?;
    let mut compiled = Vec::with_capacity(args.len());
    for arg in args {
        let result = match single_address(arg) {
            Some(text) => resolve_address_as_range(text, ctx)?,
            None => arg.compile(ctx)?,
        };
        compiled.push(FunctionArgument::from_compile_result(result));
    }
    function.execute(&compiled, ctx)
}

/// An argument node whose entire body is one undecorated cell reference
fn single_address(arg: &Expression) -> Option<&str> {
    let ExpressionKind::FunctionArgument(children) = &arg.kind else {
        return None;
    };
    match children.as_slice() {
        [child] if !child.negated && child.percent == 0 => match &child.kind {
            ExpressionKind::CellAddress(text) => Some(text.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// The IS* family inspects errors instead of propagating them. A structural
/// compilation failure in an argument arrives as a `#VALUE!` value.
fn compile_error_handling(
    function: &dyn ExcelFunction,
    name: &str,
    args: &[Expression],
    ctx: &mut ParsingContext,
) -> FormulaResult<CompileResult> {
    check_arity(function, name, args.len())?;
    let mut compiled = Vec::with_capacity(args.len());
    for arg in args {
        let result = arg
            .compile(ctx)
            .unwrap_or_else(|_| CompileResult::from_error(ExcelError::Value));
        compiled.push(FunctionArgument::from_compile_result(result));
    }
    function.execute(&compiled, ctx)
}
