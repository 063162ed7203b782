//! Worksheet functions
//!
//! Functions are `Send + Sync` unit structs registered by name in a
//! [`FunctionRepository`]. Lookup is case-insensitive. How a function's
//! arguments are compiled is decided by the
//! [`compilers`](self::compilers) dispatch, not by the function itself.

pub mod compilers;
mod datetime;
mod information;
mod logical;
mod lookup;
mod math;
mod statistical;
mod text;

pub use datetime::{Now, Today};
pub use information::{ErrorType, IsErr, IsError, IsNa, Na};
pub use logical::{And, False, If, IfError, IfNa, Not, Or, True};
pub use lookup::{Choose, Column, Row, VLookup};
pub use math::{Abs, Power, Rand, RandBetween, Round, Sum};
pub use statistical::{Average, AverageA, Count, Max, Min};
pub use text::{Concatenate, Len};

use crate::compiler::{parse_date_string, parse_numeric_string, CompileResult, DataType, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;
use ahash::AHashMap;
use gridcalc_core::ExcelError;
use std::sync::Arc;

use self::compilers::CustomFunctionCompiler;

/// Cell metadata flags carried on an argument
pub mod cell_state {
    pub const HIDDEN_CELL: u8 = 0b0000_0001;
    pub const SUBTOTAL_EXCLUSION: u8 = 0b0000_0010;
}

/// One compiled argument handed to a function
#[derive(Debug, Clone)]
pub struct FunctionArgument {
    pub value: Value,
    pub data_type: DataType,
    /// Non-zero when the argument came through a cell reference
    pub excel_address_reference_id: u32,
    state: u8,
}

impl FunctionArgument {
    pub fn new(value: Value, data_type: DataType) -> Self {
        Self {
            value,
            data_type,
            excel_address_reference_id: 0,
            state: 0,
        }
    }

    pub fn from_compile_result(result: CompileResult) -> Self {
        let mut arg = Self::new(result.result.clone(), result.data_type);
        arg.excel_address_reference_id = result.address_ref_id;
        if result.is_hidden_cell {
            arg.set_state_flag(cell_state::HIDDEN_CELL);
        }
        if result.is_result_of_subtotal {
            arg.set_state_flag(cell_state::SUBTOTAL_EXCLUSION);
        }
        arg
    }

    pub fn set_state_flag(&mut self, flag: u8) {
        self.state |= flag;
    }

    pub fn state_flag_is_set(&mut self, flag: u8) -> bool {
        self.state & flag != 0
    }

    pub fn is_error(&self) -> bool {
        matches!(self.value, Value::Error(_))
    }

    pub fn error(&self) -> Option<ExcelError> {
        match &self.value {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// The scalar value: a range dereferences to its first cell.
    pub fn value_first(&self) -> Value {
        match &self.value {
            Value::Range(info) => Value::from(info.first_value()),
            other => other.clone(),
        }
    }

    /// View this argument as a compile result, regaining its coercions.
    pub fn to_compile_result(&self) -> CompileResult {
        let mut result = CompileResult::new(self.value.clone(), self.data_type);
        result.address_ref_id = self.excel_address_reference_id;
        result
    }
}

/// A worksheet function implementation
pub trait ExcelFunction: Send + Sync {
    fn execute(
        &self,
        args: &[FunctionArgument],
        ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult>;

    /// Volatile functions recalculate on every pass regardless of
    /// dependencies.
    fn is_volatile(&self) -> bool {
        false
    }

    fn min_args(&self) -> usize {
        0
    }

    /// `None` means unbounded
    fn max_args(&self) -> Option<usize> {
        None
    }
}

/// A batch of functions registered together
pub trait FunctionModule {
    fn functions(&self) -> Vec<(&'static str, Arc<dyn ExcelFunction>)>;

    fn custom_compilers(&self) -> Vec<(&'static str, Arc<dyn CustomFunctionCompiler>)> {
        Vec::new()
    }
}

/// Name-keyed function registry
#[derive(Default)]
pub struct FunctionRepository {
    functions: AHashMap<String, Arc<dyn ExcelFunction>>,
    custom_compilers: AHashMap<String, Arc<dyn CustomFunctionCompiler>>,
}

impl FunctionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository preloaded with the built-in functions
    pub fn with_builtins() -> Self {
        let mut repository = Self::new();
        repository.load_module(&BuiltinModule);
        repository
    }

    pub fn load_module(&mut self, module: &dyn FunctionModule) {
        for (name, function) in module.functions() {
            self.add(name, function);
        }
        for (name, compiler) in module.custom_compilers() {
            self.custom_compilers.insert(name.to_uppercase(), compiler);
        }
    }

    pub fn add(&mut self, name: &str, function: Arc<dyn ExcelFunction>) {
        self.functions.insert(name.to_uppercase(), function);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ExcelFunction>> {
        self.functions.get(&name.to_uppercase()).cloned()
    }

    pub fn get_custom_compiler(&self, name: &str) -> Option<Arc<dyn CustomFunctionCompiler>> {
        self.custom_compilers.get(&name.to_uppercase()).cloned()
    }

    pub fn is_volatile(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.is_volatile())
    }
}

struct BuiltinModule;

impl FunctionModule for BuiltinModule {
    fn functions(&self) -> Vec<(&'static str, Arc<dyn ExcelFunction>)> {
        vec![
            ("SUM", Arc::new(Sum) as Arc<dyn ExcelFunction>),
            ("ABS", Arc::new(Abs)),
            ("ROUND", Arc::new(Round)),
            ("POWER", Arc::new(Power)),
            ("RAND", Arc::new(Rand)),
            ("RANDBETWEEN", Arc::new(RandBetween)),
            ("AVERAGE", Arc::new(Average)),
            ("AVERAGEA", Arc::new(AverageA)),
            ("COUNT", Arc::new(Count)),
            ("MIN", Arc::new(Min)),
            ("MAX", Arc::new(Max)),
            ("IF", Arc::new(If)),
            ("IFERROR", Arc::new(IfError)),
            ("IFNA", Arc::new(IfNa)),
            ("AND", Arc::new(And)),
            ("OR", Arc::new(Or)),
            ("NOT", Arc::new(Not)),
            ("TRUE", Arc::new(True)),
            ("FALSE", Arc::new(False)),
            ("ISERROR", Arc::new(IsError)),
            ("ISERR", Arc::new(IsErr)),
            ("ISNA", Arc::new(IsNa)),
            ("ERROR.TYPE", Arc::new(ErrorType)),
            ("NA", Arc::new(Na)),
            ("ROW", Arc::new(Row)),
            ("COLUMN", Arc::new(Column)),
            ("CHOOSE", Arc::new(Choose)),
            ("VLOOKUP", Arc::new(VLookup)),
            ("CONCATENATE", Arc::new(Concatenate)),
            ("LEN", Arc::new(Len)),
            ("NOW", Arc::new(Now)),
            ("TODAY", Arc::new(Today)),
        ]
    }
}

/// Where a collected value came from; several statistical functions treat
/// literals, cells and array members differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    Literal,
    Cell,
    Array,
}

/// Flatten arguments into scalar values, tagging each with its origin.
pub fn collect_values(args: &[FunctionArgument]) -> Vec<(Value, ValueOrigin)> {
    let mut out = Vec::new();
    for arg in args {
        match &arg.value {
            Value::Range(info) => {
                for cell in &info.cells {
                    out.push((Value::from(cell.value.clone()), ValueOrigin::Cell));
                }
            }
            Value::Array(values) => {
                for value in values {
                    out.push((value.clone(), ValueOrigin::Array));
                }
            }
            other => out.push((other.clone(), ValueOrigin::Literal)),
        }
    }
    out
}

/// Numeric coercion for a literal string: number forms first, then date
/// and time forms, each yielding the value's serial.
pub fn literal_string_number(s: &str) -> Option<f64> {
    parse_numeric_string(s).or_else(|| parse_date_string(s).map(|(serial, _)| serial))
}

/// Strict numeric coercion for a scalar argument position. Booleans and
/// empty coerce, parsable strings coerce, anything else is `#VALUE!`.
pub fn numeric_arg(arg: &FunctionArgument) -> Result<f64, ExcelError> {
    if let Some(e) = arg.error() {
        return Err(e);
    }
    let result = match &arg.value {
        Value::Range(info) => CompileResult::from_cell_value(info.first_value()),
        _ => arg.to_compile_result(),
    };
    if let Some(e) = result.error() {
        return Err(e);
    }
    if result.is_numeric() || result.is_numeric_string() || result.is_date_string() {
        Ok(result.result_numeric())
    } else {
        Err(ExcelError::Value)
    }
}

/// Truthiness for logical argument positions
pub fn boolean_arg(arg: &FunctionArgument) -> Result<bool, ExcelError> {
    if let Some(e) = arg.error() {
        return Err(e);
    }
    match arg.value_first() {
        Value::Boolean(b) => Ok(b),
        Value::Number(n) => Ok(n != 0.0),
        Value::Empty => Ok(false),
        Value::String(s) => {
            if s.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if s.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(ExcelError::Value)
            }
        }
        _ => Err(ExcelError::Value),
    }
}
