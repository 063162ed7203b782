//! Date and time functions

use super::{ExcelFunction, FunctionArgument};
use crate::compiler::{CompileResult, DataType, Value};
use crate::context::ParsingContext;
use crate::error::FormulaResult;
use chrono::Local;

pub struct Now;

impl ExcelFunction for Now {
    fn execute(
        &self,
        _args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        Ok(CompileResult::new(
            Value::DateTime(Local::now().naive_local()),
            DataType::Date,
        ))
    }

    fn is_volatile(&self) -> bool {
        true
    }

    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
}

pub struct Today;

impl ExcelFunction for Today {
    fn execute(
        &self,
        _args: &[FunctionArgument],
        _ctx: &mut ParsingContext,
    ) -> FormulaResult<CompileResult> {
        let midnight = Local::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_else(|| Local::now().naive_local());
        Ok(CompileResult::new(
            Value::DateTime(midnight),
            DataType::Date,
        ))
    }

    fn is_volatile(&self) -> bool {
        true
    }

    fn max_args(&self) -> Option<usize> {
        Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRepository;
    use crate::provider::InMemoryProvider;

    #[test]
    fn now_is_a_date_after_the_epoch() {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut ctx = ParsingContext::new(&provider, &repository);
        let result = Now.execute(&[], &mut ctx).unwrap();
        assert_eq!(result.data_type, DataType::Date);
        // serial for any present-day date is far above zero
        assert!(result.result_numeric() > 40_000.0);
    }

    #[test]
    fn today_has_no_time_component() {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut ctx = ParsingContext::new(&provider, &repository);
        let result = Today.execute(&[], &mut ctx).unwrap();
        assert_eq!(result.result_numeric().fract(), 0.0);
    }
}
