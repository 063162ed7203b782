//! Excel-style formula engine: tokenizer, expression compiler and
//! dependency-ordered calculation.
//!
//! The pipeline mirrors how a spreadsheet evaluates a cell:
//!
//! 1. [`lexer::Tokenizer`] splits formula text into typed tokens
//! 2. [`lexer::SyntacticAnalyzer`] validates the token stream
//! 3. [`graph::ExpressionGraphBuilder`] builds the expression tree
//! 4. [`compiler::ExpressionCompiler`] reduces it by operator precedence
//!    to a typed [`compiler::CompileResult`]
//!
//! [`parser::FormulaParser`] runs the pipeline for one formula;
//! [`calculate::Calculator`] runs whole workbooks, ordering formulas by
//! their dependencies and isolating circular references.
//!
//! Spreadsheet errors (`#DIV/0!`, `#NAME?`, ...) are values that flow
//! through results; `Err` is reserved for malformed input and violated
//! contracts.
//!
//! ```
//! use gridcalc_formula::context::ParsingContext;
//! use gridcalc_formula::functions::FunctionRepository;
//! use gridcalc_formula::parser::FormulaParser;
//! use gridcalc_formula::provider::InMemoryProvider;
//!
//! let mut provider = InMemoryProvider::new();
//! provider.set_cell_value(0, 0, 0, 20.0);
//! let repository = FunctionRepository::with_builtins();
//! let mut ctx = ParsingContext::new(&provider, &repository);
//! let result = FormulaParser::parse("=A1*2+2", &mut ctx).unwrap();
//! assert_eq!(result.result_numeric(), 42.0);
//! ```

pub mod calculate;
pub mod compiler;
pub mod context;
pub mod dependency;
pub mod error;
pub mod functions;
pub mod graph;
pub mod lexer;
pub mod parser;
pub mod provider;

pub use calculate::Calculator;
pub use compiler::{CompileResult, DataType, Value};
pub use context::ParsingContext;
pub use dependency::{CellKey, DependencyChain};
pub use error::{FormulaError, FormulaResult};
pub use functions::{ExcelFunction, FunctionArgument, FunctionRepository};
pub use parser::FormulaParser;
pub use provider::{DataProvider, InMemoryProvider};
