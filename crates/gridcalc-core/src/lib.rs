//! # gridcalc-core
//!
//! Core data structures shared by the gridcalc formula engine:
//! - [`CellAddress`] and [`CellRange`] - A1-style cell addressing
//! - [`CellValue`] - the values a worksheet backing store hands the engine
//! - [`ExcelError`] - the seven Excel spreadsheet error values
//!
//! The worksheet model itself (storage, styling, file formats) lives behind
//! the formula crate's data-provider interface and is not part of this crate.

pub mod cell;
pub mod error;
pub mod value;

pub use cell::{CellAddress, CellRange};
pub use error::{Error, Result};
pub use value::{CellValue, ExcelError};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit, column XFD)
pub const MAX_COLS: u16 = 16_384;
