//! Cell value types and the Excel error taxonomy

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::fmt;

/// The seven Excel spreadsheet error values.
///
/// These are first-class result values, not host-level failures: they flow
/// through calculation and propagate into dependent cells exactly as Excel's
/// own evaluator produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExcelError {
    /// #DIV/0! - Division by zero
    Div0,
    /// #N/A - Value not available
    NA,
    /// #NAME? - Unrecognized formula name
    Name,
    /// #NULL! - Incorrect range operator
    Null,
    /// #NUM! - Invalid numeric value
    Num,
    /// #REF! - Invalid cell reference (also assigned to circular references)
    Ref,
    /// #VALUE! - Wrong type of argument or operand
    Value,
}

impl ExcelError {
    /// The display string Excel shows for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcelError::Div0 => "#DIV/0!",
            ExcelError::NA => "#N/A",
            ExcelError::Name => "#NAME?",
            ExcelError::Null => "#NULL!",
            ExcelError::Num => "#NUM!",
            ExcelError::Ref => "#REF!",
            ExcelError::Value => "#VALUE!",
        }
    }

    /// Parse an error literal ("#DIV/0!", "#N/A", ...)
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "#DIV/0!" => Ok(ExcelError::Div0),
            "#N/A" => Ok(ExcelError::NA),
            "#NAME?" => Ok(ExcelError::Name),
            "#NULL!" => Ok(ExcelError::Null),
            "#NUM!" => Ok(ExcelError::Num),
            "#REF!" => Ok(ExcelError::Ref),
            "#VALUE!" => Ok(ExcelError::Value),
            _ => Err(Error::InvalidErrorValue(s.to_string())),
        }
    }

    /// True if the string is a recognized error literal
    pub fn is_error_string(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Excel's ERROR.TYPE classification (1-based)
    pub fn error_type(&self) -> u8 {
        match self {
            ExcelError::Null => 1,
            ExcelError::Div0 => 2,
            ExcelError::Value => 3,
            ExcelError::Ref => 4,
            ExcelError::Name => 5,
            ExcelError::Num => 6,
            ExcelError::NA => 7,
        }
    }
}

impl fmt::Display for ExcelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value stored in a worksheet cell, as seen by the formula engine's
/// data-provider boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (no value)
    Empty,
    /// Numeric value (all plain numbers stored as f64)
    Number(f64),
    /// String value
    String(String),
    /// Boolean value (TRUE/FALSE)
    Boolean(bool),
    /// Error value (#VALUE!, #REF!, etc.)
    Error(ExcelError),
    /// Date/time value; serialized as an OLE automation date when used
    /// numerically
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// True if the cell holds an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// True if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<ExcelError> for CellValue {
    fn from(e: ExcelError) -> Self {
        CellValue::Error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_strings_round_trip() {
        for err in [
            ExcelError::Div0,
            ExcelError::NA,
            ExcelError::Name,
            ExcelError::Null,
            ExcelError::Num,
            ExcelError::Ref,
            ExcelError::Value,
        ] {
            assert_eq!(ExcelError::parse(err.as_str()).unwrap(), err);
        }
    }

    #[test]
    fn error_type_codes_match_excel() {
        assert_eq!(ExcelError::Null.error_type(), 1);
        assert_eq!(ExcelError::Div0.error_type(), 2);
        assert_eq!(ExcelError::Value.error_type(), 3);
        assert_eq!(ExcelError::Ref.error_type(), 4);
        assert_eq!(ExcelError::Name.error_type(), 5);
        assert_eq!(ExcelError::Num.error_type(), 6);
        assert_eq!(ExcelError::NA.error_type(), 7);
    }

    #[test]
    fn unknown_error_literal_rejected() {
        assert!(ExcelError::parse("#SPILL!").is_err());
        assert!(!ExcelError::is_error_string("DIV/0"));
    }
}
