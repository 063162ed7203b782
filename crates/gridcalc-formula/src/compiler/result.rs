//! Compilation result model
//!
//! Every expression compiles to a [`CompileResult`]: a value plus the
//! [`DataType`] the engine decided it has. Spreadsheet errors travel here
//! as ordinary values.

use crate::provider::RangeInfo;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use gridcalc_core::{CellValue, ExcelError};
use lazy_regex::regex_is_match;
use once_cell::unsync::OnceCell;

/// The value produced by compiling an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Number(f64),
    String(String),
    Boolean(bool),
    Error(ExcelError),
    DateTime(NaiveDateTime),
    /// An unresolved range reference, kept whole for range-aware functions
    Range(RangeInfo),
    /// A flattened array literal
    Array(Vec<Value>),
}

impl Value {
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl From<CellValue> for Value {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => Value::Empty,
            CellValue::Number(n) => Value::Number(n),
            CellValue::String(s) => Value::String(s),
            CellValue::Boolean(b) => Value::Boolean(b),
            CellValue::Error(e) => Value::Error(e),
            CellValue::DateTime(dt) => Value::DateTime(dt),
        }
    }
}

/// What kind of value a [`CompileResult`] carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Decimal,
    Boolean,
    String,
    Date,
    Time,
    Empty,
    ExcelError,
    Enumerable,
    Unknown,
}

/// Number of days between the OLE automation epoch (1899-12-30) and a date
fn oa_date_serial(dt: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let seconds = dt.signed_duration_since(epoch).num_seconds() as f64;
    seconds / 86_400.0
}

fn time_fraction(t: &NaiveTime) -> f64 {
    t.num_seconds_from_midnight() as f64 / 86_400.0
}

/// The outcome of compiling one expression
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub result: Value,
    pub data_type: DataType,
    /// Non-zero when this result came through a cell reference; lets
    /// reference-aware functions recover the address it was read from.
    pub address_ref_id: u32,
    pub is_hidden_cell: bool,
    pub is_result_of_subtotal: bool,
    numeric_string: OnceCell<Option<f64>>,
    date_string: OnceCell<Option<f64>>,
}

impl PartialEq for CompileResult {
    fn eq(&self, other: &Self) -> bool {
        self.result == other.result && self.data_type == other.data_type
    }
}

impl CompileResult {
    pub fn new(result: Value, data_type: DataType) -> Self {
        Self {
            result,
            data_type,
            address_ref_id: 0,
            is_hidden_cell: false,
            is_result_of_subtotal: false,
            numeric_string: OnceCell::new(),
            date_string: OnceCell::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Value::Empty, DataType::Empty)
    }

    pub fn from_error(error: ExcelError) -> Self {
        Self::new(Value::Error(error), DataType::ExcelError)
    }

    pub fn from_number(n: f64) -> Self {
        Self::new(Value::Number(n), DataType::Decimal)
    }

    pub fn from_boolean(b: bool) -> Self {
        Self::new(Value::Boolean(b), DataType::Boolean)
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self::new(Value::String(s.into()), DataType::String)
    }

    /// Wrap a provider value. Numbers from the grid arrive as `Decimal`;
    /// the engine does not distinguish stored integers.
    pub fn from_cell_value(value: CellValue) -> Self {
        match value {
            CellValue::Empty => Self::empty(),
            CellValue::Number(n) => Self::new(Value::Number(n), DataType::Decimal),
            CellValue::String(s) => Self::new(Value::String(s), DataType::String),
            CellValue::Boolean(b) => Self::new(Value::Boolean(b), DataType::Boolean),
            CellValue::Error(e) => Self::from_error(e),
            CellValue::DateTime(dt) => Self::new(Value::DateTime(dt), DataType::Date),
        }
    }

    pub fn is_error(&self) -> bool {
        self.data_type == DataType::ExcelError
    }

    pub fn error(&self) -> Option<ExcelError> {
        match &self.result {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Whether the value participates in arithmetic without conversion
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.data_type,
            DataType::Integer
                | DataType::Decimal
                | DataType::Empty
                | DataType::Boolean
                | DataType::Date
        )
    }

    /// A string value that parses as a number. Memoized; the parse runs at
    /// most once per result.
    pub fn is_numeric_string(&self) -> bool {
        self.numeric_value_of_string().is_some()
    }

    /// A string value that parses as a date or time
    pub fn is_date_string(&self) -> bool {
        self.date_value_of_string().is_some()
    }

    fn numeric_value_of_string(&self) -> Option<f64> {
        *self.numeric_string.get_or_init(|| match &self.result {
            Value::String(s) => parse_numeric_string(s),
            _ => None,
        })
    }

    fn date_value_of_string(&self) -> Option<f64> {
        *self.date_string.get_or_init(|| match &self.result {
            Value::String(s) => parse_date_string(s).map(|(serial, _)| serial),
            _ => None,
        })
    }

    /// The numeric rendering of this result. Booleans become 0/1, dates
    /// their serial number, coercible strings their parsed value; anything
    /// else is 0.
    pub fn result_numeric(&self) -> f64 {
        match &self.result {
            Value::Number(n) => *n,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::DateTime(dt) => {
                if self.data_type == DataType::Time {
                    time_fraction(&dt.time())
                } else {
                    oa_date_serial(dt)
                }
            }
            Value::Empty => 0.0,
            Value::String(_) => self
                .numeric_value_of_string()
                .or_else(|| self.date_value_of_string())
                .unwrap_or(0.0),
            Value::Range(info) => {
                CompileResult::from_cell_value(info.first_value()).result_numeric()
            }
            Value::Error(_) | Value::Array(_) => 0.0,
        }
    }

    /// The scalar value of this result. A range dereferences to its first
    /// cell, which is what a scalar operator context expects.
    pub fn result_value(&self) -> Value {
        match &self.result {
            Value::Range(info) => Value::from(info.first_value()),
            other => other.clone(),
        }
    }
}

/// Parse a string the way cell entry would: plain, scientific or
/// thousands-grouped decimal notation. Rejects partial matches, infinities
/// and NaN so `"1x"` and `"inf"` stay strings.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let candidate = if regex_is_match!(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$", s) {
        s.replace(',', "")
    } else if regex_is_match!(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$", s) {
        s.to_string()
    } else {
        return None;
    };
    candidate.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a string as a date, datetime or time-of-day. Returns the serial
/// value and the [`DataType`] it should carry.
pub fn parse_date_string(s: &str) -> Option<(f64, DataType)> {
    let s = s.trim();
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some((oa_date_serial(&dt), DataType::Date));
        }
    }
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            let dt = d.and_hms_opt(0, 0, 0)?;
            return Some((oa_date_serial(&dt), DataType::Date));
        }
    }
    const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];
    for format in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(s, format) {
            return Some((time_fraction(&t), DataType::Time));
        }
    }
    None
}

/// Render a value the way it would display in a cell
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Empty => String::new(),
        Value::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Value::String(s) => s.clone(),
        Value::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Error(e) => e.as_str().to_string(),
        // dates display as their serial number, like Excel's general format
        Value::DateTime(dt) => value_to_string(&Value::Number(oa_date_serial(dt))),
        Value::Range(info) => value_to_string(&Value::from(info.first_value())),
        Value::Array(values) => values
            .first()
            .map(value_to_string)
            .unwrap_or_default(),
    }
}
