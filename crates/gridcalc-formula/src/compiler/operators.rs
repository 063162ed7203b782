//! Binary operators
//!
//! Precedence tiers, from tightest to loosest: exponentiation, then
//! multiplication/division, then addition/subtraction, then concatenation,
//! then the comparisons. Exponentiation associates to the right; everything
//! else to the left.

use super::result::{value_to_string, CompileResult, DataType, Value};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{Token, TokenType};
use gridcalc_core::ExcelError;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Concat,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

pub const PRECEDENCE_POWER: u8 = 5;
pub const PRECEDENCE_MULTIPLICATIVE: u8 = 4;
pub const PRECEDENCE_ADDITIVE: u8 = 3;
pub const PRECEDENCE_CONCAT: u8 = 2;
pub const PRECEDENCE_COMPARISON: u8 = 1;

impl Operator {
    pub fn from_token(token: &Token) -> FormulaResult<Self> {
        if !token.is(TokenType::Operator) {
            return Err(FormulaError::UnsupportedToken(token.value().to_string()));
        }
        match token.value() {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "^" => Ok(Operator::Power),
            "&" => Ok(Operator::Concat),
            "=" => Ok(Operator::Equal),
            "<>" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterEqual),
            other => Err(FormulaError::UnsupportedToken(other.to_string())),
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Operator::Power => PRECEDENCE_POWER,
            Operator::Multiply | Operator::Divide => PRECEDENCE_MULTIPLICATIVE,
            Operator::Add | Operator::Subtract => PRECEDENCE_ADDITIVE,
            Operator::Concat => PRECEDENCE_CONCAT,
            Operator::Equal
            | Operator::NotEqual
            | Operator::LessThan
            | Operator::LessEqual
            | Operator::GreaterThan
            | Operator::GreaterEqual => PRECEDENCE_COMPARISON,
        }
    }

    /// Apply the operator to two compiled operands. Errors propagate before
    /// anything else, left operand first.
    pub fn apply(self, left: &CompileResult, right: &CompileResult) -> CompileResult {
        if let Some(e) = left.error() {
            return CompileResult::from_error(e);
        }
        if let Some(e) = right.error() {
            return CompileResult::from_error(e);
        }
        match self {
            Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide
            | Operator::Power => self.apply_arithmetic(left, right),
            Operator::Concat => {
                let text = format!(
                    "{}{}",
                    value_to_string(&left.result_value()),
                    value_to_string(&right.result_value())
                );
                CompileResult::from_string(text)
            }
            _ => CompileResult::from_boolean(self.compare(left, right)),
        }
    }

    fn apply_arithmetic(self, left: &CompileResult, right: &CompileResult) -> CompileResult {
        let (Some(l), Some(r)) = (numeric_operand(left), numeric_operand(right)) else {
            return CompileResult::from_error(ExcelError::Value);
        };
        let value = match self {
            Operator::Add => l + r,
            Operator::Subtract => l - r,
            Operator::Multiply => l * r,
            Operator::Divide => {
                if r == 0.0 {
                    return CompileResult::from_error(ExcelError::Div0);
                }
                l / r
            }
            Operator::Power => {
                let v = l.powf(r);
                if !v.is_finite() {
                    return CompileResult::from_error(ExcelError::Num);
                }
                v
            }
            _ => unreachable!(),
        };
        // integer-ness survives +, - and * on two integer operands
        let data_type = match self {
            Operator::Add | Operator::Subtract | Operator::Multiply
                if left.data_type == DataType::Integer && right.data_type == DataType::Integer =>
            {
                DataType::Integer
            }
            _ => DataType::Decimal,
        };
        CompileResult::new(Value::Number(value), data_type)
    }

    fn compare(self, left: &CompileResult, right: &CompileResult) -> bool {
        let ordering = compare_values(&left.result_value(), &right.result_value());
        match self {
            Operator::Equal => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterEqual => ordering != Ordering::Less,
            _ => unreachable!(),
        }
    }
}

/// Numeric coercion for arithmetic. Numbers, booleans, dates, empty and
/// number-like strings coerce; other strings do not.
fn numeric_operand(operand: &CompileResult) -> Option<f64> {
    if operand.is_numeric() {
        return Some(operand.result_numeric());
    }
    match &operand.result {
        Value::String(_) => {
            if operand.is_numeric_string() || operand.is_date_string() {
                Some(operand.result_numeric())
            } else {
                None
            }
        }
        // a range dereferences to its first cell, which then coerces like
        // any scalar operand
        Value::Range(info) => numeric_operand(&CompileResult::from_cell_value(info.first_value())),
        _ => None,
    }
}

/// Excel comparison ordering: any number sorts below any string, any string
/// below any boolean; strings compare case-insensitively; empty coerces to
/// the other side's zero value.
fn compare_values(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Number(_) | Value::DateTime(_) | Value::Empty => 0,
            Value::String(_) => 1,
            Value::Boolean(_) => 2,
            _ => 3,
        }
    }
    let left = normalize_empty(left, right);
    let right = normalize_empty(&right.clone(), &left);
    match (&left, &right) {
        (Value::String(a), Value::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        _ if rank(&left) == 0 && rank(&right) == 0 => {
            let a = CompileResult::new(left.clone(), DataType::Decimal).result_numeric();
            let b = CompileResult::new(right.clone(), DataType::Decimal).result_numeric();
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => rank(&left).cmp(&rank(&right)),
    }
}

/// Empty compares equal to 0, "" and FALSE
fn normalize_empty(value: &Value, other: &Value) -> Value {
    if !matches!(value, Value::Empty) {
        return value.clone();
    }
    match other {
        Value::String(_) => Value::String(String::new()),
        Value::Boolean(_) => Value::Boolean(false),
        _ => Value::Number(0.0),
    }
}
