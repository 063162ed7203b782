//! Expression graph
//!
//! The token stream becomes a tree of [`Expression`] nodes. Each node is a
//! tagged union over the expression kinds plus the decorations the builder
//! attaches: the binary operator linking it to the next sibling, a negation
//! flag and a postfix percent count.

mod builder;
mod factory;

pub use builder::ExpressionGraphBuilder;
pub use factory::ExpressionFactory;

use crate::compiler::Operator;
use gridcalc_core::ExcelError;

/// The payload of one expression node
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    /// Whole-number literal, stored as f64 like every Excel number
    Integer(f64),
    Decimal(f64),
    Boolean(bool),
    String(String),
    /// An error literal such as `#DIV/0!`
    Error(ExcelError),
    /// Unresolved reference text; resolved against the provider at compile time
    CellAddress(String),
    /// A defined name, or an unknown identifier (which compiles to `#NAME?`)
    NamedValue(String),
    /// A parenthesized subexpression
    Group(Vec<Expression>),
    Function {
        name: String,
        args: Vec<Expression>,
    },
    /// One function argument; its children are the argument's expression
    FunctionArgument(Vec<Expression>),
    /// An array literal `{...}`
    Enumerable(Vec<Expression>),
    /// A missing value: empty argument slot or empty array
    Empty,
}

/// One node of the expression tree
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    /// Binary operator between this node and the next sibling
    pub operator: Option<Operator>,
    /// Number of postfix `%` applications
    pub percent: u8,
    pub negated: bool,
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self {
            kind,
            operator: None,
            percent: 0,
            negated: false,
        }
    }

    /// Apply a unary minus. Numeric literals fold the sign in directly;
    /// everything else is marked for negation at compile time.
    pub fn negate(&mut self) {
        match &mut self.kind {
            ExpressionKind::Integer(n) | ExpressionKind::Decimal(n) => *n = -*n,
            _ => self.negated = !self.negated,
        }
    }

    pub fn children(&self) -> &[Expression] {
        match &self.kind {
            ExpressionKind::Group(children)
            | ExpressionKind::FunctionArgument(children)
            | ExpressionKind::Enumerable(children) => children,
            ExpressionKind::Function { args, .. } => args,
            _ => &[],
        }
    }
}

/// The root of a built formula: an ordered list of sibling expressions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionGraph {
    pub expressions: Vec<Expression>,
}

impl ExpressionGraph {
    pub fn new(expressions: Vec<Expression>) -> Self {
        Self { expressions }
    }
}
