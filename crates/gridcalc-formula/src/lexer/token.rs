//! Token types produced by the tokenizer

use std::fmt;

/// Classification of a single formula token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    Integer,
    Decimal,
    Boolean,
    /// A string delimiter (`"`)
    String,
    /// The literal content between string delimiters
    StringContent,
    Operator,
    /// A collapsed unary minus preceding a value
    Negator,
    OpeningParenthesis,
    ClosingParenthesis,
    /// `{` opening an array literal
    OpeningEnumerable,
    /// `}` closing an array literal
    ClosingEnumerable,
    Comma,
    SemiColon,
    /// A function name (identifier immediately followed by `(`)
    Function,
    /// A cell or range reference, optionally worksheet-qualified
    ExcelAddress,
    /// A defined name or an error literal such as `#DIV/0!`
    NameValue,
    /// A quoted worksheet name outside a reference
    WorksheetName,
    OpeningBracket,
    ClosingBracket,
    /// Postfix percent
    Percent,
    /// Text the tokenizer could not classify; rejected by the analyzer
    Unrecognized,
}

/// A single token: its source text and classification.
///
/// Immutable once created; consumed by the graph builder and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    token_type: TokenType,
}

impl Token {
    pub fn new(value: impl Into<String>, token_type: TokenType) -> Self {
        Self {
            value: value.into(),
            token_type,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.token_type, self.value)
    }
}
