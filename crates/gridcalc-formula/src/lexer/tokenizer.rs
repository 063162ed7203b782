//! Formula tokenizer
//!
//! Splits an Excel-style formula string into a flat sequence of typed
//! [`Token`]s. Invalid character sequences become `Unrecognized` tokens
//! rather than failing here; rejection is deferred to the
//! [`SyntacticAnalyzer`](super::SyntacticAnalyzer).

use super::token::{Token, TokenType};
use gridcalc_core::ExcelError;
use lazy_regex::regex_is_match;

/// Tokenizer for Excel formula syntax
pub struct Tokenizer;

impl Tokenizer {
    /// Tokenize a formula. A leading `=` is stripped.
    pub fn tokenize(formula: &str) -> Vec<Token> {
        let formula = formula.trim();
        let formula = formula.strip_prefix('=').unwrap_or(formula);

        let chars: Vec<char> = formula.chars().collect();
        let mut tokens: Vec<Token> = Vec::new();
        let mut current = String::new();
        let mut pos = 0;

        while pos < chars.len() {
            let c = chars[pos];

            // String literal: everything up to the closing quote is a single
            // StringContent token, operators inside are never evaluated.
            if c == '"' {
                flush(&mut tokens, &mut current, chars.get(pos + 1));
                tokens.push(Token::new("\"", TokenType::String));
                pos += 1;
                let mut content = String::new();
                while pos < chars.len() {
                    if chars[pos] == '"' {
                        if chars.get(pos + 1) == Some(&'"') {
                            content.push('"');
                            pos += 2;
                            continue;
                        }
                        break;
                    }
                    content.push(chars[pos]);
                    pos += 1;
                }
                tokens.push(Token::new(content, TokenType::StringContent));
                if pos < chars.len() {
                    // closing delimiter
                    tokens.push(Token::new("\"", TokenType::String));
                    pos += 1;
                }
                continue;
            }

            // Quoted worksheet name: 'My Sheet'!A1 folds into the address
            // token; a stray quoted name stands alone as WorksheetName.
            if c == '\'' && current.is_empty() {
                pos += 1;
                let mut name = String::new();
                while pos < chars.len() {
                    if chars[pos] == '\'' {
                        if chars.get(pos + 1) == Some(&'\'') {
                            name.push('\'');
                            pos += 2;
                            continue;
                        }
                        pos += 1;
                        break;
                    }
                    name.push(chars[pos]);
                    pos += 1;
                }
                if chars.get(pos) == Some(&'!') {
                    current.push_str(&name);
                    current.push('!');
                    pos += 1;
                } else {
                    tokens.push(Token::new(name, TokenType::WorksheetName));
                }
                continue;
            }

            // '/' inside an error literal (#DIV/0!) is not a separator
            if c == '/' && current.starts_with('#') {
                current.push(c);
                pos += 1;
                continue;
            }

            if c.is_whitespace() {
                flush(&mut tokens, &mut current, chars.get(pos + 1));
                pos += 1;
                continue;
            }

            // a sign right after a digit-led exponent prefix (2.5E) belongs
            // to the scientific literal, not the expression
            if (c == '+' || c == '-') && is_exponent_prefix(&current) {
                current.push(c);
                pos += 1;
                continue;
            }

            if let Some((sep, len)) = separator_at(&chars, pos) {
                flush(&mut tokens, &mut current, Some(&c));
                tokens.push(sep);
                pos += len;
                continue;
            }

            current.push(c);
            pos += 1;
        }
        flush(&mut tokens, &mut current, None);

        remove_duplicate_operators(tokens)
    }
}

/// A number body followed by a bare `e`/`E`, waiting for its exponent
fn is_exponent_prefix(current: &str) -> bool {
    let Some(body) = current.strip_suffix(&['e', 'E'][..]) else {
        return false;
    };
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// Recognize a separator (or two-character operator) at `pos`
fn separator_at(chars: &[char], pos: usize) -> Option<(Token, usize)> {
    let c = chars[pos];
    let next = chars.get(pos + 1).copied();
    let token = match c {
        '<' => match next {
            Some('=') => return Some((Token::new("<=", TokenType::Operator), 2)),
            Some('>') => return Some((Token::new("<>", TokenType::Operator), 2)),
            _ => Token::new("<", TokenType::Operator),
        },
        '>' => match next {
            Some('=') => return Some((Token::new(">=", TokenType::Operator), 2)),
            _ => Token::new(">", TokenType::Operator),
        },
        '+' | '-' | '*' | '/' | '^' | '&' | '=' => Token::new(c.to_string(), TokenType::Operator),
        '(' => Token::new("(", TokenType::OpeningParenthesis),
        ')' => Token::new(")", TokenType::ClosingParenthesis),
        '{' => Token::new("{", TokenType::OpeningEnumerable),
        '}' => Token::new("}", TokenType::ClosingEnumerable),
        '[' => Token::new("[", TokenType::OpeningBracket),
        ']' => Token::new("]", TokenType::ClosingBracket),
        ',' => Token::new(",", TokenType::Comma),
        ';' => Token::new(";", TokenType::SemiColon),
        '%' => Token::new("%", TokenType::Percent),
        _ => return None,
    };
    Some((token, 1))
}

/// Classify and emit the accumulated text, if any. `next` is the character
/// that triggered the flush; an identifier followed by `(` is a function.
fn flush(tokens: &mut Vec<Token>, current: &mut String, next: Option<&char>) {
    if current.is_empty() {
        return;
    }
    let text = std::mem::take(current);
    let token_type = classify(&text, next == Some(&'('));
    tokens.push(Token::new(text, token_type));
}

fn classify(text: &str, followed_by_paren: bool) -> TokenType {
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return TokenType::Integer;
    }
    if regex_is_match!(r"^(\d+\.\d*|\.?\d+)([eE][+-]?\d+)?$", text) {
        return TokenType::Decimal;
    }
    if followed_by_paren && regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_.]*$", text) {
        return TokenType::Function;
    }
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        return TokenType::Boolean;
    }
    if is_address(text) {
        return TokenType::ExcelAddress;
    }
    if ExcelError::is_error_string(text) {
        // error literals travel as NameValue; the expression factory maps
        // them onto the ExcelError leaf
        return TokenType::NameValue;
    }
    if regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_.]*$", text) {
        return TokenType::NameValue;
    }
    TokenType::Unrecognized
}

/// A1-style cell or range reference, optionally `[Book]Sheet!`-qualified
fn is_address(text: &str) -> bool {
    regex_is_match!(
        r"^(\[[^\]]+\])?([A-Za-z_0-9 .']+!)?\$?[A-Za-z]{1,3}\$?[0-9]+(:\$?[A-Za-z]{1,3}\$?[0-9]+)?$",
        text
    )
}

/// Collapse runs of consecutive `+`/`-` operators.
///
/// A run in unary position (start of expression, after an operator, an
/// opening delimiter or an argument separator) reduces to a single Negator
/// when it contains an odd number of minus signs, and to nothing at all when
/// even. A run opening in binary position keeps a single Operator whose sign
/// is the XOR-parity of its minus signs.
fn remove_duplicate_operators(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let t = &tokens[i];
        let is_sign = t.is(TokenType::Operator) && (t.value() == "+" || t.value() == "-");
        if !is_sign {
            out.push(t.clone());
            i += 1;
            continue;
        }
        let mut minus = 0usize;
        let mut j = i;
        while j < tokens.len() {
            let r = &tokens[j];
            if r.is(TokenType::Operator) && (r.value() == "+" || r.value() == "-") {
                if r.value() == "-" {
                    minus += 1;
                }
                j += 1;
            } else {
                break;
            }
        }
        let unary = match out.last() {
            None => true,
            Some(prev) => matches!(
                prev.token_type(),
                TokenType::Operator
                    | TokenType::Negator
                    | TokenType::OpeningParenthesis
                    | TokenType::OpeningEnumerable
                    | TokenType::Comma
                    | TokenType::SemiColon
            ),
        };
        if unary {
            if minus % 2 == 1 {
                out.push(Token::new("-", TokenType::Negator));
            }
        } else {
            let sign = if minus % 2 == 1 { "-" } else { "+" };
            out.push(Token::new(sign, TokenType::Operator));
        }
        i = j;
    }
    out
}
