//! Expression graph builder
//!
//! Single left-to-right pass over the validated token stream. Operators
//! attach to the preceding sibling; parentheses, function calls and array
//! literals recurse. Precedence is not resolved here; that happens in the
//! compiler.

use super::{Expression, ExpressionFactory, ExpressionGraph, ExpressionKind};
use crate::compiler::Operator;
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{Token, TokenType};

pub struct ExpressionGraphBuilder;

impl ExpressionGraphBuilder {
    pub fn build(tokens: &[Token]) -> FormulaResult<ExpressionGraph> {
        let mut pos = 0;
        let expressions = build_siblings(tokens, &mut pos, &[])?;
        if pos < tokens.len() {
            return Err(FormulaError::Format(format!(
                "unexpected token: {}",
                tokens[pos].value()
            )));
        }
        Ok(ExpressionGraph::new(expressions))
    }
}

/// Build sibling expressions until a token in `stop` or end of input.
/// The stop token itself is left unconsumed.
fn build_siblings(
    tokens: &[Token],
    pos: &mut usize,
    stop: &[TokenType],
) -> FormulaResult<Vec<Expression>> {
    let mut siblings: Vec<Expression> = Vec::new();
    let mut pending_negate = false;

    while let Some(token) = tokens.get(*pos) {
        if stop.contains(&token.token_type()) {
            break;
        }
        match token.token_type() {
            TokenType::Operator => {
                let operator = Operator::from_token(token)?;
                let Some(last) = siblings.last_mut() else {
                    return Err(FormulaError::Format(format!(
                        "operator '{}' without left operand",
                        token.value()
                    )));
                };
                if last.operator.is_some() {
                    return Err(FormulaError::Format(format!(
                        "consecutive operator '{}'",
                        token.value()
                    )));
                }
                last.operator = Some(operator);
                *pos += 1;
            }
            TokenType::Negator => {
                pending_negate = !pending_negate;
                *pos += 1;
            }
            TokenType::Percent => {
                let Some(last) = siblings.last_mut() else {
                    return Err(FormulaError::Format("percent without operand".to_string()));
                };
                last.percent += 1;
                *pos += 1;
            }
            TokenType::OpeningParenthesis => {
                *pos += 1;
                let children =
                    build_siblings(tokens, pos, &[TokenType::ClosingParenthesis])?;
                expect(tokens, pos, TokenType::ClosingParenthesis)?;
                push(
                    &mut siblings,
                    Expression::new(ExpressionKind::Group(children)),
                    &mut pending_negate,
                );
            }
            TokenType::Function => {
                let name = token.value().to_string();
                *pos += 1;
                let args = build_function_arguments(tokens, pos)?;
                push(
                    &mut siblings,
                    Expression::new(ExpressionKind::Function { name, args }),
                    &mut pending_negate,
                );
            }
            TokenType::OpeningEnumerable => {
                *pos += 1;
                let items = build_enumerable_items(tokens, pos)?;
                push(
                    &mut siblings,
                    Expression::new(ExpressionKind::Enumerable(items)),
                    &mut pending_negate,
                );
            }
            TokenType::String => {
                *pos += 1;
                let mut content = String::new();
                if let Some(t) = tokens.get(*pos) {
                    if t.is(TokenType::StringContent) {
                        content = t.value().to_string();
                        *pos += 1;
                    }
                }
                expect(tokens, pos, TokenType::String)?;
                push(
                    &mut siblings,
                    Expression::new(ExpressionKind::String(content)),
                    &mut pending_negate,
                );
            }
            _ => {
                let leaf = ExpressionFactory::create(token)?;
                *pos += 1;
                push(&mut siblings, leaf, &mut pending_negate);
            }
        }
    }

    if pending_negate {
        return Err(FormulaError::Format("dangling negation".to_string()));
    }
    Ok(siblings)
}

fn push(siblings: &mut Vec<Expression>, mut expression: Expression, pending_negate: &mut bool) {
    if *pending_negate {
        expression.negate();
        *pending_negate = false;
    }
    siblings.push(expression);
}

fn expect(tokens: &[Token], pos: &mut usize, token_type: TokenType) -> FormulaResult<()> {
    match tokens.get(*pos) {
        Some(t) if t.is(token_type) => {
            *pos += 1;
            Ok(())
        }
        _ => Err(FormulaError::Format(format!("expected {token_type:?}"))),
    }
}

/// Parse `( arg [,|;] arg ... )` after a function name. Each argument is
/// wrapped in a `FunctionArgument` node; an empty slot yields an `Empty`
/// child so positional semantics survive.
fn build_function_arguments(tokens: &[Token], pos: &mut usize) -> FormulaResult<Vec<Expression>> {
    expect(tokens, pos, TokenType::OpeningParenthesis)?;
    let stop = [
        TokenType::Comma,
        TokenType::SemiColon,
        TokenType::ClosingParenthesis,
    ];
    let mut args = Vec::new();
    let mut saw_separator = false;
    loop {
        let children = build_siblings(tokens, pos, &stop)?;
        match tokens.get(*pos).map(|t| t.token_type()) {
            Some(TokenType::Comma) | Some(TokenType::SemiColon) => {
                *pos += 1;
                saw_separator = true;
                args.push(make_argument(children));
            }
            Some(TokenType::ClosingParenthesis) => {
                *pos += 1;
                if !children.is_empty() || saw_separator {
                    args.push(make_argument(children));
                }
                return Ok(args);
            }
            _ => {
                return Err(FormulaError::Format(
                    "unterminated function call".to_string(),
                ))
            }
        }
    }
}

fn make_argument(children: Vec<Expression>) -> Expression {
    let children = if children.is_empty() {
        vec![Expression::new(ExpressionKind::Empty)]
    } else {
        children
    };
    Expression::new(ExpressionKind::FunctionArgument(children))
}

/// Parse the items of `{...}`. Commas and semicolons both separate items;
/// the engine flattens array literals.
fn build_enumerable_items(tokens: &[Token], pos: &mut usize) -> FormulaResult<Vec<Expression>> {
    let stop = [
        TokenType::Comma,
        TokenType::SemiColon,
        TokenType::ClosingEnumerable,
    ];
    let mut items = Vec::new();
    let mut saw_separator = false;
    loop {
        let children = build_siblings(tokens, pos, &stop)?;
        match tokens.get(*pos).map(|t| t.token_type()) {
            Some(TokenType::Comma) | Some(TokenType::SemiColon) => {
                *pos += 1;
                saw_separator = true;
                items.push(make_item(children));
            }
            Some(TokenType::ClosingEnumerable) => {
                *pos += 1;
                if !children.is_empty() || saw_separator {
                    items.push(make_item(children));
                }
                return Ok(items);
            }
            _ => return Err(FormulaError::Format("unterminated array literal".to_string())),
        }
    }
}

fn make_item(mut children: Vec<Expression>) -> Expression {
    match children.len() {
        0 => Expression::new(ExpressionKind::Empty),
        1 => children.remove(0),
        _ => Expression::new(ExpressionKind::Group(children)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use pretty_assertions::assert_eq;

    fn build(formula: &str) -> ExpressionGraph {
        ExpressionGraphBuilder::build(&Tokenizer::tokenize(formula)).unwrap()
    }

    #[test]
    fn siblings_carry_their_operators() {
        let graph = build("2*2+3*3");
        assert_eq!(graph.expressions.len(), 4);
        assert_eq!(graph.expressions[0].operator, Some(Operator::Multiply));
        assert_eq!(graph.expressions[1].operator, Some(Operator::Add));
        assert_eq!(graph.expressions[2].operator, Some(Operator::Multiply));
        assert_eq!(graph.expressions[3].operator, None);
    }

    #[test]
    fn parentheses_become_groups() {
        let graph = build("(2+3)*2");
        assert_eq!(graph.expressions.len(), 2);
        match &graph.expressions[0].kind {
            ExpressionKind::Group(children) => assert_eq!(children.len(), 2),
            other => panic!("expected group, got {other:?}"),
        }
        assert_eq!(graph.expressions[0].operator, Some(Operator::Multiply));
    }

    #[test]
    fn function_arguments_are_wrapped() {
        let graph = build("IF(A1>0,1,2)");
        let ExpressionKind::Function { name, args } = &graph.expressions[0].kind else {
            panic!("expected function");
        };
        assert_eq!(name, "IF");
        assert_eq!(args.len(), 3);
        for arg in args {
            assert!(matches!(arg.kind, ExpressionKind::FunctionArgument(_)));
        }
    }

    #[test]
    fn empty_argument_slot_yields_empty_child() {
        let graph = build("IF(TRUE,,2)");
        let ExpressionKind::Function { args, .. } = &graph.expressions[0].kind else {
            panic!("expected function");
        };
        assert_eq!(args.len(), 3);
        let ExpressionKind::FunctionArgument(children) = &args[1].kind else {
            panic!("expected argument");
        };
        assert_eq!(children[0].kind, ExpressionKind::Empty);
    }

    #[test]
    fn zero_argument_call_has_no_arguments() {
        let graph = build("RAND()");
        let ExpressionKind::Function { args, .. } = &graph.expressions[0].kind else {
            panic!("expected function");
        };
        assert!(args.is_empty());
    }

    #[test]
    fn nested_functions() {
        let graph = build("SUM(1,ROUND(2.5,0))");
        let ExpressionKind::Function { args, .. } = &graph.expressions[0].kind else {
            panic!("expected function");
        };
        let ExpressionKind::FunctionArgument(children) = &args[1].kind else {
            panic!("expected argument");
        };
        assert!(matches!(children[0].kind, ExpressionKind::Function { .. }));
    }

    #[test]
    fn negation_folds_into_numeric_literals() {
        let graph = build("-2");
        assert_eq!(graph.expressions[0].kind, ExpressionKind::Integer(-2.0));
        assert!(!graph.expressions[0].negated);
    }

    #[test]
    fn negation_marks_non_literals() {
        let graph = build("-A1");
        assert!(graph.expressions[0].negated);
        assert!(matches!(
            graph.expressions[0].kind,
            ExpressionKind::CellAddress(_)
        ));
    }

    #[test]
    fn percent_counts_stack() {
        let graph = build("50%%");
        assert_eq!(graph.expressions[0].percent, 2);
    }

    #[test]
    fn array_literal_items_are_flattened() {
        let graph = build("{1,2;3,4}");
        let ExpressionKind::Enumerable(items) = &graph.expressions[0].kind else {
            panic!("expected enumerable");
        };
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].kind, ExpressionKind::Integer(1.0));
    }

    #[test]
    fn string_tokens_become_one_leaf() {
        let graph = build("\"1 + 2\"");
        assert_eq!(
            graph.expressions[0].kind,
            ExpressionKind::String("1 + 2".to_string())
        );
    }

    #[test]
    fn leading_binary_operator_is_rejected() {
        let result = ExpressionGraphBuilder::build(&Tokenizer::tokenize("*3"));
        assert!(matches!(result, Err(FormulaError::Format(_))));
    }
}
