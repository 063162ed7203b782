//! End-to-end tests for formula parsing, compilation and calculation

use gridcalc_core::{CellValue, ExcelError};
use gridcalc_formula::lexer::{TokenType, Tokenizer};
use gridcalc_formula::{
    CellKey, Calculator, FormulaParser, FunctionRepository, InMemoryProvider, ParsingContext,
    Value,
};

fn eval(formula: &str) -> Value {
    let provider = InMemoryProvider::new();
    eval_with(formula, &provider)
}

fn eval_with(formula: &str, provider: &InMemoryProvider) -> Value {
    let repository = FunctionRepository::with_builtins();
    let mut ctx = ParsingContext::new(provider, &repository);
    FormulaParser::parse(formula, &mut ctx).unwrap().result
}

/// Test operator precedence without parentheses
#[test]
fn test_multiplication_before_addition() {
    assert_eq!(eval("=2*2+2*2"), Value::Number(8.0));
    assert_eq!(eval("=2+2*2"), Value::Number(6.0));
}

/// Test parenthesized groups overriding precedence
#[test]
fn test_grouping() {
    assert_eq!(eval("=(2+3)*2"), Value::Number(10.0));
    assert_eq!(eval("=(2+2)*(2+2)"), Value::Number(16.0));
}

/// Test the tokenizer's duplicate sign collapsing
#[test]
fn test_duplicate_operator_collapsing() {
    let tokens = Tokenizer::tokenize("++1--2++-3+-1----3-+2");
    assert_eq!(tokens.len(), 11);
    for (i, sign) in [(1, "+"), (3, "-"), (5, "-"), (7, "+"), (9, "-")] {
        assert!(tokens[i].is(TokenType::Operator));
        assert_eq!(tokens[i].value(), sign);
    }
    // 1+2-3-1+3-2
    assert_eq!(eval("=++1--2++-3+-1----3-+2"), Value::Number(0.0));
}

/// Test IF evaluating only the branch it takes
#[test]
fn test_if_short_circuit() {
    assert_eq!(eval("=IF(3>2,\"Yes\",\"No\")"), Value::String("Yes".into()));
    // the untaken branch would divide by zero
    assert_eq!(eval("=IF(3>2,1,1/0)"), Value::Number(1.0));
    assert_eq!(eval("=IF(2>3,NOSUCHFN(),5)"), Value::Number(5.0));
}

/// Test error propagation through operators, first error winning
#[test]
fn test_error_propagation() {
    assert_eq!(eval("=1/0+1"), Value::Error(ExcelError::Div0));
    assert_eq!(eval("=#NAME?+#DIV/0!"), Value::Error(ExcelError::Name));
    assert_eq!(eval("=\"a\"+1"), Value::Error(ExcelError::Value));
}

/// Test numeric strings behaving as numbers in arithmetic
#[test]
fn test_numeric_string_coercion() {
    assert_eq!(eval("=\"2\"+3"), Value::Number(5.0));
    assert_eq!(eval("=\"1,017.33\"+0"), Value::Number(1017.33));
    assert_eq!(eval("=\"2.5e2\"*2"), Value::Number(500.0));
}

/// Test date strings coercing to OLE automation serials
#[test]
fn test_date_string_coercion() {
    // 1900-01-01 is serial 2 from the 1899-12-30 epoch
    assert_eq!(eval("=\"1900-01-01\"+0"), Value::Number(2.0));
    assert_eq!(eval("=\"06:00\"*2"), Value::Number(0.5));
}

/// Test ROUND's half-away-from-zero behavior, negative digits included
#[test]
fn test_round() {
    assert_eq!(eval("=ROUND(123.45,0)"), Value::Number(123.0));
    assert_eq!(eval("=ROUND(123.65,0)"), Value::Number(124.0));
    assert_eq!(eval("=ROUND(125,-1)"), Value::Number(130.0));
    assert_eq!(eval("=ROUND(-125,-1)"), Value::Number(-130.0));
}

/// Test AVERAGEA's origin-sensitive counting rules
#[test]
fn test_averagea() {
    // literal strings must parse
    assert_eq!(eval("=AVERAGEA(1,\"3\")"), Value::Number(2.0));
    assert_eq!(eval("=AVERAGEA(1,\"abc\")"), Value::Error(ExcelError::Value));
    // array text counts as zero, array booleans are excluded
    assert_eq!(eval("=AVERAGEA({4,\"x\",TRUE})"), Value::Number(2.0));

    // cell text counts as zero, cell booleans count as 0/1
    let mut provider = InMemoryProvider::new();
    provider.set_cell_value(0, 0, 0, 3.0);
    provider.set_cell_value(0, 1, 0, "text");
    provider.set_cell_value(0, 2, 0, true);
    assert_eq!(
        eval_with("=AVERAGEA(A1:A3)", &provider),
        Value::Number(4.0 / 3.0)
    );
}

/// Test references, ranges and aggregate functions against a grid
#[test]
fn test_references_and_aggregates() {
    let mut provider = InMemoryProvider::new();
    provider.set_cell_value(0, 0, 0, 1.0);
    provider.set_cell_value(0, 1, 0, 2.0);
    provider.set_cell_value(0, 2, 0, 3.0);
    assert_eq!(eval_with("=SUM(A1:A3)", &provider), Value::Number(6.0));
    assert_eq!(eval_with("=MAX(A1:A3)*10", &provider), Value::Number(30.0));
    assert_eq!(eval_with("=A2^2", &provider), Value::Number(4.0));
}

/// Test worksheet-qualified references, quoted names included
#[test]
fn test_cross_sheet_references() {
    let mut provider = InMemoryProvider::new();
    let data = provider.add_sheet("My Data");
    provider.set_cell_value(data, 0, 0, 7.0);
    assert_eq!(eval_with("='My Data'!A1*2", &provider), Value::Number(14.0));
    assert_eq!(
        eval_with("=Missing!A1", &provider),
        Value::Error(ExcelError::Ref)
    );
}

/// Test the ERROR.TYPE and IS* family end to end
#[test]
fn test_error_inspection() {
    assert_eq!(eval("=ERROR.TYPE(#NULL!)"), Value::Number(1.0));
    assert_eq!(eval("=ERROR.TYPE(1/0)"), Value::Number(2.0));
    assert_eq!(eval("=ERROR.TYPE(#N/A)"), Value::Number(7.0));
    assert_eq!(eval("=ISNA(NA())"), Value::Boolean(true));
    assert_eq!(eval("=ISERR(NA())"), Value::Boolean(false));
    assert_eq!(eval("=IFERROR(1/0,\"fallback\")"), Value::String("fallback".into()));
}

/// Test dependency-ordered calculation across a chain of formulas
#[test]
fn test_calculation_ordering() {
    let mut provider = InMemoryProvider::new();
    provider.set_cell_value(0, 0, 3, 2.0); // D1 = 2
    let repository = FunctionRepository::with_builtins();
    let mut calc = Calculator::new(&provider, &repository);
    // registered out of dependency order on purpose
    calc.add_formula(CellKey::new(0, 0, 0), "=B1+1").unwrap(); // A1
    calc.add_formula(CellKey::new(0, 0, 1), "=C1*2").unwrap(); // B1
    calc.add_formula(CellKey::new(0, 0, 2), "=D1+3").unwrap(); // C1
    calc.calculate().unwrap();

    assert_eq!(
        calc.value_of(&CellKey::new(0, 0, 2)),
        Some(&CellValue::Number(5.0))
    );
    assert_eq!(
        calc.value_of(&CellKey::new(0, 0, 1)),
        Some(&CellValue::Number(10.0))
    );
    assert_eq!(
        calc.value_of(&CellKey::new(0, 0, 0)),
        Some(&CellValue::Number(11.0))
    );
}

/// Test that circular references resolve to #REF! and never hang
#[test]
fn test_circular_references_terminate() {
    let provider = InMemoryProvider::new();
    let repository = FunctionRepository::with_builtins();
    let mut calc = Calculator::new(&provider, &repository);
    calc.add_formula(CellKey::new(0, 0, 0), "=B1+1").unwrap();
    calc.add_formula(CellKey::new(0, 0, 1), "=A1+1").unwrap();
    calc.add_formula(CellKey::new(0, 0, 2), "=40+2").unwrap();
    calc.calculate().unwrap();

    assert_eq!(
        calc.value_of(&CellKey::new(0, 0, 0)),
        Some(&CellValue::Error(ExcelError::Ref))
    );
    assert_eq!(
        calc.value_of(&CellKey::new(0, 0, 1)),
        Some(&CellValue::Error(ExcelError::Ref))
    );
    assert_eq!(
        calc.value_of(&CellKey::new(0, 0, 2)),
        Some(&CellValue::Number(42.0))
    );
}

/// Test VLOOKUP against an in-memory table
#[test]
fn test_vlookup() {
    let mut provider = InMemoryProvider::new();
    provider.set_cell_value(0, 0, 0, "apple");
    provider.set_cell_value(0, 0, 1, 10.0);
    provider.set_cell_value(0, 1, 0, "pear");
    provider.set_cell_value(0, 1, 1, 20.0);
    assert_eq!(
        eval_with("=VLOOKUP(\"pear\",A1:B2,2)", &provider),
        Value::Number(20.0)
    );
    assert_eq!(
        eval_with("=VLOOKUP(\"plum\",A1:B2,2)", &provider),
        Value::Error(ExcelError::NA)
    );
}

/// Test defined names resolving through the provider
#[test]
fn test_defined_names() {
    use gridcalc_formula::provider::NameInfo;
    let mut provider = InMemoryProvider::new();
    provider.define_name("Rate", NameInfo::Value(CellValue::Number(0.25)));
    assert_eq!(eval_with("=Rate*4", &provider), Value::Number(1.0));
    assert_eq!(eval("=Unknown*4"), Value::Error(ExcelError::Name));
}

/// Test percent, negation and concatenation decorations
#[test]
fn test_unary_decorations() {
    assert_eq!(eval("=50%"), Value::Number(0.5));
    assert_eq!(eval("=-(2+3)"), Value::Number(-5.0));
    assert_eq!(eval("=\"n=\"&4*2"), Value::String("n=8".into()));
}
