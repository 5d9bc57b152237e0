mod common;

use common::{run, run_lines};
use lilt::Value;

#[test]
fn test_arithmetic() {
    assert_eq!(run("1 plus 2"), Value::Number(3.0));
    assert_eq!(run("10 minus 4"), Value::Number(6.0));
    assert_eq!(run("6 times 7"), Value::Number(42.0));
    assert_eq!(run("9 div 3"), Value::Number(3.0));
}

#[test]
fn test_precedence() {
    assert_eq!(run("2 plus 3 times 4"), Value::Number(14.0));
    assert_eq!(run("2 times 3 plus 4"), Value::Number(10.0));
    assert_eq!(run("1 plus 2 over 2"), Value::Bool(true));
    assert_eq!(run("1 or 0 and 0"), Value::Bool(true));
}

#[test]
fn test_left_associativity() {
    assert_eq!(run("10 minus 4 minus 3"), Value::Number(3.0));
    assert_eq!(run("100 div 10 div 2"), Value::Number(5.0));
}

#[test]
fn test_comparisons() {
    assert_eq!(run("1 over 0"), Value::Bool(true));
    assert_eq!(run("0 over 1"), Value::Bool(false));
    assert_eq!(run("0 under 1"), Value::Bool(true));
    assert_eq!(run("1 under 0"), Value::Bool(false));
}

#[test]
fn test_equality_tolerance() {
    assert_eq!(run("1 same 1"), Value::Bool(true));
    assert_eq!(run("1 same 2"), Value::Bool(false));
    assert_eq!(run("1.00005 same 1"), Value::Bool(true));
    assert_eq!(run("1.001 same 1"), Value::Bool(false));
}

#[test]
fn test_equality_on_texts_is_exact() {
    assert_eq!(run(r#""a" same "a""#), Value::Bool(true));
    assert_eq!(run(r#""a" same "b""#), Value::Bool(false));
}

#[test]
fn test_not_is_loose_inequality() {
    assert_eq!(run("1 not 2"), Value::Bool(true));
    assert_eq!(run("1 not 1"), Value::Bool(false));
    assert_eq!(run(r#""a" not "b""#), Value::Bool(true));
}

#[test]
fn test_logic_with_coercion() {
    assert_eq!(run("1 and 1"), Value::Bool(true));
    assert_eq!(run("1 and 0"), Value::Bool(false));
    assert_eq!(run("0 or 1"), Value::Bool(true));
    assert_eq!(run(r#""" or 0"#), Value::Bool(false));
    assert_eq!(run(r#""x" and 1"#), Value::Bool(true));
}

#[test]
fn test_division_by_zero_yields_zero() {
    assert_eq!(run("10 div 0"), Value::Number(0.0));
    assert_eq!(run_lines("say 10 div 0"), ["0"]);
    assert_eq!(run(r#"10 div "zero""#), Value::Number(0.0));
}

#[test]
fn test_text_operands_coerce_through_number_words() {
    assert_eq!(run(r#""twelve" plus 1"#), Value::Number(13.0));
    assert_eq!(run(r#""three" times "four""#), Value::Number(12.0));
    assert_eq!(run(r#""not-a-number" plus 1"#), Value::Number(1.0));
}

#[test]
fn test_bool_operands_coerce_to_numbers() {
    assert_eq!(run("true plus true"), Value::Number(2.0));
    assert_eq!(run("false plus 5"), Value::Number(5.0));
}

#[test]
fn test_void_operand_counts_as_zero() {
    assert_eq!(run("nothing plus 3"), Value::Number(3.0));
}
