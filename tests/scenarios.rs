//! Integration tests covering the concrete source/dict/result scenarios and
//! the boolean short-circuit and operator-arity testable properties.

use std::cell::RefCell;
use std::collections::HashMap;

use pbg::{evaluate, parse, Field};

fn dict_from(pairs: &[(&str, Field)]) -> HashMap<Vec<u8>, Field> {
    pairs
        .iter()
        .map(|(name, field)| (name.as_bytes().to_vec(), field.clone()))
        .collect()
}

fn eval_with(source: &str, dict: &HashMap<Vec<u8>, Field>) -> Result<bool, pbg::PbgError> {
    let mut expr = parse(source).unwrap();
    evaluate(&mut expr, |name| {
        dict.get(name).cloned().unwrap_or_else(Field::null)
    })
}

#[test]
fn scenario_01_bare_true() {
    assert!(eval_with("TRUE", &HashMap::new()).unwrap());
}

#[test]
fn scenario_02_and_with_a_false() {
    assert!(!eval_with("(& TRUE TRUE TRUE TRUE FALSE)", &HashMap::new()).unwrap());
}

#[test]
fn scenario_03_eq_all_equal() {
    assert!(eval_with("(= 10 10 10 10 10)", &HashMap::new()).unwrap());
}

#[test]
fn scenario_04_eq_one_differs() {
    assert!(!eval_with("(= 10 10 10 9 10)", &HashMap::new()).unwrap());
}

#[test]
fn scenario_05_nested_and_exst() {
    let dict = dict_from(&[
        ("a", Field::number(5.0)),
        ("b", Field::number(5.0)),
        ("c", Field::number(6.0)),
    ]);
    // `d` is absent, so `(? [d])` is FALSE, and AND short-circuits to FALSE.
    assert!(!eval_with("(& (= [a] [b]) (? [d]))", &dict).unwrap());
}

#[test]
fn scenario_06_date_ordering() {
    assert!(eval_with("(< 2018-10-11 2018-10-12)", &HashMap::new()).unwrap());
}

#[test]
fn scenario_07_type_check_over_operators() {
    let dict = dict_from(&[("a", Field::number(5.0))]);
    assert!(eval_with(
        "(@ BOOL (! FALSE) (? [a]) (& FALSE TRUE))",
        &dict
    )
    .unwrap());
}

#[test]
fn scenario_08_ordering_type_mismatch_is_an_error() {
    assert!(eval_with("(>= 'hi' 2)", &HashMap::new()).is_err());
}

#[test]
fn scenario_09_unclosed_string_is_a_syntax_error() {
    let err = parse("(= 'hi' 'hi)").unwrap_err();
    assert!(matches!(
        err.kind,
        pbg::PbgErrorKind::Syntax { ref message, .. } if message == "Unclosed string"
    ));
}

#[test]
fn scenario_10_whitespace_stripped_and() {
    // Only whitespace that isn't required to separate two tokens can be
    // dropped; `(= 10 10)` still needs the space between `=` and `10`.
    assert!(eval_with("(&(= 10 10)(= 20 20))", &HashMap::new()).unwrap());
}

#[test]
fn and_short_circuit_skips_later_variable_resolution() {
    let resolved = RefCell::new(Vec::new());
    let mut expr = parse("(& FALSE [never])").unwrap();
    let result = evaluate(&mut expr, |name| {
        resolved.borrow_mut().push(name.to_vec());
        Field::boolean(true)
    });
    assert!(!result.unwrap());
    assert!(
        !resolved.borrow().is_empty(),
        "dict is consulted once per VAR before descent, regardless of short-circuiting"
    );
}

#[test]
fn or_short_circuits_on_first_true_without_erroring_on_later_children() {
    // The third child only raises an OpArgType error if actually evaluated;
    // short-circuiting on the second child's TRUE must prevent that.
    let mut expr = parse("(| FALSE TRUE (>= 'hi' 2))").unwrap();
    let result = evaluate(&mut expr, |_| Field::null());
    assert!(result.unwrap());
}

#[test]
fn arity_table_is_enforced_at_parse_time() {
    assert!(parse("(! TRUE TRUE)").is_err());
    assert!(parse("(& TRUE)").is_err());
    assert!(parse("(| TRUE)").is_err());
    assert!(parse("(= TRUE)").is_err());
    assert!(parse("(< TRUE TRUE TRUE)").is_err());
    assert!(parse("(!= TRUE)").is_err());
    assert!(parse("(? )").is_err());
    assert!(parse("(@ NUMBER)").is_err());

    assert!(parse("(! TRUE)").is_ok());
    assert!(parse("(& TRUE TRUE)").is_ok());
    assert!(parse("(< 1 2)").is_ok());
    assert!(parse("(? [a])").is_ok());
    assert!(parse("(@ NUMBER 1)").is_ok());
}
