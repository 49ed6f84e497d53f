//! Tree reduction to a truth value against a caller-supplied variable
//! dictionary (spec §4.3).

use std::cmp::Ordering;

use tracing::{trace, warn};

use crate::errors::{pbg_err, PbgError, PbgErrorKind};
use crate::expression::{Expression, NodeId};
use crate::field::{Field, FieldType, Payload};

/// Evaluates `expr` to `TRUE`/`FALSE`, resolving every `VAR` field through
/// `dict` first.
///
/// `dict` is called exactly once per variable field, in arena order, before
/// any tree descent begins (spec §4.3's "resolve, then recurse" ordering).
/// It should return [`Field::null`] for names it doesn't recognize.
///
/// The variables arena is swapped out for the resolved values for the
/// duration of evaluation and always restored before returning, including
/// on error — two evaluations of the same `Expression` must not run
/// concurrently, since this swap is a genuine (if temporary) mutation.
pub fn evaluate<F>(expr: &mut Expression, mut dict: F) -> Result<bool, PbgError>
where
    F: FnMut(&[u8]) -> Field,
{
    trace!(variables = expr.variable_count(), "resolving variables");
    let resolved: Vec<Field> = expr
        .variables()
        .map(|(_, field)| {
            let name = field
                .as_bytes()
                .expect("VAR fields always carry a name payload");
            let value = dict(name);
            if value.field_type == FieldType::Null {
                warn!(
                    name = %String::from_utf8_lossy(name),
                    "variable resolved to NULL"
                );
            }
            value
        })
        .collect();

    let original = expr.swap_variables(resolved);
    trace!("evaluating expression tree");
    let result = eval_node(expr, expr.root());
    expr.swap_variables(original);
    trace!(result = ?result.as_ref().ok(), "evaluation finished");
    result
}

fn eval_node(expr: &Expression, node: NodeId) -> Result<bool, PbgError> {
    let field = expr.get(node);
    match field.field_type {
        FieldType::True => Ok(true),
        FieldType::False => Ok(false),
        FieldType::Not => Ok(!eval_node(expr, field.children()[0])?),
        FieldType::And => eval_and(expr, field.children()),
        FieldType::Or => eval_or(expr, field.children()),
        FieldType::Exst => eval_exst(expr, field.children()),
        FieldType::Eq => eval_eq(expr, field.children()),
        FieldType::Neq => eval_eq(expr, field.children()).map(|equal| !equal),
        FieldType::Lt | FieldType::Gt | FieldType::Lte | FieldType::Gte => {
            compare(expr, field.field_type, field.children())
        }
        FieldType::Type => eval_type(expr, field.children()),
        other => Err(op_arg_type_err(format!(
            "a field of type {other:?} does not evaluate to a boolean"
        ))),
    }
}

/// Short-circuits on the first `FALSE`; an error encountered before that
/// point stops evaluation too, via `?` (spec §4.3).
fn eval_and(expr: &Expression, children: &[NodeId]) -> Result<bool, PbgError> {
    for &child in children {
        if !eval_node(expr, child)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Symmetric with [`eval_and`]: short-circuits on the first `TRUE`.
fn eval_or(expr: &Expression, children: &[NodeId]) -> Result<bool, PbgError> {
    for &child in children {
        if eval_node(expr, child)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn eval_exst(expr: &Expression, children: &[NodeId]) -> Result<bool, PbgError> {
    Ok(children
        .iter()
        .all(|&child| expr.get(child).field_type != FieldType::Null))
}

/// Polymorphic equality: boolean-typed operands compare by truth value,
/// everything else by type tag and byte-identical payload.
fn eval_eq(expr: &Expression, children: &[NodeId]) -> Result<bool, PbgError> {
    if children
        .iter()
        .any(|&child| expr.get(child).field_type == FieldType::Null)
    {
        return Err(op_arg_type_err("= operand resolved to an unknown variable"));
    }

    let first = expr.get(children[0]);
    if first.field_type.is_bool() {
        let mut reference: Option<bool> = None;
        for &child in children {
            let value = eval_node(expr, child)?;
            match reference {
                None => reference = Some(value),
                Some(expected) if expected != value => return Ok(false),
                Some(_) => {}
            }
        }
        return Ok(true);
    }

    let first_type = first.field_type;
    let first_bytes = payload_bytes(first);
    for &child in &children[1..] {
        let other = expr.get(child);
        if other.field_type != first_type || payload_bytes(other) != first_bytes {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval_type(expr: &Expression, children: &[NodeId]) -> Result<bool, PbgError> {
    let tag = expr.get(children[0]).field_type;
    if !tag.is_type_tag() {
        return Err(op_arg_type_err("@ requires a type tag as its first operand"));
    }
    for &child in &children[1..] {
        let candidate = expr.get(child).field_type;
        let matches = match tag {
            FieldType::TpBool => candidate.is_bool(),
            FieldType::TpDate => candidate == FieldType::Date,
            FieldType::TpNumber => candidate == FieldType::Number,
            FieldType::TpString => candidate == FieldType::String,
            _ => unreachable!("is_type_tag guarantees one of the four tags"),
        };
        if !matches {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Order comparison for `<`, `>`, `<=`, `>=`. Mixed or unsupported operand
/// types (including an unresolved `NULL`) are an `OpArgType` error rather
/// than a truth value.
fn compare(expr: &Expression, op: FieldType, children: &[NodeId]) -> Result<bool, PbgError> {
    let a = expr.get(children[0]);
    let b = expr.get(children[1]);
    let ordering = match (a.field_type, b.field_type) {
        (FieldType::Number, FieldType::Number) => a
            .as_number()
            .unwrap()
            .partial_cmp(&b.as_number().unwrap())
            .ok_or_else(|| op_arg_type_err("NUMBER comparison against NaN is not ordered"))?,
        (FieldType::Date, FieldType::Date) => a.as_date().unwrap().cmp(&b.as_date().unwrap()),
        (FieldType::String, FieldType::String) => {
            compare_prefix(a.as_bytes().unwrap(), b.as_bytes().unwrap())
        }
        (ta, tb) if ta.is_bool() && tb.is_bool() => {
            let av = eval_node(expr, children[0])?;
            let bv = eval_node(expr, children[1])?;
            av.cmp(&bv)
        }
        (ta, tb) => {
            return Err(op_arg_type_err(format!(
                "{op:?} is not defined between {ta:?} and {tb:?}"
            )))
        }
    };
    Ok(match op {
        FieldType::Lt => ordering == Ordering::Less,
        FieldType::Gt => ordering == Ordering::Greater,
        FieldType::Lte => ordering != Ordering::Greater,
        FieldType::Gte => ordering != Ordering::Less,
        _ => unreachable!("compare is only dispatched for ordering operators"),
    })
}

/// Byte-wise `memcmp` over `min(len_a, len_b)` bytes: a shared prefix with
/// no further bytes on either side compares equal, it is not disambiguated
/// by the longer string (spec §4.3's documented quirk).
fn compare_prefix(a: &[u8], b: &[u8]) -> Ordering {
    let n = a.len().min(b.len());
    a[..n].cmp(&b[..n])
}

fn payload_bytes(field: &Field) -> Vec<u8> {
    match &field.payload {
        Payload::Number(n) => n.to_le_bytes().to_vec(),
        Payload::Date(d) => {
            let mut bytes = d.year.to_le_bytes().to_vec();
            bytes.push(d.month);
            bytes.push(d.day);
            bytes
        }
        Payload::Bytes(b) => b.clone(),
        Payload::None | Payload::Children(_) => Vec::new(),
    }
}

fn op_arg_type_err(message: impl Into<String>) -> PbgError {
    pbg_err!(PbgErrorKind::OpArgType(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn eval_str(src: &str) -> Result<bool, PbgError> {
        let mut expr = parse(src).unwrap();
        evaluate(&mut expr, |_name| Field::null())
    }

    #[test]
    fn bare_literals() {
        assert!(eval_str("TRUE").unwrap());
        assert!(!eval_str("FALSE").unwrap());
    }

    #[test]
    fn not_negates() {
        assert!(!eval_str("(! TRUE)").unwrap());
        assert!(eval_str("(! FALSE)").unwrap());
    }

    #[test]
    fn and_short_circuits_on_false() {
        assert!(!eval_str("(& TRUE FALSE TRUE)").unwrap());
    }

    #[test]
    fn or_short_circuits_on_true() {
        assert!(eval_str("(| FALSE TRUE FALSE)").unwrap());
    }

    #[test]
    fn eq_numbers_by_bit_pattern() {
        assert!(eval_str("(= 10 10 10)").unwrap());
        assert!(!eval_str("(= 10 11)").unwrap());
    }

    #[test]
    fn eq_booleans_by_truth_value() {
        assert!(eval_str("(= TRUE (! FALSE))").unwrap());
        assert!(!eval_str("(= TRUE (! TRUE))").unwrap());
    }

    #[test]
    fn neq_mirrors_eq() {
        assert!(eval_str("(!= 10 11)").unwrap());
        assert!(!eval_str("(!= 10 10)").unwrap());
    }

    #[test]
    fn eq_mismatched_types_is_false_not_error() {
        assert!(!eval_str("(= 10 'ten')").unwrap());
    }

    #[test]
    fn ordering_numbers() {
        assert!(eval_str("(< 1 2)").unwrap());
        assert!(!eval_str("(> 1 2)").unwrap());
        assert!(eval_str("(<= 2 2)").unwrap());
        assert!(eval_str("(>= 2 2)").unwrap());
    }

    #[test]
    fn ordering_dates() {
        assert!(eval_str("(< 2018-01-01 2019-01-01)").unwrap());
    }

    #[test]
    fn ordering_strings_prefix_ties_are_equal() {
        assert!(!eval_str("(< 'ab' 'abc')").unwrap());
        assert!(eval_str("(<= 'ab' 'abc')").unwrap());
    }

    #[test]
    fn ordering_type_mismatch_errors() {
        assert!(eval_str("(< 10 'ten')").is_err());
    }

    #[test]
    fn type_tag_matching() {
        assert!(eval_str("(@ NUMBER 10 20)").unwrap());
        assert!(!eval_str("(@ NUMBER 10 'no')").unwrap());
        assert!(eval_str("(@ BOOL TRUE (! FALSE))").unwrap());
    }

    #[test]
    fn exst_checks_variable_resolution() {
        let mut expr = parse("(? [present] [missing])").unwrap();
        let result = evaluate(&mut expr, |name| {
            if name == b"present" {
                Field::boolean(true)
            } else {
                Field::null()
            }
        });
        assert!(!result.unwrap());
    }

    #[test]
    fn variable_dictionary_is_consulted() {
        let mut expr = parse("(= [x] 42)").unwrap();
        let result = evaluate(&mut expr, |_name| Field::number(42.0));
        assert!(result.unwrap());
    }

    #[test]
    fn eq_null_operand_is_an_error() {
        let mut expr = parse("(= [missing] 42)").unwrap();
        let result = evaluate(&mut expr, |_name| Field::null());
        assert!(result.is_err());
    }
}
