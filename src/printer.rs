//! Minimal canonical-form serializer, just enough to make the round-trip
//! property testable: `parse(expr.to_canonical_string())` must rebuild a
//! structurally identical tree (spec §8).
//!
//! Deliberately bare-bones — no formatting options, no alternate
//! renderings — matching spec.md's framing of the pretty-printer as a thin,
//! uninteresting external collaborator.

use std::fmt::Write as _;

use crate::expression::{Expression, NodeId};
use crate::field::{Field, FieldType};

impl Expression {
    /// Renders the tree back to the parenthesized-prefix grammar (spec §6).
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        write_node(self, self.root(), &mut out);
        out
    }
}

fn write_node(expr: &Expression, node: NodeId, out: &mut String) {
    let field = expr.get(node);
    if field.field_type.is_op() {
        out.push('(');
        out.push_str(operator_token(field.field_type));
        for &child in field.children() {
            out.push(' ');
            write_node(expr, child, out);
        }
        out.push(')');
    } else {
        write_literal(field, out);
    }
}

fn operator_token(ty: FieldType) -> &'static str {
    match ty {
        FieldType::Not => "!",
        FieldType::And => "&",
        FieldType::Or => "|",
        FieldType::Eq => "=",
        FieldType::Neq => "!=",
        FieldType::Lt => "<",
        FieldType::Gt => ">",
        FieldType::Lte => "<=",
        FieldType::Gte => ">=",
        FieldType::Exst => "?",
        FieldType::Type => "@",
        other => unreachable!("operator_token called on non-operator {other:?}"),
    }
}

fn write_literal(field: &Field, out: &mut String) {
    match field.field_type {
        FieldType::True => out.push_str("TRUE"),
        FieldType::False => out.push_str("FALSE"),
        FieldType::TpDate => out.push_str("DATE"),
        FieldType::TpBool => out.push_str("BOOL"),
        FieldType::TpNumber => out.push_str("NUMBER"),
        FieldType::TpString => out.push_str("STRING"),
        FieldType::Number => {
            let n = field.as_number().expect("NUMBER field carries a number payload");
            write!(out, "{}", format_number(n)).expect("String writers don't fail");
        }
        FieldType::Date => {
            let d = field.as_date().expect("DATE field carries a date payload");
            write!(out, "{:04}-{:02}-{:02}", d.year, d.month, d.day).expect("String writers don't fail");
        }
        FieldType::String => {
            out.push('\'');
            push_raw(out, field.as_bytes().unwrap_or(&[]));
            out.push('\'');
        }
        FieldType::Var => {
            out.push('[');
            push_raw(out, field.as_bytes().unwrap_or(&[]));
            out.push(']');
        }
        other => unreachable!("write_literal called on non-literal {other:?}"),
    }
}

/// Formats a finite `f64` the way the classifier's `NUMBER` grammar
/// accepts it back: no trailing `.0` noise for whole numbers, since the
/// grammar's fractional part is optional.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// `STRING`/`VAR` payloads already hold the still-escaped bytes exactly as
/// they appeared between the source delimiters (see [`crate::field`]), so
/// printing them back out is a verbatim copy, not a re-escape.
fn push_raw(out: &mut String, bytes: &[u8]) {
    for &b in bytes {
        out.push(b as char);
    }
}
