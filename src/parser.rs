//! Pass 3 of the parser (spec §4.2): consumes the scanner's output and
//! builds the [`Expression`].

use tracing::trace;

use crate::classifier::classify;
use crate::errors::{pbg_err, PbgError, PbgErrorKind};
use crate::expression::{Expression, NodeId};
use crate::field::{Field, FieldType};
use crate::scanner;

/// Parses `source` into a validated [`Expression`].
///
/// Whitespace (space, tab, newline) is permitted anywhere outside strings
/// and variable names. On any error the partially built tree is simply
/// dropped — ownership makes the source implementation's explicit
/// "release partial expression on error path" unnecessary.
pub fn parse(source: &str) -> Result<Expression, PbgError> {
    trace!(length = source.len(), "parsing expression");
    let src = source.as_bytes();
    let scan = scanner::scan(src)?;
    trace!(fields = scan.fields.len(), "scanned into fields");
    let expr = build_tree(src, scan)?;
    trace!("expression parsed successfully");
    Ok(expr)
}

struct StackFrame {
    node: NodeId,
}

fn build_tree(src: &[u8], scan: scanner::ScanOutput) -> Result<Expression, PbgError> {
    let scanner::ScanOutput {
        fields,
        closes,
        group_size_of,
        totals,
    } = scan;

    let mut expr = Expression::new();
    let mut stack: Vec<StackFrame> = Vec::new();
    let mut close_ptr = 0usize;
    let mut variable_fields_seen = 0usize;

    for (field_idx, span) in fields.iter().enumerate() {
        while close_ptr < closes.len() && span.start > closes[close_ptr] {
            stack.pop();
            close_ptr += 1;
        }

        let slice = &src[span.start..span.start + span.len];
        let ty = classify(slice);
        if ty == FieldType::Null {
            return Err(pbg_err!(PbgErrorKind::UnknownType {
                slice: String::from_utf8_lossy(slice).into_owned(),
                length: span.len,
            }));
        }

        if stack.is_empty() {
            // A field with no open parent is only legal as the root: either
            // the operator that opens the (sole) top-level group, or a bare
            // `TRUE`/`FALSE` with nothing else in the source. Pass 1's
            // "multiple expressions" check already guarantees this can only
            // happen at `field_idx == 0`.
            let is_bare_root = fields.len() == 1 && matches!(ty, FieldType::True | FieldType::False);
            if !ty.is_op() && !is_bare_root {
                return Err(syntax_err_at(src, "Field ordering not respected", span.start));
            }
            // A bare operator with no group to open (e.g. a lone `!` or `&`
            // with no surrounding parentheses) is never valid: an operator
            // only ever appears as the first field right after a `(`.
            if ty.is_op() && group_size_of[field_idx].is_none() {
                return Err(syntax_err_at(src, "Field ordering not respected", span.start));
            }
        }

        if ty.is_op() {
            let group_size = group_size_of[field_idx]
                .expect("pass 2 records a group size for every operator field");
            let arity = group_size - 1;
            check_arity(ty, arity)?;
            let node = expr.push_constant(Field::operator(ty, arity));
            if let Some(parent) = stack.last() {
                expr.get_mut(parent.node).children_mut().push(node);
            }
            stack.push(StackFrame { node });
        } else {
            if ty == FieldType::Var {
                variable_fields_seen += 1;
            }
            let field = build_literal(ty, slice)?;
            let node = if ty == FieldType::Var {
                expr.push_variable(field)
            } else {
                expr.push_constant(field)
            };
            if let Some(parent) = stack.last() {
                expr.get_mut(parent.node).children_mut().push(node);
            }
        };
    }

    while close_ptr < closes.len() {
        stack.pop();
        close_ptr += 1;
    }

    if fields.len() != totals.total_fields
        || variable_fields_seen != totals.variable_fields
        || closes.len() != totals.group_closings
        || !stack.is_empty()
    {
        return Err(pbg_err!(PbgErrorKind::State(
            "Not all fields were parsed".to_string()
        )));
    }

    Ok(expr)
}

fn syntax_err_at(src: &[u8], message: &str, index: usize) -> PbgError {
    pbg_err!(PbgErrorKind::Syntax {
        message: message.to_string(),
        source_str: String::from_utf8_lossy(src).into_owned(),
        index,
    })
}

fn check_arity(ty: FieldType, arity: usize) -> Result<(), PbgError> {
    let ok = match ty {
        FieldType::Not => arity == 1,
        FieldType::And | FieldType::Or | FieldType::Eq => arity >= 2,
        FieldType::Lt | FieldType::Gt | FieldType::Lte | FieldType::Gte | FieldType::Neq => {
            arity == 2
        }
        FieldType::Exst => arity >= 1,
        FieldType::Type => arity >= 2,
        _ => unreachable!("check_arity called on non-operator {ty:?}"),
    };
    if ok {
        Ok(())
    } else {
        Err(pbg_err!(PbgErrorKind::OpArity {
            op_type: ty,
            arity,
        }))
    }
}

fn build_literal(ty: FieldType, slice: &[u8]) -> Result<Field, PbgError> {
    match ty {
        FieldType::True => Ok(Field::boolean(true)),
        FieldType::False => Ok(Field::boolean(false)),
        FieldType::Number => {
            let text = std::str::from_utf8(slice).expect("classifier only accepts ASCII");
            let value: f64 = text.parse().map_err(|_| {
                pbg_err!(PbgErrorKind::State(format!(
                    "classifier accepted `{text}` as NUMBER but it did not parse"
                )))
            })?;
            Ok(Field::number(value))
        }
        FieldType::Date => {
            let year = digit(slice, 0) as u16 * 1000
                + digit(slice, 1) as u16 * 100
                + digit(slice, 2) as u16 * 10
                + digit(slice, 3) as u16;
            let month = digit(slice, 5) * 10 + digit(slice, 6);
            let day = digit(slice, 8) * 10 + digit(slice, 9);
            Ok(Field::date(year, month, day))
        }
        FieldType::String => Ok(Field::string(slice[1..slice.len() - 1].to_vec())),
        FieldType::Var => Ok(Field::var(slice[1..slice.len() - 1].to_vec())),
        FieldType::TpDate | FieldType::TpBool | FieldType::TpNumber | FieldType::TpString => {
            Ok(Field::type_tag(ty))
        }
        _ => unreachable!("build_literal called on non-literal {ty:?}"),
    }
}

fn digit(slice: &[u8], pos: usize) -> u8 {
    slice[pos] - b'0'
}
