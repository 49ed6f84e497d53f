//! Passes 1 and 2 of the parser (spec §4.2): walks the source once to
//! validate gross structure and count fields, then walks it again to
//! locate every field and closing parenthesis and to enforce the
//! "operator must be first in its group" ordering rule.
//!
//! Pass 3 (tree construction) lives in [`crate::parser`] and consumes this
//! module's output.

use tracing::trace;

use crate::classifier::classify;
use crate::errors::{pbg_err, PbgError, PbgErrorKind};

/// Byte offset and length of one field in the source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpan {
    pub start: usize,
    pub len: usize,
}

/// Totals gathered in pass 1, re-checked against pass 3's bookkeeping at
/// the end of parsing (spec §4.2 "Sanity check at end").
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScanTotals {
    pub total_fields: usize,
    pub variable_fields: usize,
    pub group_closings: usize,
    pub max_depth: usize,
}

/// Everything pass 3 needs: every field's location, every closing
/// parenthesis's location, and — for fields that open a group — how many
/// fields that group contains (operator included).
pub(crate) struct ScanOutput {
    pub fields: Vec<FieldSpan>,
    pub closes: Vec<usize>,
    pub group_size_of: Vec<Option<usize>>,
    pub totals: ScanTotals,
}

/// Pass 2's raw output, before it's wrapped in a [`ScanOutput`].
type Pass2Output = (Vec<FieldSpan>, Vec<usize>, Vec<Option<usize>>);

pub(crate) fn scan(src: &[u8]) -> Result<ScanOutput, PbgError> {
    trace!(bytes = src.len(), "pass 1: counting fields");
    let totals = pass1(src)?;
    trace!(
        total_fields = totals.total_fields,
        max_depth = totals.max_depth,
        "pass 1 complete"
    );

    trace!("pass 2: locating fields and closing parentheses");
    let (fields, closes, group_size_of) = pass2(src, totals.max_depth)?;
    trace!(fields = fields.len(), closes = closes.len(), "pass 2 complete");

    Ok(ScanOutput {
        fields,
        closes,
        group_size_of,
        totals,
    })
}

fn syntax_err(message: &str, src: &[u8], index: usize) -> PbgError {
    pbg_err!(PbgErrorKind::Syntax {
        message: message.to_string(),
        source_str: String::from_utf8_lossy(src).into_owned(),
        index,
    })
}

fn pass1(src: &[u8]) -> Result<ScanTotals, PbgError> {
    let n = src.len();
    let mut i = 0;
    let mut depth: i64 = 0;
    let mut reached_end = false;
    let mut totals = ScanTotals::default();

    while i < n {
        let b = src[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if reached_end {
            return Err(syntax_err(
                "Too many opening parentheses yield multiple expressions",
                src,
                i,
            ));
        }
        match b {
            b'(' => {
                depth += 1;
                totals.max_depth = totals.max_depth.max(depth as usize);
                i += 1;
            }
            b')' => {
                depth -= 1;
                totals.group_closings += 1;
                if depth < 0 {
                    return Err(syntax_err("Too many closing parentheses", src, i));
                }
                i += 1;
                if depth == 0 {
                    reached_end = true;
                }
            }
            _ => {
                let (len, new_i) = scan_field(src, i)?;
                totals.total_fields += 1;
                if src[i] == b'[' {
                    totals.variable_fields += 1;
                }
                i = new_i;
                let _ = len;
                if depth == 0 {
                    reached_end = true;
                }
            }
        }
    }

    if depth != 0 {
        return Err(syntax_err("Too few closing parentheses", src, n));
    }
    if totals.total_fields == 0 {
        return Err(syntax_err("No fields in expression", src, 0));
    }
    Ok(totals)
}

struct GroupFrame {
    count: usize,
    first_field_idx: Option<usize>,
}

fn pass2(src: &[u8], max_depth: usize) -> Result<Pass2Output, PbgError> {
    let n = src.len();
    let mut i = 0;
    let mut fields = Vec::new();
    let mut closes = Vec::new();
    let mut group_size_of: Vec<Option<usize>> = Vec::new();
    let mut stack: Vec<GroupFrame> = Vec::with_capacity(max_depth);

    while i < n {
        let b = src[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        match b {
            b'(' => {
                // A nested group counts as exactly one child field towards
                // its enclosing group (the group itself, not its internal
                // fields, occupies that child slot). It can never be the
                // first field of its enclosing group: the grammar requires
                // an operator token directly after `(`, never another `(`.
                if let Some(frame) = stack.last_mut() {
                    let is_first = frame.first_field_idx.is_none();
                    frame.count += 1;
                    if is_first {
                        return Err(syntax_err("Field ordering not respected", src, i));
                    }
                }
                stack.push(GroupFrame {
                    count: 0,
                    first_field_idx: None,
                });
                i += 1;
            }
            b')' => {
                closes.push(i);
                let frame = stack.pop().expect("balanced parentheses checked in pass 1");
                match frame.first_field_idx {
                    Some(idx) => group_size_of[idx] = Some(frame.count),
                    None => return Err(syntax_err("Field ordering not respected", src, i)),
                }
                i += 1;
            }
            _ => {
                let field_start = i;
                let (len, new_i) = scan_field(src, i)?;
                let field_idx = fields.len();
                fields.push(FieldSpan {
                    start: field_start,
                    len,
                });
                group_size_of.push(None);
                i = new_i;

                if let Some(frame) = stack.last_mut() {
                    let is_first = frame.first_field_idx.is_none();
                    if is_first {
                        frame.first_field_idx = Some(field_idx);
                    }
                    frame.count += 1;
                    let slice = &src[field_start..field_start + len];
                    let is_operator = classify(slice).is_op();
                    if is_first != is_operator {
                        return Err(syntax_err(
                            "Field ordering not respected",
                            src,
                            field_start,
                        ));
                    }
                }
            }
        }
    }

    Ok((fields, closes, group_size_of))
}

/// Scans one field starting at `src[i]`, returning `(length, position just
/// past the field)`. Honors quoting (`'...'`) and bracketing (`[...]`)
/// per spec §4.2: a quote/bracket-opened field runs until the next
/// *unescaped* matching delimiter, where unescaped means not immediately
/// preceded by `\`.
fn scan_field(src: &[u8], i: usize) -> Result<(usize, usize), PbgError> {
    let n = src.len();
    let (open, close) = match src[i] {
        b'\'' => (b'\'', b'\''),
        b'[' => (b'[', b']'),
        _ => {
            let mut j = i;
            while j < n && !src[j].is_ascii_whitespace() && src[j] != b'(' && src[j] != b')' {
                j += 1;
            }
            return Ok((j - i, j));
        }
    };
    let _ = open;
    let mut j = i + 1;
    loop {
        if j >= n {
            let message = if close == b'\'' {
                "Unclosed string"
            } else {
                "Unclosed variable"
            };
            return Err(syntax_err(message, src, i));
        }
        if src[j] == close && !is_escaped(src, j) {
            j += 1;
            return Ok((j - i, j));
        }
        j += 1;
    }
}

fn is_escaped(src: &[u8], pos: usize) -> bool {
    pos > 0 && src[pos - 1] == b'\\'
}
