//! Lexical classification of a single field's bytes (spec §4.1).
//!
//! [`classify`] never allocates: it only inspects the slice it is given.
//! Callers are responsible for handing it exactly one field's bytes — no
//! trailing data, no surrounding whitespace.

use crate::field::FieldType;

/// Classifies `bytes` as a [`FieldType`], or returns `FieldType::Null` if
/// nothing matches.
///
/// Recognition is tried in the fixed order documented in spec §4.1; no
/// input matches more than one rule, so the order only affects readability,
/// not results.
pub fn classify(bytes: &[u8]) -> FieldType {
    if bytes == b"TRUE" {
        return FieldType::True;
    }
    if bytes == b"FALSE" {
        return FieldType::False;
    }
    match bytes {
        b"DATE" => return FieldType::TpDate,
        b"BOOL" => return FieldType::TpBool,
        b"NUMBER" => return FieldType::TpNumber,
        b"STRING" => return FieldType::TpString,
        _ => {}
    }
    if bytes.len() >= 2 && bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'' {
        return FieldType::String;
    }
    if bytes.len() >= 2 && bytes[0] == b'[' && bytes[bytes.len() - 1] == b']' {
        return FieldType::Var;
    }
    if is_date_shape(bytes) {
        return FieldType::Date;
    }
    if is_number(bytes) {
        return FieldType::Number;
    }
    match bytes {
        b"!" => return FieldType::Not,
        b"&" => return FieldType::And,
        b"|" => return FieldType::Or,
        b"=" => return FieldType::Eq,
        b"<" => return FieldType::Lt,
        b">" => return FieldType::Gt,
        b"?" => return FieldType::Exst,
        b"@" => return FieldType::Type,
        b"!=" => return FieldType::Neq,
        b"<=" => return FieldType::Lte,
        b">=" => return FieldType::Gte,
        _ => {}
    }
    FieldType::Null
}

fn is_date_shape(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
        && bytes[3].is_ascii_digit()
        && bytes[4] == b'-'
        && bytes[5].is_ascii_digit()
        && bytes[6].is_ascii_digit()
        && bytes[7] == b'-'
        && bytes[8].is_ascii_digit()
        && bytes[9].is_ascii_digit()
}

/// `["+"|"-"] ("0" | [1-9][0-9]*) ["." [0-9]+] [("e"|"E") ["+"|"-"] [0-9]+]`
///
/// A lone `0` may be followed directly by a fractional part or an
/// exponent (`0e10` classifies as NUMBER) — this is a deliberate quirk
/// carried over from the source implementation (spec §9 Open Questions),
/// not a generalization of the leading-zero rule.
fn is_number(bytes: &[u8]) -> bool {
    let n = bytes.len();
    if n == 0 {
        return false;
    }
    let mut i = 0;
    if bytes[i] == b'+' || bytes[i] == b'-' {
        i += 1;
    }
    if i >= n || !bytes[i].is_ascii_digit() {
        return false;
    }
    if bytes[i] == b'0' {
        i += 1;
    } else {
        while i < n && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    if i < n && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < n && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    }

    if i < n && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < n && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < n && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == n
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"TRUE", FieldType::True)]
    #[case(b"FALSE", FieldType::False)]
    #[case(b"DATE", FieldType::TpDate)]
    #[case(b"BOOL", FieldType::TpBool)]
    #[case(b"NUMBER", FieldType::TpNumber)]
    #[case(b"STRING", FieldType::TpString)]
    #[case(b"!", FieldType::Not)]
    #[case(b"&", FieldType::And)]
    #[case(b"|", FieldType::Or)]
    #[case(b"=", FieldType::Eq)]
    #[case(b"<", FieldType::Lt)]
    #[case(b">", FieldType::Gt)]
    #[case(b"?", FieldType::Exst)]
    #[case(b"@", FieldType::Type)]
    #[case(b"!=", FieldType::Neq)]
    #[case(b"<=", FieldType::Lte)]
    #[case(b">=", FieldType::Gte)]
    #[case(b"2018-10-11", FieldType::Date)]
    #[case(b"'hi'", FieldType::String)]
    #[case(b"[a]", FieldType::Var)]
    #[case(b"10", FieldType::Number)]
    #[case(b"-10", FieldType::Number)]
    #[case(b"+10", FieldType::Number)]
    #[case(b"10.5", FieldType::Number)]
    #[case(b"0.5", FieldType::Number)]
    #[case(b"0e10", FieldType::Number)]
    #[case(b"1e-10", FieldType::Number)]
    #[case(b"1E+10", FieldType::Number)]
    #[case(b"0", FieldType::Number)]
    fn classifies(#[case] input: &[u8], #[case] expected: FieldType) {
        assert_eq!(classify(input), expected);
    }

    #[rstest]
    #[case(b"01")]
    #[case(b"1.")]
    #[case(b"1e")]
    #[case(b"1e+")]
    #[case(b"")]
    #[case(b"hello")]
    #[case(b"2018-1-1")]
    #[case(b"'unterminated")]
    fn rejects(#[case] input: &[u8]) {
        assert_eq!(classify(input), FieldType::Null);
    }
}
