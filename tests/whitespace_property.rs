//! Property test: inserting arbitrary runs of insignificant whitespace
//! around tokens never changes the parsed tree's canonical form or the
//! evaluated result.

use proptest::prelude::*;

use pbg::{evaluate, parse};

/// A handful of structurally distinct expressions to pad with whitespace.
const EXPRESSIONS: &[&str] = &[
    "TRUE",
    "(& TRUE FALSE)",
    "(| (= 10 10) (< 1 2))",
    "(@ NUMBER (= [a] [b]) 1)",
    "(! (? [x]))",
];

fn pad(ws: &str, source: &str) -> String {
    // Insert the padding run around every `(`, `)`, and between tokens by
    // simply surrounding each character boundary the grammar already treats
    // as whitespace-tolerant: here, before/after every parenthesis.
    let mut out = String::new();
    out.push_str(ws);
    for ch in source.chars() {
        out.push(ch);
        if ch == '(' || ch == ')' {
            out.push_str(ws);
        }
    }
    out.push_str(ws);
    out
}

proptest! {
    #[test]
    fn whitespace_padding_does_not_change_canonical_form(
        expr_idx in 0..EXPRESSIONS.len(),
        ws in prop::collection::vec(prop::sample::select(vec![' ', '\t', '\n']), 0..6)
            .prop_map(|chars| chars.into_iter().collect::<String>()),
    ) {
        let source = EXPRESSIONS[expr_idx];
        let baseline = parse(source).unwrap().to_canonical_string();

        let padded_source = pad(&ws, source);
        let padded = parse(&padded_source).unwrap().to_canonical_string();

        prop_assert_eq!(baseline, padded);
    }

    #[test]
    fn whitespace_padding_does_not_change_evaluated_result(
        expr_idx in 0..EXPRESSIONS.len(),
        ws in prop::collection::vec(prop::sample::select(vec![' ', '\t', '\n']), 0..6)
            .prop_map(|chars| chars.into_iter().collect::<String>()),
    ) {
        let source = EXPRESSIONS[expr_idx];
        let mut baseline_expr = parse(source).unwrap();
        let baseline = evaluate(&mut baseline_expr, |_| pbg::Field::number(5.0));

        let padded_source = pad(&ws, source);
        let mut padded_expr = parse(&padded_source).unwrap();
        let padded = evaluate(&mut padded_expr, |_| pbg::Field::number(5.0));

        prop_assert_eq!(baseline.is_ok(), padded.is_ok());
        if let (Ok(b), Ok(p)) = (baseline, padded) {
            prop_assert_eq!(b, p);
        }
    }
}
