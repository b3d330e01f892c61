//! The value dispatcher (spec.md §4.1): the top-level recursion that
//! normalises, classifies, and delegates a single `(expected, actual)` pair.

use crate::context::Context;
use crate::directive::Directive;
use crate::error::StructuralError;
use crate::map::compare_map;
use crate::path::DataPath;
use crate::scalar::{compare_float, compare_int, compare_time};
use crate::slice::compare_slice;
use crate::text::match_text;
use crate::validation::{Failure, Validation, ViolationKind};
use crate::value::Value;

fn fail(out: &mut Validation, path: &DataPath, violation: ViolationKind, expected: &Value, actual: &Value) {
    out.add_failure(Failure {
        source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
        path: path.path(),
        violation,
        expected: expected.render(),
        actual: actual.render(),
        extras: None,
    });
}

/// Compares a single `(expected, actual)` pair, recording exactly one
/// outcome on `out` per call, or recursing into children that each record
/// their own. Returns `Err` only for the structurally unrecoverable
/// conditions named in spec.md §4.1: a malformed regular expression, a
/// malformed range body, a non-map switch/case value, or a failed macro
/// expansion.
pub fn assert_value(
    expected: &Value,
    actual: &Value,
    path: &DataPath,
    inherited: &Directive,
    ctx: &Context,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    let mut expected = expected.clone();
    let mut actual = actual.clone();

    // Rules 1-5: normalise `expected` (macro expansion, embedded JSON) and
    // `actual` (embedded JSON), looping because either can replace the
    // operand and force reclassification.
    loop {
        if expected.is_null() {
            if actual.is_null() {
                out.add_pass();
            } else {
                fail(out, path, ViolationKind::NotEqual, &expected, &actual);
            }
            return Ok(());
        }

        if let Value::Int(_) = &expected {
            return compare_int(&expected, &actual, path, ctx, out);
        }
        if let Value::Float(_) = &expected {
            return compare_float(&expected, &actual, path, ctx, out);
        }

        if let Value::Text(s) = &expected {
            if ctx.evaluator().has_macro(s) {
                expected = ctx.evaluator().expand(s)?;
                continue;
            }
            if let Some(parsed) = Value::parse_complete_json(s) {
                expected = parsed;
                continue;
            }
        }

        if let Value::Text(s) = &actual {
            if let Some(parsed) = Value::parse_complete_json(s) {
                actual = parsed;
                continue;
            }
        }

        break;
    }

    // Rule 6: a numeric `actual` guides coercion even when `expected`
    // isn't itself numeric (e.g. a DSL range string against an int).
    match &actual {
        Value::Int(_) => return compare_int(&expected, &actual, path, ctx, out),
        Value::Float(_) => return compare_float(&expected, &actual, path, ctx, out),
        _ => {}
    }

    // Rule 7: predicate capability.
    if let Value::Predicate(p) = &expected {
        if p.apply(&actual) {
            out.add_pass();
        } else {
            fail(out, path, ViolationKind::Predicate, &expected, &actual);
        }
        return Ok(());
    }

    // Directives attached at an ancestor path (either registered on `ctx`
    // or extracted inline from an enclosing expected map) apply here and to
    // every descendant until overridden (spec.md §3).
    let directive = path.match_directive(ctx).merge_from(inherited);
    let time_layout = directive.default_time_layout(ctx.default_time_layout());

    // Rule 8: either side a time instant.
    if expected.is_time() || actual.is_time() {
        compare_time(&expected, &actual, time_layout, path, out);
        return Ok(());
    }

    // Rule 9: record-with-named-fields coercion. Structs are lifted into
    // `Value::Map` at ingress (`Value::from_serializable`), so by the time
    // a pair reaches the dispatcher this step is already satisfied.

    // Rule 10: expected is a map.
    if let Value::Map(map) = &expected {
        return compare_map(map, &actual, path, &directive, ctx, out);
    }

    // Rule 11: expected is a sequence.
    if let Value::List(list) = &expected {
        return compare_slice(list, &actual, path, &directive, ctx, out);
    }

    // Rule 12: deep equality.
    if expected == actual {
        out.add_pass();
        return Ok(());
    }

    // Rule 13: lenient time fallback.
    if !directive.strict_data_type_check(ctx.strict_data_type_check()) {
        let expected_time = expected.to_time(time_layout);
        let actual_time = actual.to_time(time_layout);
        match (expected_time, actual_time) {
            (Some(e), Some(a)) if e == a => {
                out.add_pass();
                return Ok(());
            }
            (None, Some(a)) if a.to_rfc3339().starts_with(&expected.render()) => {
                out.add_pass();
                return Ok(());
            }
            _ => {}
        }
    }

    // Rule 14: fallback to the text matcher.
    match_text(&expected.render(), &actual.render(), path, ctx, out)
}
