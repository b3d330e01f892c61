//! Scalar comparators (spec.md §4.3): integer, float, and time, each
//! honouring the text DSL as an escape hatch so `expected = "/[0..100]/"`
//! against an integer `actual` still performs a range check.

use crate::context::Context;
use crate::error::StructuralError;
use crate::path::DataPath;
use crate::text::match_text;
use crate::validation::{Failure, Validation, ViolationKind};
use crate::value::Value;

fn is_dsl_escape(expected: &Value) -> bool {
    matches!(expected.as_str(), Some(s) if {
        let t = s.trim();
        t.starts_with('/') || t.starts_with('!')
    })
}

fn fail_equal(expected: &Value, actual: &Value, path: &DataPath, out: &mut Validation) {
    out.add_failure(Failure {
        source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
        path: path.path(),
        violation: ViolationKind::Equal,
        expected: expected.render(),
        actual: actual.render(),
        extras: None,
    });
}

/// Integer comparator (spec.md §4.3).
pub fn compare_int(
    expected: &Value,
    actual: &Value,
    path: &DataPath,
    ctx: &Context,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    let Some(expected_int) = expected.to_int() else {
        return match_text(&expected.render(), &actual.render(), path, ctx, out);
    };

    match actual.to_int() {
        Some(actual_int) if actual_int == expected_int => {
            out.add_pass();
            Ok(())
        }
        _ if is_dsl_escape(expected) => {
            match_text(&expected.render(), &actual.render(), path, ctx, out)
        }
        _ => {
            fail_equal(expected, actual, path, out);
            Ok(())
        }
    }
}

/// Float comparator (spec.md §4.3), symmetric to the integer comparator.
pub fn compare_float(
    expected: &Value,
    actual: &Value,
    path: &DataPath,
    ctx: &Context,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    let Some(expected_float) = expected.to_float() else {
        return match_text(&expected.render(), &actual.render(), path, ctx, out);
    };

    match actual.to_float() {
        Some(actual_float) if actual_float == expected_float => {
            out.add_pass();
            Ok(())
        }
        _ if is_dsl_escape(expected) => {
            match_text(&expected.render(), &actual.render(), path, ctx, out)
        }
        _ => {
            fail_equal(expected, actual, path, out);
            Ok(())
        }
    }
}

/// Time comparator (spec.md §4.3): parses both sides with the path's
/// active `DefaultTimeLayout` and compares by instant, not wall-clock text.
pub fn compare_time(
    expected: &Value,
    actual: &Value,
    layout: &str,
    path: &DataPath,
    out: &mut Validation,
) {
    let expected_time = expected.to_time(layout);
    let actual_time = actual.to_time(layout);

    match (expected_time, actual_time) {
        (Some(e), Some(a)) if e == a => out.add_pass(),
        _ => fail_equal(expected, actual, path, out),
    }
}
