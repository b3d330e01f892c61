//! The text DSL matcher (spec.md §4.2): `~/regex/`, `/[min..max]/`,
//! `/[v1,v2,...]/`, `/substr/`, and bare equality, each with an optional
//! leading `!` negation.

use crate::context::Context;
use crate::error::StructuralError;
use crate::path::DataPath;
use crate::regex_cache::get_or_compile_regex;
use crate::validation::{Failure, Validation, ViolationKind};

/// Matches `actual` against the (possibly DSL-bearing) `expected` string,
/// recording a pass or a single failure on `out`.
///
/// Returns `Err` only for structural errors: a malformed regular
/// expression, or a range body with neither `..` nor `,` (spec.md §7).
pub fn match_text(
    expected: &str,
    actual: &str,
    path: &DataPath,
    _ctx: &Context,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    let trimmed = expected.trim();

    if let Some(body_with_bang) = trimmed.strip_suffix('/') {
        let (negated, body_with_bang) = match body_with_bang.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, body_with_bang),
        };

        if let Some(pattern) = body_with_bang.strip_prefix("~/") {
            return match_regex(pattern, negated, actual, path, out);
        }

        if let Some(inner) = body_with_bang
            .strip_prefix("/[")
            .and_then(|s| s.strip_suffix(']'))
        {
            return match_range(inner, negated, actual, expected, path, out);
        }

        if let Some(fragment) = body_with_bang.strip_prefix('/') {
            match_contains(fragment, negated, actual, path, out);
            return Ok(());
        }
    }

    let (negated, body) = match trimmed.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    match_equal(body, negated, actual, path, out);
    Ok(())
}

fn match_regex(
    pattern: &str,
    negated: bool,
    actual: &str,
    path: &DataPath,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    let pattern = if actual.contains('\n') {
        format!("(?m){pattern}")
    } else {
        pattern.to_string()
    };

    let regex = get_or_compile_regex(&pattern).ok_or_else(|| {
        let err = regex::Regex::new(&pattern).unwrap_err();
        StructuralError::InvalidRegex(pattern.clone(), err)
    })?;

    let matched = regex.is_match(actual);
    if matched == !negated {
        out.add_pass();
    } else {
        let violation = if negated {
            ViolationKind::RegExprDoesNotMatch
        } else {
            ViolationKind::RegExprMatches
        };
        out.add_failure(Failure {
            source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
            path: path.path(),
            violation,
            expected: format!("~/{pattern}/"),
            actual: actual.to_string(),
            extras: None,
        });
    }
    Ok(())
}

fn match_range(
    inner: &str,
    negated: bool,
    actual: &str,
    original_expected: &str,
    path: &DataPath,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    let matched = if let Some((lo, hi)) = inner.split_once("..") {
        let lo: f64 = lo.trim().parse().unwrap_or(f64::NEG_INFINITY);
        let hi: f64 = hi.trim().parse().unwrap_or(f64::INFINITY);
        let actual_num: f64 = actual
            .trim()
            .parse()
            .map_err(|_| StructuralError::InvalidRange(inner.to_string()))?;
        lo <= actual_num && actual_num <= hi
    } else if inner.contains(',') {
        inner
            .split(',')
            .any(|candidate| candidate.trim() == actual.trim())
    } else {
        return Err(StructuralError::InvalidRange(inner.to_string()));
    };

    if matched == !negated {
        out.add_pass();
    } else {
        let violation = if negated {
            ViolationKind::RangeNot
        } else {
            ViolationKind::Range
        };
        out.add_failure(Failure {
            source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
            path: path.path(),
            violation,
            expected: original_expected.to_string(),
            actual: actual.to_string(),
            extras: None,
        });
    }
    Ok(())
}

fn match_contains(fragment: &str, negated: bool, actual: &str, path: &DataPath, out: &mut Validation) {
    let matched = actual.contains(fragment);
    if matched == !negated {
        out.add_pass();
    } else {
        let violation = if negated {
            ViolationKind::DoesNotContain
        } else {
            ViolationKind::Contains
        };
        out.add_failure(Failure {
            source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
            path: path.path(),
            violation,
            expected: format!("/{fragment}/"),
            actual: actual.to_string(),
            extras: None,
        });
    }
}

fn match_equal(expected: &str, negated: bool, actual: &str, path: &DataPath, out: &mut Validation) {
    let matched = expected == actual;
    if matched == !negated {
        out.add_pass();
    } else {
        let violation = if negated {
            ViolationKind::NotEqual
        } else {
            ViolationKind::Equal
        };
        out.add_failure(Failure {
            source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
            path: path.path(),
            violation,
            expected: expected.to_string(),
            actual: actual.to_string(),
            extras: None,
        });
    }
}
