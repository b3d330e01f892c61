//! Declarative sugar over [`crate::assert`] (spec.md §6 public entry
//! points): panics with [`crate::Validation::report`] on the first failing
//! call instead of returning a `Result`.

/// Asserts that `actual` conforms to `expected`, panicking with the
/// validation report if any comparison fails.
///
/// ```rust
/// use assert_tree::{assert_matches, Value};
///
/// assert_matches!(Value::Int(1), Value::Int(1));
/// ```
#[macro_export]
macro_rules! assert_matches {
    ($expected:expr, $actual:expr) => {{
        let validation = $crate::assert(&$expected, &$actual)
            .unwrap_or_else(|err| panic!("structural error: {err}"));
        if validation.has_failure() {
            panic!("{}", validation.report());
        }
    }};
    ($expected:expr, $actual:expr, $ctx:expr) => {{
        let validation =
            $crate::assert_with_context(&$expected, &$actual, $crate::DataPath::root(), &$ctx)
                .unwrap_or_else(|err| panic!("structural error: {err}"));
        if validation.has_failure() {
            panic!("{}", validation.report());
        }
    }};
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn passes_silently_when_equal() {
        assert_matches!(Value::Int(1), Value::Int(1));
    }

    #[test]
    #[should_panic(expected = "value should be equal")]
    fn panics_with_report_on_mismatch() {
        assert_matches!(Value::Int(1), Value::Int(2));
    }
}
