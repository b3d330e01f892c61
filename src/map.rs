//! The map comparator (spec.md §4.4): compares associative maps under
//! directive-driven policies (switch/case projection, index-by,
//! existence assertions).

use std::collections::BTreeMap;

use crate::context::Context;
use crate::directive::{extract_directives, Directive};
use crate::dispatch::assert_value;
use crate::error::StructuralError;
use crate::path::DataPath;
use crate::slice::project_by_index;
use crate::validation::{Failure, Validation, ViolationKind};
use crate::value::Value;

fn available_keys(map: &BTreeMap<String, Value>) -> String {
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    format!("available keys: [{}]", keys.join(", "))
}

/// Folds every key in `map` to upper case (spec.md §3 `CaseSensitive`).
fn fold_keys_upper(map: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    map.iter()
        .map(|(k, v)| (k.to_uppercase(), v.clone()))
        .collect()
}

fn fail(
    out: &mut Validation,
    path: &DataPath,
    violation: ViolationKind,
    expected: String,
    actual: String,
    extras: Option<String>,
) {
    out.add_failure(Failure {
        source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
        path: path.path(),
        violation,
        expected,
        actual,
        extras,
    });
}

/// Compares `expected_map` against `actual`, recursing into `assert_value`
/// for every entry that isn't a directive or an existence assertion.
pub fn compare_map(
    expected_map: &BTreeMap<String, Value>,
    actual: &Value,
    path: &DataPath,
    inherited: &Directive,
    ctx: &Context,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    // Step 1: merge the path's registered directive and the directive
    // inherited from an enclosing expected map with one freshly extracted
    // from this expected map; the extracted (most specific) directive wins,
    // per the "child field explicitly set wins" rule (spec.md §9).
    let mut expected_map = expected_map.clone();
    let registered = path.match_directive(ctx).merge_from(inherited);
    let (extracted, _found) = extract_directives(&mut expected_map);
    let directive = extracted.merge_from(&registered);

    let path = match directive.source() {
        Some(source) => path.with_source(source.to_string()),
        None => path.clone(),
    };

    let time_layout = directive.default_time_layout(ctx.default_time_layout()).to_string();

    // Step 2: coerce actual into a map.
    let mut actual_map = match actual {
        Value::Map(m) => m.clone(),
        Value::List(items) if !directive.index_by().is_empty() => {
            project_by_index(items, directive.index_by())
        }
        _ => {
            fail(
                out,
                &path,
                ViolationKind::IncompatibleDataType,
                "map".to_string(),
                actual.render(),
                None,
            );
            return Ok(());
        }
    };

    // Step 3: learn data-type hints from actual's declared types and coerce.
    directive.apply(&mut actual_map, &time_layout);

    // Step 4: switch/case projection.
    if !directive.switch_by().is_empty() {
        let switch_key: String = directive
            .switch_by()
            .iter()
            .map(|field| actual_map.get(field).map(Value::render).unwrap_or_default())
            .collect();

        let Some(case_value) = expected_map.get(&switch_key) else {
            fail(
                out,
                &path,
                ViolationKind::MissingCase,
                switch_key.clone(),
                available_keys(&expected_map),
                None,
            );
            return Ok(());
        };

        let Value::Map(case_map) = case_value else {
            return Err(StructuralError::NonMapCase(switch_key));
        };
        let mut resolved = case_map.clone();

        if let Some(Value::Map(shared)) = expected_map.get("shared") {
            for (k, v) in shared {
                resolved.insert(k.clone(), v.clone());
            }
        }

        expected_map = resolved;
    }

    // Step 5: apply directive coercions to expected.
    directive.apply(&mut expected_map, &time_layout);

    // `CaseSensitive` (spec.md §3: "When false, all map keys in the subtree
    // are folded to upper case before comparison"): fold both sides right
    // before the entry-by-entry walk, once switch/case has already resolved
    // `expected_map` to its final data shape and data-type coercion is done.
    if !directive.case_sensitive() {
        expected_map = fold_keys_upper(&expected_map);
        actual_map = fold_keys_upper(&actual_map);
    }

    check_existence_directives(&actual_map, &directive, &path, out);

    compare_entries(&expected_map, &mut actual_map, &directive, &path, ctx, out)
}

/// Evaluates `KeyExists`/`KeyDoesNotExist` (spec.md §4.4) directly against
/// `actual_map`, independent of whether the named keys are also literal
/// entries in `expected_map`. These directives are commonly declared
/// standalone (`{"@keyDoesNotExist": ["password"]}` with no `password`
/// entry in expected at all), so their presence/(non-)presence assertion
/// cannot be gated on iterating expected's entries (spec.md §3: "Key-existence
/// directives do not recurse into the value at that key").
fn check_existence_directives(
    actual_map: &BTreeMap<String, Value>,
    directive: &Directive,
    path: &DataPath,
    out: &mut Validation,
) {
    let fold = |key: &str| {
        if directive.case_sensitive() {
            key.to_string()
        } else {
            key.to_uppercase()
        }
    };

    if let Some(set) = directive.key_does_not_exist() {
        for key in set {
            let lookup = fold(key);
            let entry_path = path.key(key.clone());
            if actual_map.contains_key(&lookup) {
                fail(
                    out,
                    &entry_path,
                    ViolationKind::KeyDoesNotExist,
                    key.clone(),
                    available_keys(actual_map),
                    None,
                );
            } else {
                out.add_pass();
            }
        }
    }

    if let Some(set) = directive.key_exists() {
        for key in set {
            let lookup = fold(key);
            let entry_path = path.key(key.clone());
            if actual_map.contains_key(&lookup) {
                out.add_pass();
            } else {
                fail(
                    out,
                    &entry_path,
                    ViolationKind::KeyExists,
                    key.clone(),
                    available_keys(actual_map),
                    None,
                );
            }
        }
    }
}

fn compare_entries(
    expected_map: &BTreeMap<String, Value>,
    actual_map: &mut BTreeMap<String, Value>,
    directive: &Directive,
    path: &DataPath,
    ctx: &Context,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    for (key, expected_value) in expected_map {
        if key.starts_with('@') {
            continue;
        }
        if expected_value.is_null() {
            continue;
        }
        if matches!(expected_value.as_str(), Some(s) if s.is_empty()) {
            continue;
        }

        // Key-existence directives are evaluated once, up front, in
        // `check_existence_directives` — independent of expected's entries.
        // Skip here so a key that happens to appear both in a directive set
        // and as a literal expected entry isn't asserted on twice.
        if directive.key_does_not_exist().is_some_and(|set| set.contains(key))
            || directive.key_exists().is_some_and(|set| set.contains(key))
        {
            continue;
        }

        let entry_path = path.key(key.clone());

        match actual_map.get(key) {
            None => {
                fail(
                    out,
                    &entry_path,
                    ViolationKind::MissingEntry,
                    key.clone(),
                    available_keys(actual_map),
                    None,
                );
            }
            Some(actual_value) => {
                assert_value(expected_value, actual_value, &entry_path, directive, ctx, out)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn map_of(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn extra_actual_keys_are_not_failures() {
        let expected = map_of(&[("a", Value::Int(1))]);
        let actual = Value::Map(map_of(&[("a", Value::Int(1)), ("b", Value::Int(2))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
        assert_eq!(out.passed_count(), 1);
    }

    #[test]
    fn missing_actual_key_fails() {
        let expected = map_of(&[("a", Value::Int(1))]);
        let actual = Value::Map(BTreeMap::new());
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(out.failures()[0].violation.to_string(), "entry was missing");
    }

    #[test]
    fn empty_string_expected_is_dont_care() {
        let expected = map_of(&[("a", Value::Text(String::new()))]);
        let actual = Value::Map(map_of(&[("a", Value::Int(999))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
        assert_eq!(out.passed_count(), 0);
    }

    #[test]
    fn switch_by_selects_case_and_overlays_shared() {
        let expected = map_of(&[
            ("@switchBy", Value::from(vec!["kind"])),
            (
                "A",
                Value::Map(map_of(&[("x", Value::Int(1)), ("y", Value::Int(9))])),
            ),
            ("shared", Value::Map(map_of(&[("y", Value::Int(9))]))),
        ]);
        let actual = Value::Map(map_of(&[
            ("kind", Value::Text("A".to_string())),
            ("x", Value::Int(1)),
            ("y", Value::Int(9)),
        ]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
    }

    #[test]
    fn switch_by_missing_case_fails() {
        let expected = map_of(&[
            ("@switchBy", Value::from(vec!["kind"])),
            ("A", Value::Map(map_of(&[("x", Value::Int(1))]))),
        ]);
        let actual = Value::Map(map_of(&[("kind", Value::Text("C".to_string()))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(
            out.failures()[0].violation.to_string(),
            "missing switch/case value"
        );
    }

    #[test]
    fn key_exists_directive() {
        let expected = map_of(&[("@keyExists", Value::from(vec!["secret"]))]);
        let actual = Value::Map(map_of(&[("secret", Value::Int(1))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
    }

    #[test]
    fn key_does_not_exist_directive() {
        let expected = map_of(&[("@keyDoesNotExist", Value::from(vec!["secret"]))]);
        let actual = Value::Map(map_of(&[("secret", Value::Int(1))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(
            out.failures()[0].violation.to_string(),
            "key should not exist"
        );
    }

    #[test]
    fn key_does_not_exist_directive_passes_when_key_absent() {
        let expected = map_of(&[("@keyDoesNotExist", Value::from(vec!["password"]))]);
        let actual = Value::Map(map_of(&[("id", Value::Int(1))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
        assert_eq!(out.passed_count(), 1);
    }

    #[test]
    fn key_exists_directive_fails_when_key_absent() {
        let expected = map_of(&[("@keyExists", Value::from(vec!["secret"]))]);
        let actual = Value::Map(BTreeMap::new());
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(
            out.failures()[0].violation.to_string(),
            "key should exist"
        );
    }

    #[test]
    fn case_insensitive_directive_folds_keys_for_lookup() {
        let expected = map_of(&[
            ("@caseSensitive", Value::Bool(false)),
            ("NAME", Value::from("alice")),
        ]);
        let actual = Value::Map(map_of(&[("name", Value::from("alice"))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure(), "{:?}", out.failures());
        assert_eq!(out.passed_count(), 1);
    }

    #[test]
    fn case_sensitive_by_default_misses_differently_cased_key() {
        let expected = map_of(&[("NAME", Value::from("alice"))]);
        let actual = Value::Map(map_of(&[("name", Value::from("alice"))]));
        let mut out = Validation::new();
        compare_map(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(out.failures()[0].violation.to_string(), "entry was missing");
    }
}
