//! The slice comparator (spec.md §4.5): element-wise comparison of
//! sequences, with `SortText` order-independence and `IndexBy` projection
//! onto the map comparator.

use std::collections::BTreeMap;

use crate::context::Context;
use crate::directive::{extract_directives, Directive};
use crate::dispatch::assert_value;
use crate::error::StructuralError;
use crate::map::compare_map;
use crate::path::DataPath;
use crate::validation::{Failure, Validation, ViolationKind};
use crate::value::Value;

/// Projects a slice of maps into a single map keyed by the concatenation of
/// each element's `@indexBy` fields, rendered from that element's own
/// source (spec.md §9: the two-sided render must not share one source).
pub fn project_by_index(items: &[Value], fields: &[String]) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for item in items {
        let Some(map) = item.as_map() else { continue };
        let key: String = fields
            .iter()
            .map(|field| map.get(field).map(Value::render).unwrap_or_default())
            .collect();
        out.insert(key, item.clone());
    }
    out
}

fn fail(
    out: &mut Validation,
    path: &DataPath,
    violation: ViolationKind,
    expected: String,
    actual: String,
) {
    out.add_failure(Failure {
        source: Some(path.source().to_string()).filter(|s| !s.is_empty()),
        path: path.path(),
        violation,
        expected,
        actual,
        extras: None,
    });
}

fn sort_key(value: &Value, case_sensitive: bool) -> String {
    let rendered = value.render();
    if case_sensitive {
        rendered
    } else {
        rendered.to_uppercase()
    }
}

/// Compares `expected_list` against `actual`.
pub fn compare_slice(
    expected_list: &[Value],
    actual: &Value,
    path: &DataPath,
    inherited: &Directive,
    ctx: &Context,
    out: &mut Validation,
) -> Result<(), StructuralError> {
    let registered: Directive = path.match_directive(ctx).merge_from(inherited);

    // spec.md §4.5: when the first element of the list is itself a map
    // carrying recognised `@`-prefixed keys, it's an inline directive rather
    // than a data element — extract it and drop it from the comparison list,
    // in the spirit of the registered/inherited directive but taking
    // precedence over both since it's declared closest to the data.
    let (directive, expected_list): (Directive, Vec<Value>) = match expected_list.first() {
        Some(Value::Map(first)) => {
            let mut candidate = first.clone();
            let (extracted, found) = extract_directives(&mut candidate);
            if found {
                (extracted.merge_from(&registered), expected_list[1..].to_vec())
            } else {
                (registered, expected_list.to_vec())
            }
        }
        _ => (registered, expected_list.to_vec()),
    };
    let expected_list = expected_list.as_slice();

    if !directive.index_by().is_empty() {
        let Some(actual_items) = actual.as_list() else {
            fail(
                out,
                path,
                ViolationKind::IncompatibleDataType,
                "list".to_string(),
                actual.render(),
            );
            return Ok(());
        };
        let expected_map = project_by_index(expected_list, directive.index_by());
        let actual_map = project_by_index(actual_items, directive.index_by());
        return compare_map(&expected_map, &Value::Map(actual_map), path, &directive, ctx, out);
    }

    let Some(actual_items) = actual.as_list() else {
        fail(
            out,
            path,
            ViolationKind::IncompatibleDataType,
            "list".to_string(),
            actual.render(),
        );
        return Ok(());
    };

    if expected_list.is_empty() {
        if actual_items.is_empty() {
            out.add_pass();
        } else {
            fail(
                out,
                path,
                ViolationKind::Length,
                "0".to_string(),
                actual_items.len().to_string(),
            );
        }
        return Ok(());
    }

    let (expected_items, actual_items): (Vec<Value>, Vec<Value>) = if directive.sort_text() {
        let mut expected_sorted = expected_list.to_vec();
        let mut actual_sorted = actual_items.to_vec();
        let case_sensitive = directive.case_sensitive();
        expected_sorted.sort_by(|a, b| sort_key(a, case_sensitive).cmp(&sort_key(b, case_sensitive)));
        actual_sorted.sort_by(|a, b| sort_key(a, case_sensitive).cmp(&sort_key(b, case_sensitive)));
        (expected_sorted, actual_sorted)
    } else {
        (expected_list.to_vec(), actual_items.to_vec())
    };

    for (i, expected_elem) in expected_items.iter().enumerate() {
        if i >= actual_items.len() {
            fail(
                out,
                path,
                ViolationKind::Length,
                expected_items.len().to_string(),
                actual_items.len().to_string(),
            );
            break;
        }
        assert_value(expected_elem, &actual_items[i], &path.index(i), &directive, ctx, out)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_length_lists_compare_elementwise() {
        let expected = vec![Value::Int(1), Value::Int(2)];
        let actual = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let mut out = Validation::new();
        compare_slice(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
        assert_eq!(out.passed_count(), 2);
    }

    #[test]
    fn shorter_actual_fails_length_once() {
        let expected = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        let actual = Value::List(vec![Value::Int(1)]);
        let mut out = Validation::new();
        compare_slice(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(out.failures().len(), 1);
        assert_eq!(
            out.failures()[0].violation.to_string(),
            "should have the same length"
        );
    }

    #[test]
    fn longer_actual_is_not_a_failure() {
        let expected = vec![Value::Int(1)];
        let actual = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let mut out = Validation::new();
        compare_slice(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
    }

    #[test]
    fn empty_expected_requires_empty_actual() {
        let expected: Vec<Value> = Vec::new();
        let actual = Value::List(vec![Value::Int(1)]);
        let mut out = Validation::new();
        compare_slice(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(out.failures().len(), 1);
    }

    #[test]
    fn non_list_actual_is_incompatible() {
        let expected = vec![Value::Int(1)];
        let actual = Value::Text("nope".to_string());
        let mut out = Validation::new();
        compare_slice(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert_eq!(
            out.failures()[0].violation.to_string(),
            "data type was incompatible"
        );
    }

    #[test]
    fn inline_first_element_directive_is_extracted_and_not_compared() {
        let mut d = BTreeMap::new();
        d.insert("@indexBy".to_string(), Value::from(vec!["id"]));

        let mut a = BTreeMap::new();
        a.insert("id".to_string(), Value::Int(1));
        a.insert("v".to_string(), Value::from("x"));

        let mut b = BTreeMap::new();
        b.insert("id".to_string(), Value::Int(2));
        b.insert("v".to_string(), Value::from("y"));

        // Actual is reordered relative to expected; only @indexBy makes this pass.
        let expected = vec![Value::Map(d), Value::Map(a.clone()), Value::Map(b.clone())];
        let actual = Value::List(vec![Value::Map(b), Value::Map(a)]);

        let mut out = Validation::new();
        compare_slice(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure(), "{:?}", out.failures());
    }

    #[test]
    fn first_element_without_directive_keys_is_compared_as_data() {
        let expected = vec![Value::Int(1), Value::Int(2)];
        let actual = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let mut out = Validation::new();
        compare_slice(&expected, &actual, &DataPath::root(), &Directive::default(), &Context::default(), &mut out).unwrap();
        assert!(!out.has_failure());
        assert_eq!(out.passed_count(), 2);
    }

    #[test]
    fn project_by_index_keys_by_concatenated_fields() {
        let mut a = BTreeMap::new();
        a.insert("id".to_string(), Value::Text("x".to_string()));
        let items = vec![Value::Map(a)];
        let projected = project_by_index(&items, &["id".to_string()]);
        assert!(projected.contains_key("x"));
    }
}
