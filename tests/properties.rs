use assert_tree::{assert, assert_with_context, Context, DataPath, Directive, Value};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn ident() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    // Invariant 5: nil round-trips.
    #[test]
    fn nil_round_trip(n in any::<i64>()) {
        let validation = assert(&Value::Null, &Value::Null).unwrap();
        prop_assert!(!validation.has_failure());
        prop_assert_eq!(validation.passed_count(), 1);

        let validation = assert(&Value::Null, &Value::Int(n)).unwrap();
        prop_assert!(validation.has_failure());
        prop_assert_eq!(validation.failures()[0].violation.to_string(), "value should not be equal");
    }

    // Invariant 6: deep-equal acceptance, exactly one pass.
    #[test]
    fn deep_equal_scalars_pass_exactly_once(n in any::<i64>()) {
        let validation = assert(&Value::Int(n), &Value::Int(n)).unwrap();
        prop_assert!(!validation.has_failure());
        prop_assert_eq!(validation.passed_count(), 1);
    }

    // Invariant 4: extra actual keys never fail; extra expected keys always do.
    #[test]
    fn extra_actual_key_never_fails(extra in ident(), v in any::<i64>()) {
        prop_assume!(extra != "a");
        let mut expected_map = BTreeMap::new();
        expected_map.insert("a".to_string(), Value::Int(1));
        let mut actual_map = BTreeMap::new();
        actual_map.insert("a".to_string(), Value::Int(1));
        actual_map.insert(extra, Value::Int(v));

        let validation = assert(&Value::Map(expected_map), &Value::Map(actual_map)).unwrap();
        prop_assert!(!validation.has_failure());
    }

    #[test]
    fn extra_expected_key_always_fails(extra in ident(), v in any::<i64>()) {
        prop_assume!(extra != "a");
        let mut expected_map = BTreeMap::new();
        expected_map.insert("a".to_string(), Value::Int(1));
        expected_map.insert(extra, Value::Int(v));
        let mut actual_map = BTreeMap::new();
        actual_map.insert("a".to_string(), Value::Int(1));

        let validation = assert(&Value::Map(expected_map), &Value::Map(actual_map)).unwrap();
        prop_assert!(validation.has_failure());
    }

    // Invariant 3: negation involution for bare-equality DSL bodies.
    #[test]
    fn negation_involution_for_equality(a in ident(), b in ident()) {
        let plain = assert(&Value::Text(a.clone()), &Value::Text(b.clone())).unwrap();
        let negated = assert(&Value::Text(format!("!{a}")), &Value::Text(b)).unwrap();
        prop_assert_eq!(plain.has_failure(), !negated.has_failure());
    }
}

#[test]
fn determinism_under_indexing_matches_direct_slice_projection() {
    let mut e1 = BTreeMap::new();
    e1.insert("id".to_string(), Value::from("a"));
    e1.insert("v".to_string(), Value::Int(1));
    let mut e2 = BTreeMap::new();
    e2.insert("id".to_string(), Value::from("b"));
    e2.insert("v".to_string(), Value::Int(2));

    let expected_slice = Value::List(vec![Value::Map(e1.clone()), Value::Map(e2.clone())]);
    // actual in reversed order.
    let actual_slice = Value::List(vec![Value::Map(e2), Value::Map(e1)]);

    let mut ctx = Context::builder().build();
    ctx.directives_mut().register(
        "",
        Directive::default().with_index_by(vec!["id".to_string()]),
    );

    let validation = assert_with_context(&expected_slice, &actual_slice, DataPath::root(), &ctx).unwrap();
    assert!(!validation.has_failure(), "{}", validation.report());
}
