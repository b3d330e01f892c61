//! # assert-tree: structural assertions over heterogeneous data trees
//!
//! `assert-tree` decides whether an "actual" value produced by code under
//! test conforms to an "expected" specification. Both sides are arbitrary,
//! heterogeneous trees: nested maps, ordered sequences, scalars, time
//! instants, and predicates. The engine walks both trees in parallel,
//! reports every point of disagreement with a precise path, and supports a
//! compact text-directive language embedded inside expected strings for
//! regular expressions, numeric ranges, substring containment, negation,
//! and per-subtree comparison policies.
//!
//! # Quick start
//!
//! ```rust
//! use assert_tree::{assert, Value};
//! use std::collections::BTreeMap;
//!
//! let mut expected = BTreeMap::new();
//! expected.insert("name".to_string(), Value::from("alice"));
//! expected.insert("age".to_string(), Value::Text("/[18..65]/".to_string()));
//!
//! let mut actual = BTreeMap::new();
//! actual.insert("name".to_string(), Value::from("alice"));
//! actual.insert("age".to_string(), Value::Int(30));
//!
//! let validation = assert(&Value::Map(expected), &Value::Map(actual)).unwrap();
//! assert!(!validation.has_failure(), "{}", validation.report());
//! ```
//!
//! # Text directives
//!
//! Expected strings may carry a small DSL, each form with an optional
//! leading `!` negation:
//!
//! - `~/regexp/` — the actual text must match the regular expression.
//! - `/[min..max]/` — the actual value, parsed as a number, must fall in
//!   the inclusive range.
//! - `/[v1,v2,...]/` — the actual text must equal one of the candidates.
//! - `/substr/` — the actual text must contain the fragment.
//! - anything else — plain string equality.
//!
//! # Directives
//!
//! Expected maps may carry reserved `@`-prefixed keys (`@source`,
//! `@switchBy`, `@indexBy`, `@keyExists`, `@keyDoesNotExist`,
//! `@caseSensitive`, `@sortText`, `@timeLayout`, `@dataType/<field>`,
//! `@strictDataTypeCheck`) that tune comparison behaviour for the subtree
//! they're declared in and every descendant, until overridden. See
//! [`directive::Directive`] for the full semantics of each attribute.
//!
//! # What this crate does not do
//!
//! Macro/template expansion of expected text, JSON parsing of embedded
//! textual payloads beyond a single `IsCompleteJSON` probe, and arbitrary
//! scalar coercion policy are treated as external collaborators — see
//! [`context::Evaluator`] and [`context::Context`].

pub mod context;
pub mod dispatch;
pub mod directive;
pub mod error;
mod macros;
pub mod map;
pub mod path;
mod regex_cache;
pub mod scalar;
pub mod slice;
pub mod text;
pub mod validation;
pub mod value;

pub use context::{Context, ContextBuilder, Evaluator, NullEvaluator};
pub use directive::{Directive, DirectiveRegistry};
pub use error::StructuralError;
pub use path::DataPath;
pub use validation::{Failure, Validation, ViolationKind};
pub use value::{Predicate, Value};

/// Compares `expected` against `actual` from the root path, using a
/// default [`Context`] (spec.md §6: `Assert`).
pub fn assert(expected: &Value, actual: &Value) -> Result<Validation, StructuralError> {
    assert_with_context(expected, actual, DataPath::root(), &Context::default())
}

/// Compares `expected` against `actual`, starting at `path` and using the
/// given `ctx` (spec.md §6: `AssertWithContext`).
pub fn assert_with_context(
    expected: &Value,
    actual: &Value,
    path: DataPath,
    ctx: &Context,
) -> Result<Validation, StructuralError> {
    let mut validation = Validation::new();
    dispatch::assert_value(expected, actual, &path, &Directive::default(), ctx, &mut validation)?;
    Ok(validation)
}
