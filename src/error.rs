//! The "structural error" channel (spec.md §7): conditions that prevent the
//! comparator from making a meaningful judgment at all, as opposed to an
//! ordinary assertion mismatch (which is a [`crate::validation::Failure`]
//! appended to the running [`crate::validation::Validation`], never an
//! `Err`).

use thiserror::Error;

/// Returned from the fallible entry points when the comparator hits a
/// condition it cannot recover a judgment from.
#[derive(Debug, Error)]
pub enum StructuralError {
    /// The `~/.../` body failed to compile as a regular expression.
    #[error("invalid regular expression in expected text {0:?}: {1}")]
    InvalidRegex(String, #[source] regex::Error),

    /// A `/[...]/` body contained neither `..` nor `,`.
    #[error("range expression {0:?} has neither `..` nor `,`")]
    InvalidRange(String),

    /// A `@switchBy` case resolved to a non-map value in expected.
    #[error("switch/case value at key {0:?} is not a map")]
    NonMapCase(String),

    /// The `Evaluator` collaborator failed to expand an expected string.
    #[error("macro expansion of {0:?} failed: {1}")]
    Expansion(String, String),

    /// Lifting a `T: Serialize` host record into a [`crate::value::Value`]
    /// failed.
    #[error("failed to convert value for comparison: {0}")]
    Ingress(String),
}
