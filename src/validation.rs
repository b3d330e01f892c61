//! The validation accumulator (spec.md §4.6): a passive, append-only
//! container of pass/fail outcomes. No concurrency control — per spec.md
//! §5, callers that want to parallelise distinct assertions serialise
//! access to a shared accumulator, or use one per call and merge.

use std::fmt;

/// A named kind of mismatch, with the stable strings from spec.md §6 used
/// in golden tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    MissingEntry,
    IncompatibleDataType,
    KeyExists,
    KeyDoesNotExist,
    Equal,
    NotEqual,
    Length,
    MissingCase,
    RegExprMatches,
    RegExprDoesNotMatch,
    Range,
    RangeNot,
    Contains,
    DoesNotContain,
    Predicate,
    NotNil,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationKind::MissingEntry => "entry was missing",
            ViolationKind::IncompatibleDataType => "data type was incompatible",
            ViolationKind::KeyExists => "key should exist",
            ViolationKind::KeyDoesNotExist => "key should not exist",
            ViolationKind::Equal => "value should be equal",
            ViolationKind::NotEqual => "value should not be equal",
            ViolationKind::Length => "should have the same length",
            ViolationKind::MissingCase => "missing switch/case value",
            ViolationKind::RegExprMatches => "should match regrexp",
            ViolationKind::RegExprDoesNotMatch => "should not match regrexp",
            ViolationKind::Range => "should be in range",
            ViolationKind::RangeNot => "should not be in range",
            ViolationKind::Contains => "should contain fragment",
            ViolationKind::DoesNotContain => "should not contain fragment",
            ViolationKind::Predicate => "should pass predicate",
            ViolationKind::NotNil => "should have not nil",
        };
        write!(f, "{s}")
    }
}

/// One point of disagreement between expected and actual.
#[derive(Debug, Clone)]
pub struct Failure {
    pub source: Option<String>,
    pub path: String,
    pub violation: ViolationKind,
    pub expected: String,
    pub actual: String,
    pub extras: Option<String>,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.violation)?;
        if let Some(source) = &self.source {
            write!(f, " (source: {source})")?;
        }
        write!(f, "\n  expected: {}\n  actual:   {}", self.expected, self.actual)?;
        if let Some(extras) = &self.extras {
            write!(f, "\n  {extras}")?;
        }
        Ok(())
    }
}

/// Running counter of passes and an append-only list of failures.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    passed_count: usize,
    failures: Vec<Failure>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pass(&mut self) {
        self.passed_count += 1;
    }

    pub fn add_failure(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    pub fn passed_count(&self) -> usize {
        self.passed_count
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn has_failure(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Merges another accumulator's counters and failures into this one,
    /// for callers that parallelise distinct assertions with one
    /// accumulator each (spec.md §5).
    pub fn merge(&mut self, mut other: Validation) {
        self.passed_count += other.passed_count;
        self.failures.append(&mut other.failures);
    }

    /// Renders a human-readable report of every failure recorded so far.
    pub fn report(&self) -> String {
        if self.failures.is_empty() {
            return format!("all {} assertions passed", self.passed_count);
        }

        let mut out = format!(
            "{} passed, {} failed:\n",
            self.passed_count,
            self.failures.len()
        );
        for (i, failure) in self.failures.iter().enumerate() {
            out.push_str(&format!("\n{}. {failure}", i + 1));
        }
        out
    }
}
