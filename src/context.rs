//! The `Context` external collaborator (spec.md §3, §6): carries the
//! `Evaluator`, the path→directive registry, and per-context defaults for
//! time layout and `StrictDataTypeCheck`.

use crate::directive::DirectiveRegistry;
use crate::error::StructuralError;
use crate::value::Value;

/// Expands macro/templated text embedded in expected strings before the
/// dispatcher classifies it (dispatch rule 4 of spec.md §4.1). This crate's
/// core treats expansion as an external collaborator (spec.md §1 "OUT OF
/// SCOPE"): callers that embed a templating language wire their own
/// `Evaluator`; [`NullEvaluator`] is the default no-op implementation.
pub trait Evaluator: Send + Sync {
    /// Reports whether `text` contains anything this evaluator would
    /// expand, so the dispatcher can skip the call entirely when `false`.
    fn has_macro(&self, text: &str) -> bool;

    /// Expands `text`. May return any [`Value`] — if it is not a string
    /// the dispatcher restarts classification from the top with it; if it
    /// is a string, the (possibly unchanged) string continues through the
    /// remaining dispatch rules.
    fn expand(&self, text: &str) -> Result<Value, StructuralError>;
}

/// The default `Evaluator`: no macro language, expansion is the identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEvaluator;

impl Evaluator for NullEvaluator {
    fn has_macro(&self, _text: &str) -> bool {
        false
    }

    fn expand(&self, text: &str) -> Result<Value, StructuralError> {
        Ok(Value::Text(text.to_string()))
    }
}

/// The default `chrono` strftime layout used when neither a directive nor
/// an explicit call site specifies one.
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// External collaborator bundle threaded through every comparison step.
pub struct Context {
    evaluator: Box<dyn Evaluator>,
    directives: DirectiveRegistry,
    default_time_layout: String,
    strict_data_type_check: bool,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            evaluator: Box::new(NullEvaluator),
            directives: DirectiveRegistry::new(),
            default_time_layout: DEFAULT_TIME_LAYOUT.to_string(),
            strict_data_type_check: true,
        }
    }
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    pub fn directives(&self) -> &DirectiveRegistry {
        &self.directives
    }

    pub fn directives_mut(&mut self) -> &mut DirectiveRegistry {
        &mut self.directives
    }

    pub fn default_time_layout(&self) -> &str {
        &self.default_time_layout
    }

    pub fn strict_data_type_check(&self) -> bool {
        self.strict_data_type_check
    }
}

/// Builds a [`Context`]; this *is* the crate's configuration surface
/// (spec.md §6: "no persisted state, no CLI, no environment variables in
/// the core").
#[derive(Default)]
pub struct ContextBuilder {
    evaluator: Option<Box<dyn Evaluator>>,
    directives: DirectiveRegistry,
    default_time_layout: Option<String>,
    strict_data_type_check: Option<bool>,
}

impl ContextBuilder {
    pub fn evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    pub fn directives(mut self, directives: DirectiveRegistry) -> Self {
        self.directives = directives;
        self
    }

    pub fn default_time_layout(mut self, layout: impl Into<String>) -> Self {
        self.default_time_layout = Some(layout.into());
        self
    }

    pub fn strict_data_type_check(mut self, strict: bool) -> Self {
        self.strict_data_type_check = Some(strict);
        self
    }

    pub fn build(self) -> Context {
        Context {
            evaluator: self.evaluator.unwrap_or_else(|| Box::new(NullEvaluator)),
            directives: self.directives,
            default_time_layout: self
                .default_time_layout
                .unwrap_or_else(|| DEFAULT_TIME_LAYOUT.to_string()),
            strict_data_type_check: self.strict_data_type_check.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_context_has_null_evaluator_and_strict_checking() {
        let ctx = Context::default();
        assert!(!ctx.evaluator().has_macro("anything"));
        assert!(ctx.strict_data_type_check());
    }

    #[test]
    fn builder_overrides_defaults() {
        let ctx = Context::builder()
            .strict_data_type_check(false)
            .default_time_layout("%Y-%m-%d")
            .build();
        assert!(!ctx.strict_data_type_check());
        assert_eq!(ctx.default_time_layout(), "%Y-%m-%d");
    }
}
