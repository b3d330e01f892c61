//! The directive model (spec.md §3-4.7): a per-subtree bag of comparison
//! policies extracted from expected maps via reserved `@`-prefixed keys.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::value::Value;

/// The declared type for a `@dataType/<field>` coercion hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
    Bool,
    String,
    Time,
}

impl DataType {
    fn parse(name: &str) -> Option<DataType> {
        match name {
            "int" | "integer" => Some(DataType::Int),
            "float" | "number" => Some(DataType::Float),
            "bool" | "boolean" => Some(DataType::Bool),
            "string" | "text" => Some(DataType::String),
            "time" | "datetime" => Some(DataType::Time),
            _ => None,
        }
    }

    /// Coerces `value` to this declared type, per spec.md §3's `Apply`.
    /// Returns `None` when the coercion cannot be performed; callers treat
    /// that as a swallowed failure (spec.md §7) and keep the original.
    pub fn coerce(self, value: &Value, time_layout: &str) -> Option<Value> {
        match self {
            DataType::Int => value.to_int().map(Value::Int),
            DataType::Float => value.to_float().map(Value::Float),
            DataType::Bool => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Text(s) => s.trim().parse::<bool>().ok().map(Value::Bool),
                _ => None,
            },
            DataType::String => Some(Value::Text(value.render())),
            DataType::Time => value.to_time(time_layout).map(Value::Time),
        }
    }
}

/// Reserved directive key prefix (spec.md §6).
const PREFIX: &str = "@";
const DATA_TYPE_PREFIX: &str = "@dataType/";

/// A per-subtree bag of comparison policies (spec.md §3 `Directive` table).
///
/// Every field is internally `Option`-wrapped so [`Directive::merge_from`]
/// can tell "explicitly set here" apart from "inherit from parent" per the
/// documented merge rule in spec.md §9: "any child field explicitly set
/// wins; else inherit".
#[derive(Debug, Clone, Default)]
pub struct Directive {
    source: Option<String>,
    switch_by: Option<Vec<String>>,
    index_by: Option<Vec<String>>,
    key_exists: Option<HashSet<String>>,
    key_does_not_exist: Option<HashSet<String>>,
    case_sensitive: Option<bool>,
    sort_text: Option<bool>,
    data_types: Option<HashMap<String, DataType>>,
    default_time_layout: Option<String>,
    strict_data_type_check: Option<bool>,
}

impl Directive {
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn switch_by(&self) -> &[String] {
        self.switch_by.as_deref().unwrap_or(&[])
    }

    pub fn index_by(&self) -> &[String] {
        self.index_by.as_deref().unwrap_or(&[])
    }

    pub fn key_exists(&self) -> Option<&HashSet<String>> {
        self.key_exists.as_ref()
    }

    pub fn key_does_not_exist(&self) -> Option<&HashSet<String>> {
        self.key_does_not_exist.as_ref()
    }

    /// Default `true`: map keys in the subtree are compared as written.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive.unwrap_or(true)
    }

    /// Default `false`: slices are compared element-wise by position.
    pub fn sort_text(&self) -> bool {
        self.sort_text.unwrap_or(false)
    }

    pub fn data_types(&self) -> Option<&HashMap<String, DataType>> {
        self.data_types.as_ref()
    }

    pub fn default_time_layout<'a>(&'a self, context_default: &'a str) -> &'a str {
        self.default_time_layout.as_deref().unwrap_or(context_default)
    }

    pub fn strict_data_type_check(&self, context_default: bool) -> bool {
        self.strict_data_type_check.unwrap_or(context_default)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_switch_by(mut self, fields: Vec<String>) -> Self {
        self.switch_by = Some(fields);
        self
    }

    pub fn with_index_by(mut self, fields: Vec<String>) -> Self {
        self.index_by = Some(fields);
        self
    }

    pub fn with_key_exists(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.key_exists = Some(keys.into_iter().collect());
        self
    }

    pub fn with_key_does_not_exist(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.key_does_not_exist = Some(keys.into_iter().collect());
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    pub fn with_sort_text(mut self, sort_text: bool) -> Self {
        self.sort_text = Some(sort_text);
        self
    }

    pub fn with_default_time_layout(mut self, layout: impl Into<String>) -> Self {
        self.default_time_layout = Some(layout.into());
        self
    }

    pub fn with_strict_data_type_check(mut self, strict: bool) -> Self {
        self.strict_data_type_check = Some(strict);
        self
    }

    /// Merges `self` (the child, e.g. freshly extracted from an expected
    /// map) on top of `parent` (the ancestor directive): any field `self`
    /// set explicitly wins, otherwise `parent`'s value is inherited.
    pub fn merge_from(&self, parent: &Directive) -> Directive {
        Directive {
            source: self.source.clone().or_else(|| parent.source.clone()),
            switch_by: self.switch_by.clone().or_else(|| parent.switch_by.clone()),
            index_by: self.index_by.clone().or_else(|| parent.index_by.clone()),
            key_exists: self.key_exists.clone().or_else(|| parent.key_exists.clone()),
            key_does_not_exist: self
                .key_does_not_exist
                .clone()
                .or_else(|| parent.key_does_not_exist.clone()),
            case_sensitive: self.case_sensitive.or(parent.case_sensitive),
            sort_text: self.sort_text.or(parent.sort_text),
            data_types: self.data_types.clone().or_else(|| parent.data_types.clone()),
            default_time_layout: self
                .default_time_layout
                .clone()
                .or_else(|| parent.default_time_layout.clone()),
            strict_data_type_check: self
                .strict_data_type_check
                .or(parent.strict_data_type_check),
        }
    }

    /// Rewrites `map`'s entries per `DataTypes`, the `Apply` operation of
    /// spec.md §3. Coercion failures are swallowed (spec.md §7): a
    /// `tracing::warn!` is emitted and the original value is kept.
    pub fn apply(&self, map: &mut BTreeMap<String, Value>, time_layout: &str) {
        let Some(data_types) = &self.data_types else {
            return;
        };
        for (field, declared) in data_types {
            if let Some(current) = map.get(field) {
                match declared.coerce(current, time_layout) {
                    Some(coerced) => {
                        map.insert(field.clone(), coerced);
                    }
                    None => {
                        tracing::warn!(
                            field = %field,
                            declared = ?declared,
                            "directive data-type coercion failed; comparing uncoerced value"
                        );
                    }
                }
            }
        }
    }
}

/// Removes recognised `@`-prefixed keys from `map`, returning the
/// extracted directive and whether any recognised keys were present
/// (spec.md §3 `ExtractDirectives`).
pub fn extract_directives(map: &mut BTreeMap<String, Value>) -> (Directive, bool) {
    let mut directive = Directive::default();
    let mut found = false;

    let keys: Vec<String> = map
        .keys()
        .filter(|k| k.starts_with(PREFIX))
        .cloned()
        .collect();

    for key in keys {
        let Some(value) = map.remove(&key) else {
            continue;
        };
        found = true;

        if let Some(field) = key.strip_prefix(DATA_TYPE_PREFIX) {
            if let Some(type_name) = value.as_str().and_then(DataType::parse) {
                directive
                    .data_types
                    .get_or_insert_with(HashMap::new)
                    .insert(field.to_string(), type_name);
            }
            continue;
        }

        match key.as_str() {
            "@source" => {
                if let Some(s) = value.as_str() {
                    directive.source = Some(s.to_string());
                }
            }
            "@switchBy" => {
                directive.switch_by = Some(string_list(&value));
            }
            "@indexBy" => {
                directive.index_by = Some(string_list(&value));
            }
            "@keyExists" => {
                directive.key_exists = Some(string_list(&value).into_iter().collect());
            }
            "@keyDoesNotExist" => {
                directive.key_does_not_exist = Some(string_list(&value).into_iter().collect());
            }
            "@caseSensitive" => {
                if let Value::Bool(b) = value {
                    directive.case_sensitive = Some(b);
                }
            }
            "@sortText" => {
                if let Value::Bool(b) = value {
                    directive.sort_text = Some(b);
                }
            }
            "@timeLayout" => {
                if let Some(s) = value.as_str() {
                    directive.default_time_layout = Some(s.to_string());
                }
            }
            "@strictDataTypeCheck" => {
                if let Value::Bool(b) = value {
                    directive.strict_data_type_check = Some(b);
                }
            }
            _ => {}
        }
    }

    (directive, found)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::List(items) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
        Value::Text(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// A registry mapping path patterns to directives declared by the test
/// author (spec.md §4.7), consulted by [`crate::path::DataPath::match_directive`].
#[derive(Debug, Clone, Default)]
pub struct DirectiveRegistry {
    by_path: HashMap<String, Directive>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a directive to apply at and below `path_prefix`.
    pub fn register(&mut self, path_prefix: impl Into<String>, directive: Directive) {
        self.by_path.insert(path_prefix.into(), directive);
    }

    /// Resolves the effective directive for `path` by merging registered
    /// directives along its ancestor chain, longest-prefix first, so a
    /// more specific registration overrides a more general one while still
    /// inheriting any field the specific one left unset.
    pub fn resolve(&self, path: &str) -> Directive {
        let mut matches: Vec<&str> = self
            .by_path
            .keys()
            .map(String::as_str)
            .filter(|candidate| path == *candidate || path.starts_with(&format!("{candidate}/")))
            .collect();
        // Longest (most specific) prefix first.
        matches.sort_by_key(|p| std::cmp::Reverse(p.len()));

        let mut resolved = Directive::default();
        // Fold from least to most specific so the most specific wins.
        for candidate in matches.into_iter().rev() {
            let directive = &self.by_path[candidate];
            resolved = directive.merge_from(&resolved);
        }
        resolved
    }
}
