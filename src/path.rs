//! The data-path model (spec.md §3): an immutable identifier for every
//! position visited during comparison.
//!
//! `DataPath` is a cons-list of segments sharing structure through `Rc`, so
//! extending a path is O(1) and never mutates an ancestor's view of it —
//! the "paths are immutable; extension returns a new value" invariant.

use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::directive::Directive;

#[derive(Debug)]
enum Segment {
    Root,
    Key(Rc<Segment>, String),
    Index(Rc<Segment>, usize),
}

/// An immutable, `Rc`-shared path through a [`crate::value::Value`] tree.
#[derive(Clone)]
pub struct DataPath {
    segment: Rc<Segment>,
    source: Rc<str>,
}

impl Default for DataPath {
    fn default() -> Self {
        Self::root()
    }
}

impl DataPath {
    /// The empty path, naming the root of the tree.
    pub fn root() -> Self {
        DataPath {
            segment: Rc::new(Segment::Root),
            source: Rc::from(""),
        }
    }

    /// Extends the path with a map-key segment.
    pub fn key(&self, key: impl Into<String>) -> Self {
        DataPath {
            segment: Rc::new(Segment::Key(self.segment.clone(), key.into())),
            source: self.source.clone(),
        }
    }

    /// Extends the path with a sequence-index segment.
    pub fn index(&self, index: usize) -> Self {
        DataPath {
            segment: Rc::new(Segment::Index(self.segment.clone(), index)),
            source: self.source.clone(),
        }
    }

    /// The free-form label propagated onto failures and child paths,
    /// inherited from the nearest ancestor directive that set one.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns a copy of this path carrying a new source label.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        DataPath {
            segment: self.segment.clone(),
            source: Rc::from(source.into().as_str()),
        }
    }

    /// Renders the path as `/key[index]/nested` style text.
    pub fn path(&self) -> String {
        fn render(segment: &Segment, out: &mut String) {
            match segment {
                Segment::Root => {}
                Segment::Key(parent, key) => {
                    render(parent, out);
                    out.push('/');
                    out.push_str(key);
                }
                Segment::Index(parent, index) => {
                    render(parent, out);
                    out.push('[');
                    out.push_str(&index.to_string());
                    out.push(']');
                }
            }
        }

        let mut out = String::new();
        render(&self.segment, &mut out);
        out
    }

    /// Returns the directive built by merging the registry's directives
    /// along this path's ancestor chain, per spec.md §4.7: child fields
    /// override unset parent fields; longest-prefix match wins ties.
    pub fn match_directive(&self, ctx: &Context) -> Directive {
        ctx.directives().resolve(&self.path())
    }
}

impl fmt::Debug for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataPath({:?})", self.path())
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_empty() {
        assert_eq!(DataPath::root().path(), "");
    }

    #[test]
    fn key_renders_with_leading_slash() {
        assert_eq!(DataPath::root().key("a").path(), "/a");
    }

    #[test]
    fn nested_key_and_index_compose() {
        let p = DataPath::root().key("items").index(0).key("id");
        assert_eq!(p.path(), "/items[0]/id");
    }

    #[test]
    fn extension_does_not_mutate_parent() {
        let base = DataPath::root().key("a");
        let child = base.key("b");
        assert_eq!(base.path(), "/a");
        assert_eq!(child.path(), "/a/b");
    }

    #[test]
    fn source_is_inherited_across_extension() {
        let base = DataPath::root().with_source("fixture.json");
        let child = base.key("a").index(0);
        assert_eq!(child.source(), "fixture.json");
    }
}
