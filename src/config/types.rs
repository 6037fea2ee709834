//! Core type definitions shared by the loading and resolution passes.

use super::locator::Loader;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A configuration tree node.
///
/// Mappings are `Value::Object`, sequences are `Value::Array`, and every
/// other variant is a scalar.
pub type Node = Value;

/// Reserved key of a reference directive.
pub const REF_KEY: &str = "_ref";

/// Reserved key of an include directive.
pub const INCLUDE_KEY: &str = "_include";

/// Keys understood inside a mapping-shaped `_ref` argument.
pub(crate) const REF_NAME_KEY: &str = "name";
pub(crate) const REF_FIRST_DEFINED_KEY: &str = "firstDefined";
pub(crate) const REF_DEFAULT_KEY: &str = "default";

/// If `node` is a directive with the given reserved key, return its argument.
///
/// A directive is a mapping with exactly one key; anything else is data.
pub fn directive_arg<'a>(node: &'a Node, key: &str) -> Option<&'a Node> {
    match node {
        Value::Object(map) if map.len() == 1 => map.get(key),
        _ => None,
    }
}

/// Short type name used in error messages.
pub fn type_name(node: &Node) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Absolute position of a node within the merged tree.
///
/// Sequence indices are stored as their decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location(Vec<String>);

impl Location {
    /// The tree root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Location of a child under this one.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Ancestor `levels` steps up, or `None` when that would pass the root.
    pub fn ancestor(&self, levels: usize) -> Option<Self> {
        let depth = self.0.len().checked_sub(levels)?;
        Some(Self(self.0[..depth].to_vec()))
    }
}

impl From<Vec<String>> for Location {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0.join("."))
        }
    }
}

/// Processor configuration.
#[derive(Clone, Default)]
pub struct ProcessorConfig {
    /// Loaders available from the start, keyed by locator prefix.
    pub loaders: HashMap<String, Arc<dyn Loader>>,

    /// Skip the `_ref` and `${...}` pass; includes are still expanded.
    pub disable_processing: bool,
}

impl fmt::Debug for ProcessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.loaders.keys().collect();
        names.sort();
        f.debug_struct("ProcessorConfig")
            .field("loaders", &names)
            .field("disable_processing", &self.disable_processing)
            .finish()
    }
}
