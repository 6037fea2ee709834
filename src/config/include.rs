//! `_include` expansion.
//!
//! Runs while layers are loaded, before any merging across top-level layers,
//! so the resolution pass only ever sees `_ref` directives and string tokens.

use super::merge::deep_merge_all;
use super::processor::Processor;
use super::types::{INCLUDE_KEY, Location, Node, directive_arg};
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use tracing::debug;

impl Processor {
    /// Load one locator and expand every include inside it.
    ///
    /// `at` is where the layer will sit in the final tree and is only used
    /// in error messages. `include_stack` holds the locators currently being
    /// expanded.
    pub(crate) fn load_layer(
        &self,
        locator: &Node,
        at: &Location,
        include_stack: &mut Vec<String>,
    ) -> ConfigResult<Node> {
        let raw = self.parse_and_load(locator)?;
        self.expand_includes(raw, at, include_stack)
    }

    fn expand_includes(
        &self,
        node: Node,
        location: &Location,
        include_stack: &mut Vec<String>,
    ) -> ConfigResult<Node> {
        if let Some(arg) = directive_arg(&node, INCLUDE_KEY) {
            return self.expand_include(arg, location, include_stack);
        }

        match node {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    let child_location = location.child(key.as_str());
                    out.insert(
                        key,
                        self.expand_includes(child, &child_location, include_stack)?,
                    );
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, child)| {
                    self.expand_includes(child, &location.child(index.to_string()), include_stack)
                })
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }

    /// Replace an `_include` directive with the merge of its locators.
    fn expand_include(
        &self,
        arg: &Node,
        location: &Location,
        include_stack: &mut Vec<String>,
    ) -> ConfigResult<Node> {
        let invalid = || ConfigError::InvalidIncludeDirective {
            location: location.to_string(),
        };

        let locators = arg
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|entry| entry.as_str().ok_or_else(invalid))
            .collect::<ConfigResult<Vec<_>>>()?;

        let mut layers = Vec::with_capacity(locators.len());
        for locator in locators {
            if include_stack.iter().any(|active| active == locator) {
                return Err(ConfigError::CyclicInclude {
                    locator: locator.to_string(),
                });
            }

            debug!(%location, locator, "expanding _include");
            include_stack.push(locator.to_string());
            let layer = self.load_layer(&Value::String(locator.to_string()), location, include_stack);
            include_stack.pop();
            layers.push(layer?);
        }

        Ok(deep_merge_all(layers))
    }
}
