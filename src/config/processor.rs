//! Configuration processor: loader registry and the `load` entry point.

use super::locator::{Loader, Locator};
use super::merge::deep_merge_all;
use super::resolve::resolve;
use super::types::{Location, Node, ProcessorConfig, type_name};
use crate::error::{ConfigError, ConfigResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads, merges and resolves configuration layers.
///
/// The loader registry is only mutated through `&mut self`, so a built
/// processor can be shared between threads. Every `load` call works on its
/// own tree.
#[derive(Clone)]
pub struct Processor {
    loaders: HashMap<String, Arc<dyn Loader>>,
    disable_processing: bool,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.loaders.keys().collect();
        names.sort();
        f.debug_struct("Processor")
            .field("loaders", &names)
            .field("disable_processing", &self.disable_processing)
            .finish()
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            loaders: config.loaders,
            disable_processing: config.disable_processing,
        }
    }

    /// Register a loader under `name`, replacing any previous one.
    pub fn register_loader(&mut self, name: impl Into<String>, loader: impl Loader + 'static) {
        let name = name.into();
        if self
            .loaders
            .insert(name.clone(), Arc::new(loader))
            .is_some()
        {
            warn!(loader = %name, "replaced previously registered loader");
        }
    }

    /// Check whether a loader is registered under `name`.
    pub fn has_loader(&self, name: &str) -> bool {
        self.loaders.contains_key(name)
    }

    /// Turn one locator into a raw tree node.
    ///
    /// Mappings are literal layers and come back unchanged. Strings are
    /// parsed as `loaderName:bareLocator` and passed to the named loader.
    /// Includes in the result are not expanded.
    pub fn parse_and_load(&self, locator: &Node) -> ConfigResult<Node> {
        match locator {
            Value::Object(_) => Ok(locator.clone()),
            Value::String(text) => {
                let parsed = Locator::parse(text)?;
                let loader =
                    self.loaders
                        .get(&parsed.name)
                        .ok_or_else(|| ConfigError::LoaderNotFound {
                            name: parsed.name.clone(),
                        })?;
                debug!(locator = %parsed, "loading configuration layer");
                loader.load(&parsed).map_err(ConfigError::Loader)
            }
            other => Err(ConfigError::LocatorTypeInvalid {
                found: type_name(other),
            }),
        }
    }

    /// Load every locator, merge them in order and resolve the result.
    ///
    /// Later locators override earlier ones. Each locator must produce a
    /// mapping.
    pub fn load(&self, locators: &[Node]) -> ConfigResult<Map<String, Value>> {
        if locators.is_empty() {
            return Err(ConfigError::NoLocators);
        }

        let mut layers = Vec::with_capacity(locators.len());
        for locator in locators {
            let mut include_stack = Vec::new();
            if let Value::String(text) = locator {
                include_stack.push(text.clone());
            }

            let layer = self.load_layer(locator, &Location::root(), &mut include_stack)?;
            if !layer.is_object() {
                return Err(ConfigError::InvalidConfigType {
                    locator: describe_locator(locator),
                    found: type_name(&layer),
                });
            }
            layers.push(layer);
        }

        debug!(layers = layers.len(), "merging configuration layers");
        let merged = deep_merge_all(layers);

        let config = if self.disable_processing {
            merged
        } else {
            resolve(&merged)?
        };

        match config {
            Value::Object(map) => Ok(map),
            other => Err(ConfigError::InvalidConfigType {
                locator: "<merged>".to_string(),
                found: type_name(&other),
            }),
        }
    }
}

fn describe_locator(locator: &Node) -> String {
    match locator {
        Value::String(text) => text.clone(),
        _ => "<literal map>".to_string(),
    }
}
