//! Loaders shipped with the crate.
//!
//! - `MapLoader` - named in-memory layers
//! - `FileLoader` - YAML or JSON files
//! - `EnvLoader` - environment variables sharing a prefix

use crate::config::{Loader, Locator, Node};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serves layers from an in-memory table keyed by bare locator.
///
/// Unknown names load as `null`.
#[derive(Debug, Clone, Default)]
pub struct MapLoader {
    layers: HashMap<String, Node>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named layer.
    pub fn with_layer(mut self, name: impl Into<String>, layer: Node) -> Self {
        self.layers.insert(name.into(), layer);
        self
    }

    /// Build from a mapping of layer name to layer.
    pub fn from_map(layers: Map<String, Value>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }
}

impl Loader for MapLoader {
    fn load(&self, locator: &Locator) -> Result<Node> {
        Ok(self
            .layers
            .get(&locator.bare_locator)
            .cloned()
            .unwrap_or(Value::Null))
    }
}

/// Reads layers from YAML or JSON files.
///
/// `.json` files are parsed as JSON, everything else as YAML. A leading
/// `~/` expands to the home directory; other relative paths are joined to
/// the base directory when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    base_dir: Option<PathBuf>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `base_dir` instead of the working directory.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_path(&self, bare: &str) -> PathBuf {
        if let Some(rest) = bare.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }

        let path = Path::new(bare);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Loader for FileLoader {
    fn load(&self, locator: &Locator) -> Result<Node> {
        let path = self.resolve_path(&locator.bare_locator);
        debug!(path = %path.display(), "reading configuration file");

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let node = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse JSON file {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse YAML file {}", path.display()))?
        };
        Ok(node)
    }
}

/// Collects environment variables starting with the bare locator as prefix.
///
/// The prefix is stripped and names are lower-cased; `__` separates nesting
/// levels, so with prefix `APP_`, `APP_SERVER__PORT=80` becomes
/// `{"server": {"port": "80"}}`. Values stay strings.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader;

impl EnvLoader {
    /// Build a layer from explicit `(name, value)` pairs.
    pub fn collect(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Node {
        let mut root = Map::new();
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let keys: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
            insert_nested(&mut root, &keys, Value::String(value));
        }
        Value::Object(root)
    }
}

fn insert_nested(map: &mut Map<String, Value>, keys: &[String], value: Value) {
    match keys {
        [] => {}
        [last] => {
            map.insert(last.clone(), value);
        }
        [first, rest @ ..] => {
            let entry = map
                .entry(first.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_nested(child, rest, value);
            }
        }
    }
}

impl Loader for EnvLoader {
    fn load(&self, locator: &Locator) -> Result<Node> {
        Ok(Self::collect(&locator.bare_locator, std::env::vars()))
    }
}
