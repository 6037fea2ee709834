//! Locator parsing and the loader capability.
//!
//! A locator string has the form `loaderName:bareLocator`. Everything after
//! the first `:` is handed to the named loader untouched.

use super::types::Node;
use crate::error::{ConfigError, ConfigResult};
use std::fmt;

/// A parsed locator string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    /// Name of the registered loader.
    pub name: String,
    /// Loader-specific part after the first `:`.
    pub bare_locator: String,
}

impl Locator {
    /// Split a locator string on its first `:`.
    pub fn parse(locator: &str) -> ConfigResult<Self> {
        if locator.is_empty() {
            return Err(ConfigError::EmptyLocator);
        }

        let (name, bare) =
            locator
                .split_once(':')
                .ok_or_else(|| ConfigError::MissingLoaderName {
                    locator: locator.to_string(),
                })?;

        Ok(Self {
            name: name.to_string(),
            bare_locator: bare.to_string(),
        })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.bare_locator)
    }
}

/// A source of raw configuration layers.
///
/// Loaders are expected to be side-effect-free reads. Their errors are
/// returned from `Processor::load` unchanged.
pub trait Loader: Send + Sync {
    fn load(&self, locator: &Locator) -> anyhow::Result<Node>;
}

impl<F> Loader for F
where
    F: Fn(&Locator) -> anyhow::Result<Node> + Send + Sync,
{
    fn load(&self, locator: &Locator) -> anyhow::Result<Node> {
        self(locator)
    }
}
