//! Output formatting for resolved configuration.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::Value;

/// Output format for printed configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Render a value in this format.
    ///
    /// Bare strings print without quotes so `--get` output can be used
    /// directly in shell scripts.
    pub fn render(&self, value: &Value) -> Result<String> {
        if let Value::String(text) = value {
            return Ok(text.clone());
        }

        match self {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }
}
