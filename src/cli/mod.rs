//! CLI definitions for appconf
//!
//! This module defines the CLI structure using clap's derive macros.

use crate::format::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Load, merge and resolve layered configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration locators in priority order (e.g. file:base.yaml env:APP_)
    #[arg(value_name = "LOCATOR", required = true)]
    pub locators: Vec<String>,

    /// Base directory for relative file: locators
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Merge only; leave _ref directives and ${...} tokens untouched
    #[arg(long)]
    pub raw: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print only the value at this path of the result
    #[arg(short, long, value_name = "PATH")]
    pub get: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_directive(&self) -> &'static str {
        if self.verbose {
            "appconf=debug"
        } else {
            "appconf=info"
        }
    }
}
