//! appconf
//!
//! Loads configuration layers from the given locators, merges them and
//! prints the resolved result.

use anyhow::{Result, bail};
use appconf::cli::Cli;
use appconf::config::{Location, Processor, ProcessorConfig, resolve_path};
use appconf::loaders::{EnvLoader, FileLoader};
use clap::Parser;
use serde_json::Value;
use std::fs::OpenOptions;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option; RUST_LOG overrides the level
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(cli.default_log_directive()))
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter())
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let mut processor = Processor::new(ProcessorConfig {
        disable_processing: cli.raw,
        ..Default::default()
    });
    let file_loader = match &cli.base_dir {
        Some(dir) => FileLoader::with_base_dir(dir),
        None => FileLoader::new(),
    };
    processor.register_loader("file", file_loader);
    processor.register_loader("env", EnvLoader);

    let locators: Vec<Value> = cli.locators.iter().cloned().map(Value::String).collect();
    debug!(count = locators.len(), "loading configuration");
    let config = Value::Object(processor.load(&locators)?);

    let output = match &cli.get {
        Some(path) => match resolve_path(&config, &Location::root(), path)? {
            Some(value) => value,
            None => bail!("path not found: {}", path),
        },
        None => &config,
    };

    println!("{}", cli.format.render(output)?.trim_end());
    Ok(())
}
