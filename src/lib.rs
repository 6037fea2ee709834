//! Layered configuration library.
//!
//! This module exports the core components for embedding and testing.

pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod format;
pub mod loaders;
