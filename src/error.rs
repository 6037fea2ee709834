//! Structured error types for configuration loading.

use serde::Serialize;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Locator errors
    NoLocators,
    EmptyLocator,
    MissingLoaderName,
    LocatorTypeInvalid,
    LoaderNotFound,
    InvalidConfigType,

    // Directive shape errors
    InvalidRefDirective,
    ReferenceNameInvalidType,
    FirstDefinedListInvalidType,
    FirstDefinedArgumentInvalidType,
    InvalidIncludeDirective,

    // Path errors
    InvalidSliceIndex,
    IndexOutOfRange,
    RelativePathOutOfBounds,

    // Resolution errors
    ReferenceFailed,
    CyclicReference,
    CyclicInclude,

    // Pass-through errors
    LoaderError,
    DecodeError,
}

/// Errors raised while loading, merging and resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration locators specified")]
    NoLocators,

    #[error("empty configuration locator specified")]
    EmptyLocator,

    #[error("missing loader name in configuration locator: {locator}")]
    MissingLoaderName { locator: String },

    #[error("configuration locator must be of type string or map, got {found}")]
    LocatorTypeInvalid { found: &'static str },

    #[error("loader not found: {name}")]
    LoaderNotFound { name: String },

    #[error("configuration loaded from {locator} has invalid type {found}")]
    InvalidConfigType {
        locator: String,
        found: &'static str,
    },

    #[error("invalid _ref directive at {location}")]
    InvalidRefDirective { location: String },

    #[error("reference name must be of type string at {location}")]
    ReferenceNameInvalidType { location: String },

    #[error("firstDefined list must be of type array at {location}")]
    FirstDefinedListInvalidType { location: String },

    #[error("reference name in firstDefined list must be of type string at {location}")]
    FirstDefinedArgumentInvalidType { location: String },

    #[error("invalid _include directive at {location}")]
    InvalidIncludeDirective { location: String },

    #[error("invalid slice index {segment:?} in path {path:?}")]
    InvalidSliceIndex { segment: String, path: String },

    #[error("index out of range: {index} >= {len} in path {path:?}")]
    IndexOutOfRange {
        index: usize,
        len: usize,
        path: String,
    },

    #[error("relative path {path:?} ascends above the root from {location}")]
    RelativePathOutOfBounds { path: String, location: String },

    #[error("cannot resolve reference {path:?} at {location}")]
    ReferenceFailed { path: String, location: String },

    #[error("cyclic reference detected at {location}")]
    CyclicReference { location: String },

    #[error("cyclic _include of {locator}")]
    CyclicInclude { locator: String },

    /// Loader failures are passed through unchanged.
    #[error(transparent)]
    Loader(anyhow::Error),

    #[error("failed to decode configuration: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ConfigError {
    /// Get the programmatic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::NoLocators => ErrorCode::NoLocators,
            ConfigError::EmptyLocator => ErrorCode::EmptyLocator,
            ConfigError::MissingLoaderName { .. } => ErrorCode::MissingLoaderName,
            ConfigError::LocatorTypeInvalid { .. } => ErrorCode::LocatorTypeInvalid,
            ConfigError::LoaderNotFound { .. } => ErrorCode::LoaderNotFound,
            ConfigError::InvalidConfigType { .. } => ErrorCode::InvalidConfigType,
            ConfigError::InvalidRefDirective { .. } => ErrorCode::InvalidRefDirective,
            ConfigError::ReferenceNameInvalidType { .. } => ErrorCode::ReferenceNameInvalidType,
            ConfigError::FirstDefinedListInvalidType { .. } => {
                ErrorCode::FirstDefinedListInvalidType
            }
            ConfigError::FirstDefinedArgumentInvalidType { .. } => {
                ErrorCode::FirstDefinedArgumentInvalidType
            }
            ConfigError::InvalidIncludeDirective { .. } => ErrorCode::InvalidIncludeDirective,
            ConfigError::InvalidSliceIndex { .. } => ErrorCode::InvalidSliceIndex,
            ConfigError::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            ConfigError::RelativePathOutOfBounds { .. } => ErrorCode::RelativePathOutOfBounds,
            ConfigError::ReferenceFailed { .. } => ErrorCode::ReferenceFailed,
            ConfigError::CyclicReference { .. } => ErrorCode::CyclicReference,
            ConfigError::CyclicInclude { .. } => ErrorCode::CyclicInclude,
            ConfigError::Loader(_) => ErrorCode::LoaderError,
            ConfigError::Decode(_) => ErrorCode::DecodeError,
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
