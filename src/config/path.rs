//! Dotted path resolution.
//!
//! A path is a `.`-separated list of segments. Leading dots make it
//! relative: `N` leading dots ascend `N` levels from the location of the
//! value being resolved, so `.sibling` addresses a key of the containing
//! node. Numeric segments index into sequences.

use super::types::{Location, Node};
use crate::error::{ConfigError, ConfigResult};
use serde_json::Value;

/// A path split into its ascent count and remaining segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec<'a> {
    /// Number of leading dots.
    pub ascent: usize,
    /// Segments to descend after ascending.
    pub segments: Vec<&'a str>,
}

impl<'a> PathSpec<'a> {
    pub fn parse(path: &'a str) -> Self {
        let rest = path.trim_start_matches('.');
        let ascent = path.len() - rest.len();
        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('.').collect()
        };
        Self { ascent, segments }
    }

    pub fn is_relative(&self) -> bool {
        self.ascent > 0
    }

    /// Location the descent starts from.
    pub fn base(&self, current: &Location, path: &str) -> ConfigResult<Location> {
        if !self.is_relative() {
            return Ok(Location::root());
        }
        current
            .ancestor(self.ascent)
            .ok_or_else(|| ConfigError::RelativePathOutOfBounds {
                path: path.to_string(),
                location: current.to_string(),
            })
    }
}

/// Parse a sequence index segment and bounds-check it.
pub fn parse_index(segment: &str, len: usize, path: &str) -> ConfigResult<usize> {
    let is_numeric = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
    let index = is_numeric
        .then(|| segment.parse::<usize>().ok())
        .flatten()
        .ok_or_else(|| ConfigError::InvalidSliceIndex {
            segment: segment.to_string(),
            path: path.to_string(),
        })?;

    if index >= len {
        return Err(ConfigError::IndexOutOfRange {
            index,
            len,
            path: path.to_string(),
        });
    }
    Ok(index)
}

/// Step from `node` into the child named by `segment`.
///
/// Returns the child together with its canonical segment text, or `None`
/// when a mapping has no such key or `node` is a scalar. `path` is only used
/// for error messages.
pub fn child<'a>(
    node: &'a Node,
    segment: &str,
    path: &str,
) -> ConfigResult<Option<(&'a Node, String)>> {
    match node {
        Value::Object(map) => Ok(map.get(segment).map(|v| (v, segment.to_string()))),
        Value::Array(items) => {
            let index = parse_index(segment, items.len(), path)?;
            Ok(Some((&items[index], index.to_string())))
        }
        _ => Ok(None),
    }
}

/// Descend `segments` from `node` without interpreting directives.
pub fn descend<'a>(
    node: &'a Node,
    segments: &[&str],
    path: &str,
) -> ConfigResult<Option<&'a Node>> {
    let mut current = node;
    for segment in segments {
        match child(current, segment, path)? {
            Some((next, _)) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Find the node stored at an absolute location, if any.
pub fn node_at<'a>(root: &'a Node, location: &Location) -> Option<&'a Node> {
    node_under(root, location.segments())
}

/// Find the node reached by following canonical `segments` from `node`.
pub fn node_under<'a>(node: &'a Node, segments: &[String]) -> Option<&'a Node> {
    let mut current = node;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve `path` against `root` as seen from `current`.
///
/// `Ok(None)` means the path does not exist; whether that is fatal is up to
/// the caller. Directives on the way are not expanded.
pub fn resolve_path<'a>(
    root: &'a Node,
    current: &Location,
    path: &str,
) -> ConfigResult<Option<&'a Node>> {
    let spec = PathSpec::parse(path);
    let base = spec.base(current, path)?;
    match node_at(root, &base) {
        Some(start) => descend(start, &spec.segments, path),
        None => Ok(None),
    }
}
