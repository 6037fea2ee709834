//! `_ref` directive and `${...}` interpolation resolution.
//!
//! Works over an immutable merged tree and produces a new, fully resolved
//! tree. Each location is resolved on first demand, so values may refer
//! forward to keys defined in later layers or chain through several other
//! values. A location demanded while it is still being resolved is a cycle
//! and fails with `CyclicReference`.
//!
//! Paths that pass through a `_ref` directive follow the directive's target
//! in the raw tree instead of resolving the whole target first, so a value
//! may reach a sibling through an alias of its own parent.

use super::path::{PathSpec, child, node_under};
use super::types::{
    Location, Node, REF_DEFAULT_KEY, REF_FIRST_DEFINED_KEY, REF_KEY, REF_NAME_KEY, directive_arg,
};
use crate::error::{ConfigError, ConfigResult};
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

/// `$${expr}` (escaped) or `${expr}`.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\$?)\$\{([^}]*)\}").expect("token pattern is valid"));

/// Resolve every `_ref` directive and interpolation token in `root`.
pub fn resolve(root: &Node) -> ConfigResult<Node> {
    Resolver::new(root).resolve_at(&Location::root())
}

/// A validated `_ref` argument.
#[derive(Debug)]
struct RefDirective<'a> {
    /// Paths to try in order.
    candidates: Vec<&'a str>,
    /// Literal used when no candidate resolves.
    default: Option<&'a Node>,
}

impl<'a> RefDirective<'a> {
    /// Check the shape of a `_ref` argument before any lookup happens.
    ///
    /// A mapping must carry exactly one of `name` and `firstDefined`.
    fn parse(arg: &'a Node, location: &Location) -> ConfigResult<Self> {
        let at = || location.to_string();

        let map = match arg {
            Value::String(path) => {
                return Ok(Self {
                    candidates: vec![path.as_str()],
                    default: None,
                });
            }
            Value::Object(map) => map,
            _ => {
                return Err(ConfigError::InvalidRefDirective {
                    location: at(),
                });
            }
        };

        let candidates = match (map.get(REF_NAME_KEY), map.get(REF_FIRST_DEFINED_KEY)) {
            (Some(name), None) => {
                let name = name
                    .as_str()
                    .ok_or_else(|| ConfigError::ReferenceNameInvalidType {
                        location: at(),
                    })?;
                vec![name]
            }
            (None, Some(list)) => {
                let list = list
                    .as_array()
                    .ok_or_else(|| ConfigError::FirstDefinedListInvalidType {
                        location: at(),
                    })?;
                list.iter()
                    .map(|entry| {
                        entry
                            .as_str()
                            .ok_or_else(|| ConfigError::FirstDefinedArgumentInvalidType {
                                location: at(),
                            })
                    })
                    .collect::<ConfigResult<Vec<_>>>()?
            }
            _ => {
                return Err(ConfigError::InvalidRefDirective {
                    location: at(),
                });
            }
        };

        Ok(Self {
            candidates,
            default: map.get(REF_DEFAULT_KEY),
        })
    }
}

/// Where a `_ref` directive points.
enum RefTarget<'a> {
    /// The absolute location of the first candidate that exists.
    Path(Location),
    /// No candidate exists; the default literal stands in.
    Default(&'a Node),
}

struct Resolver<'a> {
    root: &'a Node,
    /// Resolved strings and directives by absolute location.
    resolved: HashMap<Location, Node>,
    /// Locations on the current demand chain.
    in_progress: HashSet<Location>,
    /// Directives whose target is currently being followed.
    following: HashSet<Location>,
    /// Default literals standing in for directives that fell back to them.
    defaults: HashMap<Location, &'a Node>,
}

impl<'a> Resolver<'a> {
    fn new(root: &'a Node) -> Self {
        Self {
            root,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
            following: HashSet::new(),
            defaults: HashMap::new(),
        }
    }

    /// Unresolved node at `location`, seen through any default literals.
    fn raw_at(&self, location: &Location) -> Option<&'a Node> {
        let segments = location.segments();
        if !self.defaults.is_empty() {
            for depth in (0..=segments.len()).rev() {
                let prefix = Location::from(segments[..depth].to_vec());
                if let Some(default) = self.defaults.get(&prefix).copied() {
                    return node_under(default, &segments[depth..]);
                }
            }
        }
        node_under(self.root, segments)
    }

    /// Resolve the node stored at `location`.
    fn resolve_at(&mut self, location: &Location) -> ConfigResult<Node> {
        if let Some(value) = self.resolved.get(location) {
            return Ok(value.clone());
        }

        let raw = self
            .raw_at(location)
            .ok_or_else(|| ConfigError::ReferenceFailed {
                path: location.to_string(),
                location: location.to_string(),
            })?;

        if !self.in_progress.insert(location.clone()) {
            return Err(ConfigError::CyclicReference {
                location: location.to_string(),
            });
        }
        let result = self.resolve_node(raw, location);
        self.in_progress.remove(location);

        let value = result?;
        // Containers are rebuilt from their memoized leaves on demand.
        if raw.is_string() || directive_arg(raw, REF_KEY).is_some() {
            self.resolved.insert(location.clone(), value.clone());
        }
        Ok(value)
    }

    /// Resolve `raw`, which stands at `location`.
    fn resolve_node(&mut self, raw: &'a Node, location: &Location) -> ConfigResult<Node> {
        if let Some(arg) = directive_arg(raw, REF_KEY) {
            return self.resolve_ref(arg, location);
        }

        match raw {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for key in map.keys() {
                    let value = self.resolve_at(&location.child(key.as_str()))?;
                    out.insert(key.clone(), value);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => (0..items.len())
                .map(|index| self.resolve_at(&location.child(index.to_string())))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Array),
            Value::String(text) => self.interpolate(text, location).map(Value::String),
            other => Ok(other.clone()),
        }
    }

    fn resolve_ref(&mut self, arg: &'a Node, location: &Location) -> ConfigResult<Node> {
        match self.ref_target(arg, location)? {
            RefTarget::Path(target) => {
                debug!(%location, %target, "resolved _ref");
                self.resolve_at(&target)
            }
            RefTarget::Default(default) => {
                debug!(%location, "_ref fell back to default");
                self.resolve_node(default, location)
            }
        }
    }

    /// Work out where the directive at `location` points.
    ///
    /// Falling back to the default records it, so later lookups at or below
    /// `location` read the literal instead of the directive.
    fn ref_target(&mut self, arg: &'a Node, location: &Location) -> ConfigResult<RefTarget<'a>> {
        let directive = RefDirective::parse(arg, location)?;

        for path in &directive.candidates {
            if let Some(target) = self.find(location, path)? {
                return Ok(RefTarget::Path(target));
            }
        }

        if let Some(default) = directive.default {
            self.defaults.insert(location.clone(), default);
            return Ok(RefTarget::Default(default));
        }

        Err(ConfigError::ReferenceFailed {
            path: directive.candidates.join(", "),
            location: location.to_string(),
        })
    }

    /// Follow `_ref` directives from `start` until a node that is not one.
    fn dealias(&mut self, start: Location) -> ConfigResult<Option<(Location, &'a Node)>> {
        let mut location = start;
        let mut chain = Vec::new();

        let result = loop {
            let Some(node) = self.raw_at(&location) else {
                break Ok(None);
            };
            let Some(arg) = directive_arg(node, REF_KEY) else {
                break Ok(Some((location, node)));
            };
            if !self.following.insert(location.clone()) {
                break Err(ConfigError::CyclicReference {
                    location: location.to_string(),
                });
            }
            chain.push(location.clone());

            match self.ref_target(arg, &location) {
                Ok(RefTarget::Path(target)) => location = target,
                // The default literal now sits at `location`.
                Ok(RefTarget::Default(_)) => {
                    self.following.remove(&location);
                }
                Err(err) => break Err(err),
            }
        };

        for entry in &chain {
            self.following.remove(entry);
        }
        result
    }

    /// Absolute location a path addresses, or `None` if it does not exist.
    ///
    /// Every node above the last segment is dealiased first.
    fn find(&mut self, current: &Location, path: &str) -> ConfigResult<Option<Location>> {
        let spec = PathSpec::parse(path);
        let mut location = spec.base(current, path)?;

        for segment in &spec.segments {
            let Some((at, node)) = self.dealias(location)? else {
                return Ok(None);
            };
            match child(node, segment, path)? {
                Some((_, canonical)) => location = at.child(canonical),
                None => return Ok(None),
            }
        }

        Ok(self.raw_at(&location).is_some().then_some(location))
    }

    /// Resolve a path to its fully resolved value.
    fn lookup(&mut self, current: &Location, path: &str) -> ConfigResult<Option<Node>> {
        match self.find(current, path)? {
            Some(location) => self.resolve_at(&location).map(Some),
            None => Ok(None),
        }
    }

    /// Substitute `${...}` tokens in `text`.
    fn interpolate(&mut self, text: &str, location: &Location) -> ConfigResult<String> {
        if !text.contains("${") {
            return Ok(text.to_string());
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in TOKEN_RE.captures_iter(text) {
            let Some(token) = caps.get(0) else {
                continue;
            };
            out.push_str(&text[last..token.start()]);
            last = token.end();

            let escaped = caps.get(1).is_some_and(|m| m.as_str() == "$");
            let expr = caps.get(2).map_or("", |m| m.as_str());

            if escaped || expr.is_empty() {
                out.push_str("${");
                out.push_str(expr);
                out.push('}');
                continue;
            }

            let value = self
                .lookup(location, expr)?
                .ok_or_else(|| ConfigError::ReferenceFailed {
                    path: expr.to_string(),
                    location: location.to_string(),
                })?;
            push_text(&mut out, &value);
        }

        out.push_str(&text[last..]);
        Ok(out)
    }
}

/// Append the textual form of a resolved value.
fn push_text(out: &mut String, value: &Node) {
    match value {
        Value::String(s) => out.push_str(s),
        // Numbers, booleans and null print as themselves; containers as compact JSON.
        other => out.push_str(&other.to_string()),
    }
}
