//! Deep merge of configuration layers.
//!
//! Mappings are merged key-by-key; every other value is replaced atomically
//! by the later layer. Sequences are never merged element-wise.

use super::types::Node;
use serde_json::Value;

/// Deep merge two nodes, with `overlay` taking precedence over `base`.
///
/// - Mappings are merged recursively: keys in overlay override keys in base
/// - Sequences, strings, numbers, booleans and nulls replace the base value
///
/// # Example
/// ```
/// use serde_json::json;
/// use appconf::config::deep_merge;
///
/// let base = json!({"a": 1, "b": {"x": 1, "y": 2}});
/// let overlay = json!({"b": {"y": 3, "z": 4}});
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({"a": 1, "b": {"x": 1, "y": 3, "z": 4}}));
/// ```
pub fn deep_merge(base: Node, overlay: Node) -> Node {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge multiple layers in order, with later layers taking precedence.
///
/// An empty list merges to `null`.
pub fn deep_merge_all(layers: impl IntoIterator<Item = Node>) -> Node {
    layers.into_iter().fold(Value::Null, deep_merge)
}
