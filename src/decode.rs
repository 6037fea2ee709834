//! Decoding resolved configuration into typed structures.
//!
//! Fields are matched by name, or by `#[serde(rename = "...")]` when a
//! tree key differs from the field name.

use crate::config::Node;
use crate::error::ConfigResult;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decode a resolved tree (or any subtree) into `T`.
///
/// # Example
/// ```
/// use appconf::decode::decode;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct DbConfig {
///     #[serde(rename = "server_host")]
///     host: String,
///     #[serde(rename = "server_port")]
///     port: u16,
///     dbname: String,
/// }
///
/// let raw = json!({"server_host": "stat.mydb.com", "server_port": 1234, "dbname": "stat"});
/// let db: DbConfig = decode(&raw).unwrap();
/// assert_eq!(db.host, "stat.mydb.com");
/// assert_eq!(db.port, 1234);
/// ```
pub fn decode<T: DeserializeOwned>(config: &Node) -> ConfigResult<T> {
    Ok(serde_json::from_value(config.clone())?)
}

/// Decode the mapping returned by `Processor::load`.
pub fn decode_map<T: DeserializeOwned>(config: &Map<String, Value>) -> ConfigResult<T> {
    Ok(serde_json::from_value(Value::Object(config.clone()))?)
}
