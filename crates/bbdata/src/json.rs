//! Conversion between data trees and JSON.
//!
//! JSON has fewer types than the tree, so writing narrows every value onto
//! the JSON-safe set (map, list, double, long, int, boolean, string) and
//! reading picks the narrowest node that holds the JSON value.
//!
//! # Example
//!
//! ```
//! use bbdata::DataView;
//! use bbdata::json::{from_json, to_json};
//!
//! let value = from_json(r#"{"name": "alice", "age": 30}"#).unwrap();
//! assert_eq!(value.get_map().unwrap().get_int("age"), Some(30));
//!
//! let json = to_json(&value).unwrap();
//! assert_eq!(json, r#"{"name":"alice","age":30}"#);
//! ```
//!
//! # Node to JSON Mapping
//!
//! | Node                      | JSON                                  |
//! |---------------------------|---------------------------------------|
//! | null                      | null                                  |
//! | bool                      | true/false                            |
//! | byte, short, int          | integer (reads back as int)           |
//! | long                      | integer (reads back as int if it fits)|
//! | float, double             | number                                |
//! | char, string              | string                                |
//! | byte array                | string with `b64:` prefix             |
//! | other arrays, list        | array                                 |
//! | map                       | object (key order kept)               |

use base64::Engine;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::list::DataList;
use crate::map::DataMap;
use crate::node::Node;
use crate::value::DataValue;

/// Parse a JSON document into a holder. A top-level `null` yields an empty
/// holder.
///
/// # Errors
///
/// Returns `Error::JsonParse` if the JSON is invalid.
pub fn from_json(json: &str) -> Result<DataValue> {
    let json_value: JsonValue =
        serde_json::from_str(json).map_err(|e| Error::JsonParse(e.to_string()))?;
    Ok(match json_value {
        JsonValue::Null => DataValue::new(),
        other => DataValue::of(from_json_value(&other)),
    })
}

/// Convert a JSON value into a node.
#[must_use]
pub fn from_json_value(value: &JsonValue) -> Node {
    match value {
        JsonValue::Null => Node::Null,
        JsonValue::Bool(b) => Node::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map_or(Node::Long(i), Node::Int)
            } else {
                // u64 above i64::MAX and non-integers
                Node::Double(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => {
            if let Some(b64_payload) = s.strip_prefix("b64:")
                && let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(b64_payload)
            {
                return Node::ByteArray(bytes.into_iter().map(|b| b as i8).collect());
            }
            Node::String(s.clone())
        }
        JsonValue::Array(items) => Node::List(items.iter().map(from_json_value).collect()),
        JsonValue::Object(obj) => Node::Map(
            obj.iter()
                .map(|(key, value)| (key.as_str(), from_json_value(value)))
                .collect(),
        ),
    }
}

/// Serialize a holder to a compact JSON string. An empty holder is `null`.
///
/// # Errors
///
/// Returns `Error::NonFiniteFloat` if the tree holds NaN or infinity.
pub fn to_json(value: &DataValue) -> Result<String> {
    let json_value = match value.get() {
        Some(node) => to_json_value(node)?,
        None => JsonValue::Null,
    };
    serde_json::to_string(&json_value).map_err(|e| Error::JsonSerialize(e.to_string()))
}

fn float_to_json(f: f64) -> Result<JsonValue> {
    serde_json::Number::from_f64(f)
        .map(JsonValue::Number)
        .ok_or(Error::NonFiniteFloat(f))
}

fn numbers_to_json<T: Copy + Into<JsonValue>>(values: &[T]) -> JsonValue {
    JsonValue::Array(values.iter().map(|&v| v.into()).collect())
}

fn floats_to_json<T: Copy + Into<f64>>(values: &[T]) -> Result<JsonValue> {
    values
        .iter()
        .map(|&v| float_to_json(v.into()))
        .collect::<Result<Vec<_>>>()
        .map(JsonValue::Array)
}

/// Convert a node into a JSON value.
///
/// # Errors
///
/// Returns `Error::NonFiniteFloat` if the node holds NaN or infinity.
pub fn to_json_value(node: &Node) -> Result<JsonValue> {
    let json = match node {
        Node::Null => JsonValue::Null,
        Node::Bool(b) => JsonValue::Bool(*b),
        Node::Byte(v) => JsonValue::from(i32::from(*v)),
        Node::Short(v) => JsonValue::from(i32::from(*v)),
        Node::Int(v) => JsonValue::from(*v),
        Node::Long(v) => JsonValue::from(*v),
        Node::Float(v) => float_to_json(f64::from(*v))?,
        Node::Double(v) => float_to_json(*v)?,
        Node::Char(c) => JsonValue::String(c.to_string()),
        Node::String(s) => JsonValue::String(s.clone()),
        Node::ByteArray(bytes) => {
            let raw: Vec<u8> = bytes.iter().map(|&b| b as u8).collect();
            let encoded = base64::engine::general_purpose::STANDARD.encode(raw);
            JsonValue::String(format!("b64:{encoded}"))
        }
        Node::BoolArray(a) => numbers_to_json(a),
        Node::ShortArray(a) => numbers_to_json(a),
        Node::IntArray(a) => numbers_to_json(a),
        Node::LongArray(a) => numbers_to_json(a),
        Node::FloatArray(a) => floats_to_json(a)?,
        Node::DoubleArray(a) => floats_to_json(a)?,
        Node::Map(map) => map_to_json(map)?,
        Node::List(list) => list_to_json(list)?,
    };
    Ok(json)
}

fn map_to_json(map: &DataMap) -> Result<JsonValue> {
    let mut obj = serde_json::Map::with_capacity(map.iter().len());
    for (key, value) in map {
        obj.insert(key.clone(), to_json_value(value)?);
    }
    Ok(JsonValue::Object(obj))
}

fn list_to_json(list: &DataList) -> Result<JsonValue> {
    list.iter()
        .map(to_json_value)
        .collect::<Result<Vec<_>>>()
        .map(JsonValue::Array)
}
