//! Example of building, encoding and reading back a nested tree.
//!
//! cargo run --package bbdata --example nested_access

use bbdata::json::from_json;
use bbdata::{DataView, decode, encode};

fn main() -> Result<(), bbdata::Error> {
    let mut value = from_json(r#"{"users": [{"name": "Amy"}, {"name": "Bob"}]}"#)?;

    let Some(root) = value.get_map_mut() else {
        panic!("root is not a map")
    };
    root.set_at("users.1.age", 41i16)?;
    root.set_at("meta.version", "2")?;

    let bytes = encode::to_bytes(&value)?;
    println!("encoded {} bytes: {:02x?}", bytes.len(), bytes);

    let decoded = decode::decode_slice(&bytes)?;
    let Some(root) = decoded.get_map() else {
        panic!("root is not a map")
    };

    // root["users"][1]["name"]
    let name = root.get_string_at("users.1.name");
    // "2" reads back as a number
    let version = root.get_int_at("meta.version");
    println!("name={name:?} age={:?} version={version:?}", root.get_int_at("users.1.age"));

    Ok(())
}
