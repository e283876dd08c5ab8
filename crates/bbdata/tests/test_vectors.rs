//! Tests using the `vectors/values.json` wire vectors.

use bbdata::{decode, encode, json};
use serde::Deserialize;

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

#[derive(Deserialize)]
struct TestVectors {
    values: Vec<ValueTest>,
    errors: Vec<ErrorTest>,
}

#[derive(Deserialize)]
struct ValueTest {
    description: String,
    bytes: String,
    json: serde_json::Value,
    /// The encoder writes exactly these bytes back.
    canonical: bool,
}

#[derive(Deserialize)]
struct ErrorTest {
    description: String,
    bytes: String,
    /// Name of the expected `Error` variant.
    error: String,
}

fn load_test_vectors() -> TestVectors {
    let json = include_str!("vectors/values.json");
    serde_json::from_str(json).expect("Failed to parse test vectors")
}

#[test]
fn test_value_vectors_decode() {
    let vectors = load_test_vectors();

    for test in &vectors.values {
        let bytes = hex_to_bytes(&test.bytes);
        let value = decode::decode_slice(&bytes)
            .unwrap_or_else(|e| panic!("decode failed for '{}': {}", test.description, e));

        let actual = match value.get() {
            Some(node) => json::to_json_value(node).unwrap(),
            None => serde_json::Value::Null,
        };
        assert_eq!(actual, test.json, "Wrong value for '{}'", test.description);
    }
}

#[test]
fn test_value_vectors_encode() {
    let vectors = load_test_vectors();

    for test in vectors.values.iter().filter(|t| t.canonical) {
        let expected = hex_to_bytes(&test.bytes);
        let value = decode::decode_slice(&expected).unwrap();
        let actual = encode::to_bytes(&value).unwrap();

        assert_eq!(
            actual, expected,
            "Byte mismatch for '{}'\nExpected: {:02x?}\nActual:   {:02x?}",
            test.description, expected, actual
        );
    }
}

#[test]
fn test_error_vectors() {
    let vectors = load_test_vectors();

    for test in &vectors.errors {
        let bytes = hex_to_bytes(&test.bytes);
        match decode::decode_slice(&bytes) {
            Ok(value) => panic!("expected {} for '{}', got {value:?}", test.error, test.description),
            Err(err) => assert!(
                format!("{err:?}").starts_with(&test.error),
                "expected {} for '{}', got {err:?}",
                test.error,
                test.description
            ),
        }
    }
}
