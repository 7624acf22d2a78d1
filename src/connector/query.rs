//! Query-string encoding with bracketed nested keys.
//!
//! Keys are written as-is (`filter[name]`), values are percent-encoded
//! per RFC 3986.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

/// Everything except RFC 3986 unreserved characters.
const VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encodes a JSON object as a query string, without the leading `?`.
///
/// A top-level array is keyed by index (`0=a&1=b`); scalars encode to an
/// empty string.
pub(crate) fn encode_query(value: &Value) -> String {
    let mut pairs = Vec::new();
    match value {
        Value::Object(object) => {
            for (key, value) in object {
                encode(&mut pairs, value, key);
            }
        }
        Value::Array(array) => {
            for (i, value) in array.iter().enumerate() {
                encode(&mut pairs, value, &i.to_string());
            }
        }
        _ => {}
    }
    pairs.join("&")
}

fn encode(pairs: &mut Vec<String>, value: &Value, prefix: &str) {
    match value {
        Value::Null => pairs.push(format!("{}=", prefix)),
        Value::String(s) => push_pair(pairs, prefix, s),
        Value::Bool(b) => push_pair(pairs, prefix, if *b { "true" } else { "false" }),
        Value::Number(n) => push_pair(pairs, prefix, &n.to_string()),
        Value::Array(array) => {
            for (i, value) in array.iter().enumerate() {
                encode(pairs, value, &format!("{}[{}]", prefix, i));
            }
        }
        Value::Object(object) => {
            for (key, value) in object {
                encode(pairs, value, &format!("{}[{}]", prefix, key));
            }
        }
    }
}

fn push_pair(pairs: &mut Vec<String>, key: &str, value: &str) {
    pairs.push(format!(
        "{}={}",
        key,
        utf8_percent_encode(value, VALUE_ENCODE_SET)
    ));
}
