// SPDX-License-Identifier: Apache-2.0

//! Canonical JSON: compact, with object keys sorted at every depth. Dataset
//! versions and policy hashes are sha256 digests over these bytes, so the
//! encoding must never depend on field declaration or insertion order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&sort_keys(serde_json::to_value(value)?))
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn canonical_sha256<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    canonical_bytes(value).map(|bytes| sha256_hex(&bytes))
}

/// Digest of a sequence as newline-terminated canonical lines. Each item is
/// encoded on its own, so a large population never needs one buffer.
pub fn canonical_sha256_lines<'a, T, I>(items: I) -> Result<String, serde_json::Error>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut hasher = Sha256::new();
    for item in items {
        hasher.update(canonical_bytes(item)?);
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_are_key_sorted() {
        let bytes = canonical_bytes(&json!({"b": {"z": 1, "a": 2}, "a": [ {"y": 1, "x": 0} ]}))
            .expect("canonical bytes");
        assert_eq!(
            String::from_utf8(bytes).expect("utf8"),
            r#"{"a":[{"x":0,"y":1}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn line_digest_depends_on_item_boundaries() {
        let split = canonical_sha256_lines(&[json!("ab"), json!("c")]).expect("split");
        let joined = canonical_sha256_lines(&[json!("abc")]).expect("joined");
        assert_ne!(split, joined);
        let empty: [Value; 0] = [];
        assert_eq!(
            canonical_sha256_lines(&empty).expect("empty"),
            sha256_hex(b"")
        );
    }
}
