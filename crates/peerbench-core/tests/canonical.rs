// SPDX-License-Identifier: Apache-2.0

use peerbench_core::canonical;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn canonical_bytes_are_key_order_deterministic() {
    let a = json!({"z": 2, "a": 1});
    let b = json!({"a": 1, "z": 2});
    let ba = canonical::canonical_bytes(&a).expect("canonical a");
    let bb = canonical::canonical_bytes(&b).expect("canonical b");
    assert_eq!(ba, bb);
}

#[test]
fn sha256_matches_known_vector() {
    assert_eq!(
        canonical::sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn canonical_hash_ignores_nested_key_order() {
    let h1 = canonical::canonical_sha256(&json!({"k2": 2, "k1": 1, "nested": {"b": 2, "a": 1}}))
        .expect("hash1");
    let h2 = canonical::canonical_sha256(&json!({"nested": {"a": 1, "b": 2}, "k1": 1, "k2": 2}))
        .expect("hash2");
    assert_eq!(h1, h2);
}

#[test]
fn line_digest_matches_hashing_the_joined_lines() {
    let rows = [json!({"b": 1, "a": 2}), json!([3, 4])];
    let expected = canonical::sha256_hex(b"{\"a\":2,\"b\":1}\n[3,4]\n");
    assert_eq!(canonical::canonical_sha256_lines(&rows).expect("lines"), expected);
}

proptest! {
    #[test]
    fn sha256_is_64_lower_hex(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let hex = canonical::sha256_hex(&bytes);
        prop_assert_eq!(hex.len(), 64);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
