// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::borrow::Borrow;
use std::collections::HashMap;

// --- define_id! macro tests ---

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId;
}

#[test]
fn define_id_new_and_as_str() {
    let id = TestId::new("abc");
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn define_id_display() {
    let id = TestId::new("hello");
    assert_eq!(format!("{}", id), "hello");
    assert_eq!(id.to_string(), "hello");
}

#[test]
fn define_id_from_string() {
    let id: TestId = String::from("owned").into();
    assert_eq!(id.as_str(), "owned");
}

#[test]
fn define_id_from_str() {
    let id: TestId = "borrowed".into();
    assert_eq!(id.as_str(), "borrowed");
}

#[test]
fn define_id_partial_eq_str() {
    let id = TestId::new("test");
    assert_eq!(id, *"test");
    assert_eq!(id, "test");
}

#[test]
fn define_id_borrow_str() {
    let id = TestId::new("key");
    let borrowed: &str = id.borrow();
    assert_eq!(borrowed, "key");
}

#[test]
fn define_id_hash_map_lookup() {
    let mut map = HashMap::new();
    map.insert(TestId::new("k"), 42);
    assert_eq!(map.get("k"), Some(&42));
}

#[test]
fn define_id_clone_and_eq() {
    let id = TestId::new("x");
    let cloned = id.clone();
    assert_eq!(id, cloned);
}

#[test]
fn define_id_serde_roundtrip() {
    let id = TestId::new("serde-test");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"serde-test\"");
    let deserialized: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, id);
}

// --- short() tests ---

#[test]
fn define_id_short_truncates() {
    let id = TestId::new("abcdefghijklmnop");
    assert_eq!(id.short(8), "abcdefgh");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::new("abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn define_id_short_returns_full_when_exact() {
    let id = TestId::new("abcdefgh");
    assert_eq!(id.short(8), "abcdefgh");
}

#[test]
fn short_id_trait_on_str() {
    use crate::id::ShortId;
    let s = "abcdefghijklmnop";
    assert_eq!(s.short(8), "abcdefgh");
    assert_eq!(s.short(100), s);
    assert_eq!("abc".short(8), "abc");
}

// --- SubmissionId tests ---

#[test]
fn submission_id_display() {
    let id = SubmissionId::new(42);
    assert_eq!(id.to_string(), "42");
}

#[test]
fn submission_id_sentinel_is_recognized() {
    assert!(SubmissionId::SENTINEL.is_sentinel());
    assert!(!SubmissionId::new(0).is_sentinel());
    assert!(!SubmissionId::new(-2).is_sentinel());
}

#[test]
fn submission_id_from_i64() {
    let id: SubmissionId = 7.into();
    assert_eq!(id, SubmissionId::new(7));
}

#[test]
fn submission_id_ordering() {
    assert!(SubmissionId::new(1) < SubmissionId::new(2));
}

#[test]
fn submission_id_serde_roundtrip() {
    let id = SubmissionId::new(99);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "99");
    let deserialized: SubmissionId = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized, id);
}

proptest::proptest! {
    #[test]
    fn submission_id_serde_roundtrips_for_any_i64(raw: i64) {
        let id = SubmissionId::new(raw);
        let json = serde_json::to_string(&id).unwrap();
        let back: SubmissionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn submission_id_is_sentinel_iff_equal_to_sentinel(raw: i64) {
        let id = SubmissionId::new(raw);
        assert_eq!(id.is_sentinel(), id == SubmissionId::SENTINEL);
    }
}
