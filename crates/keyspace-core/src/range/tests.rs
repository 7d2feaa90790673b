use super::*;
use crate::{
    codec::{NoValue, encode_key},
    error::ErrorClass,
    store::{KvStore, MemoryStore},
};

const PREFIX: &[u8] = &[0x07];

fn lower<K: crate::codec::KeyCodec + Clone>(range: Range<K>) -> RawBounds {
    let values = range.range_values().expect("range shape should be valid");

    raw_bounds(PREFIX, &values).expect("range should lower")
}

fn keyed(key: &str) -> Vec<u8> {
    let mut bytes = PREFIX.to_vec();
    bytes.extend_from_slice(key.as_bytes());
    bytes
}

fn scan(store: &MemoryStore, range: Range<String>) -> Vec<String> {
    let values = range.range_values().expect("range shape should be valid");
    let bounds = raw_bounds(PREFIX, &values).expect("range should lower");
    let cursor = store
        .range(Some(bounds.start.as_slice()), bounds.end.as_deref(), values.direction)
        .expect("store range should open");

    Iter::<String, NoValue>::new(cursor, PREFIX.len(), &NoValue)
        .keys()
        .expect("keys should decode")
}

fn seeded_store(keys: &[&str]) -> MemoryStore {
    let mut store = MemoryStore::new();
    for key in keys {
        store.set(&keyed(key), &[]).expect("seed write");
    }
    store.set(&[0x08, b'x'], &[]).expect("foreign write");

    store
}

#[test]
fn full_range_is_bounded_by_collection_prefix() {
    let bounds = lower(Range::<u64>::new());

    assert_eq!(bounds.start, vec![0x07]);
    assert_eq!(bounds.end, Some(vec![0x08]));
}

#[test]
fn inclusive_and_exclusive_bounds_lower_as_expected() {
    let bounds = lower(Range::new().start_exclusive(5u64).end_inclusive(9u64));

    let mut start = PREFIX.to_vec();
    start.extend(encode_key(&5u64).expect("encode"));
    start.push(0x00);
    let mut end = PREFIX.to_vec();
    end.extend(encode_key(&9u64).expect("encode"));
    end.push(0x00);

    assert_eq!(bounds.start, start);
    assert_eq!(bounds.end, Some(end));
}

#[test]
fn prefix_combined_with_bounds_is_rejected() {
    let err = Range::new()
        .prefix("A".to_string())
        .start_inclusive("A1".to_string())
        .range_values()
        .expect_err("prefix with start should be rejected");

    assert_eq!(err.class, ErrorClass::InvalidIterator);
}

#[test]
fn inverted_bounds_are_rejected() {
    let values = Range::new()
        .start_inclusive(9u64)
        .end_exclusive(3u64)
        .range_values()
        .expect("shape is valid");
    let err = raw_bounds(PREFIX, &values).expect_err("inverted bounds should fail");

    assert_eq!(err.class, ErrorClass::InvalidIterator);
}

#[test]
fn prefix_range_selects_matching_keys_only() {
    let store = seeded_store(&["A1", "A2", "B1"]);

    let keys = scan(&store, Range::new().prefix("A".to_string()));

    assert_eq!(keys, vec!["A1".to_string(), "A2".to_string()]);
}

#[test]
fn descending_scan_reverses_order() {
    let store = seeded_store(&["a", "b", "c"]);

    let keys = scan(&store, Range::new().descending());

    assert_eq!(keys, vec!["c", "b", "a"]);
}

#[test]
fn exclusive_start_skips_the_bound_key() {
    let store = seeded_store(&["a", "b", "c"]);

    let keys = scan(
        &store,
        Range::new()
            .start_exclusive("a".to_string())
            .end_inclusive("c".to_string()),
    );

    assert_eq!(keys, vec!["b", "c"]);
}

#[test]
fn iterator_rejects_trailing_key_bytes() {
    let mut store = MemoryStore::new();
    let mut raw = PREFIX.to_vec();
    raw.extend_from_slice(&[0, 0, 0, 1, 0xff]);
    store.set(&raw, &[]).expect("seed write");

    let cursor = store
        .range(Some(PREFIX), Some([0x08u8].as_slice()), Direction::Asc)
        .expect("store range should open");
    let err = Iter::<u32, NoValue>::new(cursor, PREFIX.len(), &NoValue)
        .keys()
        .expect_err("partial consumption should fail");

    assert!(err.is_encoding(), "expected encoding error, got {err:?}");
}
