use super::*;
use crate::{
    codec::{Cbor, Json, KeyAsValue},
    config::{Config, Limits},
    error::{ErrorClass, InternalError},
    key::{Pair, PairRange},
    range::Range,
    schema::SchemaBuilder,
    store::{KvStore, MemoryStore},
    test_support::{Person, builder, store},
};

fn string_map(builder: &mut SchemaBuilder) -> Map<String, Json<u32>> {
    Map::new(builder, 0x01u8, "scores", Json::new())
}

fn seeded(map: &Map<String, Json<u32>>, keys: &[&str]) -> MemoryStore {
    let mut store = store();
    for (i, key) in keys.iter().enumerate() {
        map.set(&mut store, &(*key).to_string(), &u32::try_from(i).expect("small index"))
            .expect("seed write");
    }

    store
}

// ----------------------------------------------------------------------
// Map
// ----------------------------------------------------------------------

#[test]
fn map_get_missing_key_is_not_found() {
    let map = string_map(&mut builder());
    let store = store();

    let err = map
        .get(&store, &"ghost".to_string())
        .expect_err("missing key should fail");

    assert!(err.is_not_found());
    assert!(err.message.contains("ghost"), "message should name the key: {err}");
    assert_eq!(map.try_get(&store, &"ghost".to_string()).expect("try_get"), None);
}

#[test]
fn map_set_get_remove_round_trip() {
    let map: Map<u64, Cbor<Person>> = Map::new(&mut builder(), 0x02u8, "people", Cbor::new());
    let mut store = store();
    let alice = Person::new("alice", "milan", "a@x.io", 31);

    map.set(&mut store, &7, &alice).expect("set");
    assert_eq!(map.get(&store, &7).expect("get"), alice);
    assert!(map.has(&store, &7).expect("has"));

    map.remove(&mut store, &7).expect("remove");
    assert!(!map.has(&store, &7).expect("has after remove"));
    map.remove(&mut store, &7).expect("removing a missing key is a no-op");
}

#[test]
fn map_prefix_iteration_selects_matching_keys() {
    let map = string_map(&mut builder());
    let store = seeded(&map, &["A1", "A2", "B1"]);

    let keys = map
        .iterate(&store, Range::new().prefix("A".to_string()))
        .expect("iterate")
        .keys()
        .expect("keys");

    assert_eq!(keys, vec!["A1", "A2"]);
}

#[test]
fn map_iteration_stays_inside_its_prefix() {
    let mut builder = builder();
    let scores = string_map(&mut builder);
    let other: Map<String, Json<u32>> = Map::new(&mut builder, 0x02u8, "other", Json::new());
    let mut store = seeded(&scores, &["a", "b"]);
    other.set(&mut store, &"c".to_string(), &9).expect("set other");

    let entries = scores.iter(&store).expect("iter").key_values().expect("entries");

    assert_eq!(entries, vec![("a".to_string(), 0), ("b".to_string(), 1)]);
}

#[test]
fn map_descending_range_with_bounds() {
    let map: Map<u32, Json<u32>> = Map::new(&mut builder(), 0x03u8, "numbers", Json::new());
    let mut store = store();
    for n in 1..=6u32 {
        map.set(&mut store, &n, &(n * 10)).expect("set");
    }

    let values = map
        .iterate(
            &store,
            Range::new().start_exclusive(2).end_inclusive(5).descending(),
        )
        .expect("iterate")
        .values()
        .expect("values");

    assert_eq!(values, vec![50, 40, 30]);
}

#[test]
fn map_walk_stops_early_and_propagates_errors() {
    let map = string_map(&mut builder());
    let store = seeded(&map, &["a", "b", "c"]);

    let mut seen = Vec::new();
    map.walk::<_, InternalError, _>(&store, Range::new(), |key, _| {
        seen.push(key);
        Ok(seen.len() == 2)
    })
    .expect("walk");
    assert_eq!(seen, vec!["a", "b"]);

    let err = map
        .walk(&store, Range::new(), |_, _| {
            Err(InternalError::collection_unsupported("stop"))
        })
        .expect_err("callback error should propagate");
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn map_clear_removes_only_the_range() {
    let map = string_map(&mut builder());
    let mut store = seeded(&map, &["A1", "A2", "B1"]);

    let removed = map
        .clear(&mut store, Range::new().prefix("A".to_string()))
        .expect("clear");

    assert_eq!(removed, 2);
    assert_eq!(map.iter(&store).expect("iter").keys().expect("keys"), vec!["B1"]);
}

#[test]
fn map_iterate_raw_uses_relative_bounds() {
    let map = string_map(&mut builder());
    let store = seeded(&map, &["a", "b", "c"]);

    let keys = map
        .iterate_raw(&store, Some(b"b".as_slice()), None, crate::store::Direction::Asc)
        .expect("iterate_raw")
        .keys()
        .expect("keys");

    assert_eq!(keys, vec!["b", "c"]);
}

#[test]
fn map_genesis_round_trips_through_json() {
    let mut builder = builder();
    let source: Map<Pair<String, u64>, Json<String>> =
        Map::new(&mut builder, 0x01u8, "source", Json::new());
    let target: Map<Pair<String, u64>, Json<String>> =
        Map::new(&mut builder, 0x02u8, "target", Json::new());
    let mut store = store();

    source
        .set(&mut store, &Pair::new("milan".to_string(), 1), &"duomo".to_string())
        .expect("set");
    source
        .set(&mut store, &Pair::new("rome".to_string(), 2), &"colosseo".to_string())
        .expect("set");

    let mut buf = Vec::new();
    assert_eq!(source.export_genesis(&store, &mut buf).expect("export"), 2);

    let json: serde_json::Value = serde_json::from_slice(&buf).expect("valid json");
    assert_eq!(json[0]["key"], serde_json::json!(["milan", "1"]));
    assert_eq!(json[0]["value"], serde_json::json!("duomo"));

    assert_eq!(target.import_genesis(&mut store, buf.as_slice()).expect("import"), 2);
    assert_eq!(
        target
            .get(&store, &Pair::new("rome".to_string(), 2))
            .expect("imported"),
        "colosseo"
    );
}

#[test]
fn map_rejects_values_over_the_limit() {
    let config = Config {
        limits: Limits {
            max_key_bytes: 8,
            max_value_bytes: 4,
        },
    };
    let mut builder = SchemaBuilder::new(config);
    let map: Map<String, Json<String>> = Map::new(&mut builder, 0x01u8, "small", Json::new());
    let mut store = store();

    let err = map
        .set(&mut store, &"k".to_string(), &"too long".to_string())
        .expect_err("large value should fail");
    assert_eq!(err.class, ErrorClass::Unsupported);

    let err = map
        .set(&mut store, &"a-very-long-key".to_string(), &"v".to_string())
        .expect_err("large key should fail");
    assert_eq!(err.class, ErrorClass::Unsupported);
    assert!(store.is_empty());
}

#[test]
fn pair_range_iterates_one_first_part() {
    let map: Map<Pair<String, u64>, Json<u32>> =
        Map::new(&mut builder(), 0x04u8, "visits", Json::new());
    let mut store = store();
    for (city, id) in [("milan", 1), ("milan", 2), ("milano", 3), ("rome", 4)] {
        map.set(&mut store, &Pair::new(city.to_string(), id), &0)
            .expect("set");
    }

    let keys = map
        .iterate(&store, PairRange::prefixed("milan".to_string()))
        .expect("iterate")
        .keys()
        .expect("keys");

    assert_eq!(
        keys,
        vec![
            Pair::new("milan".to_string(), 1),
            Pair::new("milan".to_string(), 2)
        ]
    );
}

// ----------------------------------------------------------------------
// Item / LookupMap / Sequence
// ----------------------------------------------------------------------

#[test]
fn item_is_not_found_until_set() {
    let item: Item<Json<String>> = Item::new(&mut builder(), 0x05u8, "owner", Json::new());
    let mut store = store();

    assert!(item.get(&store).expect_err("unset item").is_not_found());
    assert!(!item.has(&store).expect("has"));

    item.set(&mut store, &"alice".to_string()).expect("set");
    assert_eq!(item.get(&store).expect("get"), "alice");
    assert_eq!(store.get(&[0x05]).expect("raw get"), Some(b"\"alice\"".to_vec()));

    item.remove(&mut store).expect("remove");
    assert_eq!(item.try_get(&store).expect("try_get"), None);
}

#[test]
fn lookup_map_supports_point_access() {
    let lookup: LookupMap<String, KeyAsValue<u64>> =
        LookupMap::new(&mut builder(), 0x06u8, "ids", KeyAsValue::new());
    let mut store = store();

    lookup.set(&mut store, &"alice".to_string(), &1).expect("set");

    assert_eq!(lookup.get(&store, &"alice".to_string()).expect("get"), 1);
    assert!(lookup.has(&store, &"alice".to_string()).expect("has"));
    lookup.remove(&mut store, &"alice".to_string()).expect("remove");
    assert_eq!(lookup.try_get(&store, &"alice".to_string()).expect("try_get"), None);
}

#[test]
fn sequence_starts_at_zero_and_advances() {
    let seq = Sequence::new(&mut builder(), 0x07u8, "ids");
    let mut store = store();

    assert_eq!(seq.peek(&store).expect("peek"), 0);
    assert_eq!(seq.next(&mut store).expect("next"), 0);
    assert_eq!(seq.next(&mut store).expect("next"), 1);
    assert_eq!(seq.peek(&store).expect("peek"), 2);

    seq.set(&mut store, 100).expect("set");
    assert_eq!(seq.next(&mut store).expect("next"), 100);
}

#[test]
fn sequence_overflow_is_an_error() {
    let seq = Sequence::new(&mut builder(), 0x07u8, "ids");
    let mut store = store();
    seq.set(&mut store, u64::MAX).expect("set");

    assert!(seq.next(&mut store).is_err());
    assert_eq!(seq.peek(&store).expect("peek"), u64::MAX);
}

// ----------------------------------------------------------------------
// KeySet
// ----------------------------------------------------------------------

#[test]
fn keyset_membership_and_iteration() {
    let set: KeySet<Pair<String, u64>> = KeySet::new(&mut builder(), 0x08u8, "members");
    let mut store = store();
    set.set(&mut store, &Pair::new("b".to_string(), 2)).expect("set");
    set.set(&mut store, &Pair::new("a".to_string(), 1)).expect("set");

    assert!(set.has(&store, &Pair::new("a".to_string(), 1)).expect("has"));

    let members: Vec<_> = set
        .iter(&store)
        .expect("iter")
        .collect::<Result<_, _>>()
        .expect("members");
    assert_eq!(
        members,
        vec![Pair::new("a".to_string(), 1), Pair::new("b".to_string(), 2)]
    );
}

#[test]
fn keyset_rejects_legacy_values_unless_unchecked() {
    let mut builder = builder();
    let strict: KeySet<u32> = KeySet::new(&mut builder, 0x09u8, "strict");
    let lenient = KeySet::<u32, _>::new_unchecked(&mut builder, 0x0au8, "lenient");
    let mut store = store();

    store.set(&[0x09, 0, 0, 0, 1], &[0xff]).expect("raw legacy write");
    store.set(&[0x0a, 0, 0, 0, 1], &[0xff]).expect("raw legacy write");

    let strict_result: Result<Vec<u32>, _> = strict.iter(&store).expect("iter").collect();
    assert!(strict_result.expect_err("legacy value should fail").is_encoding());

    let lenient_keys: Vec<u32> = lenient
        .iter(&store)
        .expect("iter")
        .collect::<Result<_, _>>()
        .expect("unchecked set tolerates legacy bytes");
    assert_eq!(lenient_keys, vec![1]);

    lenient.set(&mut store, &1).expect("rewrite");
    assert_eq!(store.get(&[0x0a, 0, 0, 0, 1]).expect("raw"), Some(Vec::new()));
}

#[test]
fn keyset_walk_visits_in_order() {
    let set: KeySet<u8> = KeySet::new(&mut builder(), 0x0bu8, "bytes");
    let mut store = store();
    for n in [3u8, 1, 2] {
        set.set(&mut store, &n).expect("set");
    }

    let mut seen = Vec::new();
    set.walk::<_, InternalError, _>(&store, Range::new().descending(), |n| {
        seen.push(n);
        Ok(false)
    })
    .expect("walk");

    assert_eq!(seen, vec![3, 2, 1]);
}

// ----------------------------------------------------------------------
// Vector
// ----------------------------------------------------------------------

#[test]
fn vector_push_pop_and_bounds() {
    let vec: Vector<Json<String>> = Vector::new(&mut builder(), 0x0cu8, "log", Json::new());
    let mut store = store();

    assert!(vec.is_empty(&store).expect("is_empty"));
    assert_eq!(
        vec.pop(&mut store).expect_err("empty pop").class,
        ErrorClass::EmptyVec
    );

    assert_eq!(vec.push(&mut store, &"a".to_string()).expect("push"), 0);
    assert_eq!(vec.push(&mut store, &"b".to_string()).expect("push"), 1);
    assert_eq!(vec.len(&store).expect("len"), 2);

    assert_eq!(vec.get(&store, 1).expect("get"), "b");
    assert_eq!(
        vec.get(&store, 2).expect_err("index == len").class,
        ErrorClass::OutOfBounds
    );
    assert_eq!(
        vec.replace(&mut store, 5, &"z".to_string())
            .expect_err("replace past end")
            .class,
        ErrorClass::OutOfBounds
    );

    vec.replace(&mut store, 0, &"A".to_string()).expect("replace");
    assert_eq!(vec.pop(&mut store).expect("pop"), "b");
    assert_eq!(vec.len(&store).expect("len"), 1);
    assert_eq!(vec.get(&store, 0).expect("get"), "A");
}

#[test]
fn vector_refuses_to_grow_past_u64_max() {
    let vec: Vector<Json<u8>> = Vector::new(&mut builder(), 0x0fu8, "full", Json::new());
    let mut store = store();
    store
        .set(&[0x0f, 0x00], &u64::MAX.to_be_bytes())
        .expect("raw length");
    let before = store.clone();

    let err = vec.push(&mut store, &1).expect_err("length would overflow");

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(store, before);
    assert_eq!(vec.len(&store).expect("len"), u64::MAX);
}

#[test]
fn vector_layout_uses_length_and_element_subprefixes() {
    let mut builder = builder();
    let vec: Vector<Json<u8>> = Vector::new(&mut builder, 0x0du8, "queue", Json::new());
    let mut store = store();
    vec.push(&mut store, &9).expect("push");

    assert_eq!(
        store.get(&[0x0d, 0x00]).expect("raw length"),
        Some(1u64.to_be_bytes().to_vec())
    );
    let mut element_key = vec![0x0d, 0x01];
    element_key.extend(0u64.to_be_bytes());
    assert_eq!(store.get(&element_key).expect("raw element"), Some(b"9".to_vec()));

    let schema = builder.build().expect("schema");
    assert_eq!(schema.collection_names(), vec!["queue_elements", "queue_length"]);
}

#[test]
fn vector_iterates_in_index_order() {
    let vec: Vector<Json<u8>> = Vector::new(&mut builder(), 0x0eu8, "digits", Json::new());
    let mut store = store();
    for n in [7u8, 8, 9] {
        vec.push(&mut store, &n).expect("push");
    }

    let entries = vec.iter(&store).expect("iter").key_values().expect("entries");
    assert_eq!(entries, vec![(0, 7), (1, 8), (2, 9)]);

    let mut sum = 0u32;
    vec.walk::<_, InternalError, _>(&store, Range::new().start_inclusive(1), |_, v| {
        sum += u32::from(v);
        Ok(false)
    })
    .expect("walk");
    assert_eq!(sum, 17);
}
