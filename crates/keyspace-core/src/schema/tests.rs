use super::*;
use crate::{
    codec::{Json, NoKey},
    collections::{Item, KeySet, Map},
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::Pair,
    test_support::builder,
};

fn item(builder: &mut SchemaBuilder, prefix: impl Into<Prefix>, name: &str) {
    let _ = Item::new(builder, prefix, name, Json::<u32>::new());
}

#[test]
fn collections_register_their_metadata() {
    let mut builder = builder();
    let _: Map<Pair<String, u64>, Json<String>> =
        Map::new(&mut builder, 0x01u8, "visits", Json::new());
    let _: KeySet<u32> = KeySet::new(&mut builder, 0x02u8, "members");

    let schema = builder.build().expect("valid schema should build");

    assert_eq!(schema.len(), 2);
    assert_eq!(schema.collection_names(), vec!["members", "visits"]);

    let visits = schema.collection("visits").expect("visits registered");
    assert_eq!(visits.prefix, Prefix::from(0x01u8));
    assert_eq!(visits.key_type, "pair[string, uint64]");
    assert!(schema.collection("missing").is_none());
}

#[test]
fn raw_keys_resolve_to_their_collection() {
    let mut builder = builder();
    item(&mut builder, 0x01u8, "first");
    item(&mut builder, [0x02u8, 0x00], "second");
    let schema = builder.build().expect("build");

    let owner = schema
        .collection_for_key(&[0x02, 0x00, 0xff])
        .expect("key under second");
    assert_eq!(owner.name, "second");
    assert!(schema.collection_for_key(&[0x02, 0x01]).is_none());
    assert!(schema.collection_for_key(&[]).is_none());
}

#[test]
fn invalid_names_are_rejected() {
    for name in ["", "1abc", "has space", "dash-ed"] {
        let mut builder = builder();
        item(&mut builder, 0x01u8, name);

        let err = builder.build().expect_err("invalid name should fail");
        assert!(
            matches!(err, SchemaError::InvalidName { .. }),
            "{name:?} gave {err}"
        );
    }
}

#[test]
fn duplicate_names_are_rejected() {
    let mut builder = builder();
    item(&mut builder, 0x01u8, "owner");
    item(&mut builder, 0x02u8, "owner");

    let err = builder.build().expect_err("duplicate name should fail");

    assert!(matches!(err, SchemaError::DuplicateName { ref name } if name == "owner"));
}

#[test]
fn duplicate_prefixes_are_rejected() {
    let mut builder = builder();
    item(&mut builder, "ab", "first");
    item(&mut builder, "ab", "second");

    let err = builder.build().expect_err("duplicate prefix should fail");

    match err {
        SchemaError::DuplicatePrefix { name, existing, .. } => {
            assert_eq!(name, "second");
            assert_eq!(existing, "first");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn overlapping_prefixes_are_rejected() {
    let mut builder = builder();
    item(&mut builder, [0x01u8], "outer");
    item(&mut builder, [0x01u8, 0x05], "inner");
    item(&mut builder, [0x02u8], "unrelated");

    let err = builder.build().expect_err("overlap should fail");

    match err {
        SchemaError::OverlappingPrefix { outer, inner, .. } => {
            assert_eq!(outer, "outer");
            assert_eq!(inner, "inner");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn every_overlapping_pair_is_reported() {
    let mut builder = builder();
    item(&mut builder, [0x01u8], "outer");
    item(&mut builder, [0x01u8, 0x02], "left");
    item(&mut builder, [0x01u8, 0x03], "right");

    let err = builder.build().expect_err("overlaps should fail");

    let SchemaError::Multiple(errors) = &err else {
        panic!("expected multiple errors, got {err}");
    };
    let pairs: Vec<(&str, &str)> = errors
        .iter()
        .filter_map(|error| match error {
            SchemaError::OverlappingPrefix { outer, inner, .. } => {
                Some((outer.as_str(), inner.as_str()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(pairs, vec![("outer", "left"), ("outer", "right")]);
}

#[test]
fn every_problem_is_reported_at_once() {
    let mut builder = builder();
    item(&mut builder, 0x01u8, "ok");
    item(&mut builder, 0x02u8, "ok");
    item(&mut builder, 0x01u8, "other");

    let err = builder.build().expect_err("build should fail");

    let SchemaError::Multiple(errors) = &err else {
        panic!("expected multiple errors, got {err}");
    };
    assert_eq!(errors.len(), 2);
    assert!(err.to_string().starts_with("2 schema errors"));
}

#[test]
fn schema_errors_convert_to_unsupported() {
    let err: InternalError = SchemaError::DuplicateName {
        name: "owner".to_string(),
    }
    .into();

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert_eq!(err.origin, ErrorOrigin::Schema);
}

#[test]
fn composite_collections_register_sub_prefixes() {
    let mut builder = builder();
    let _ = crate::collections::Vector::new(&mut builder, 0x03u8, "log", Json::<u8>::new());
    let _: Map<NoKey, Json<u8>> = Map::new(&mut builder, 0x04u8, "flag", Json::new());

    let schema = builder.build().expect("build");

    assert_eq!(
        schema.collection("log_elements").map(|info| info.prefix.clone()),
        Some(Prefix::from([0x03u8, 0x01]))
    );
}
