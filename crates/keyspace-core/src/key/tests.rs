use super::*;
use crate::{
    codec::{CodecError, KeyCodec, decode_key_exact, encode_key},
    range::{RangeKey, Ranger, raw_bounds},
};
use proptest::prelude::*;

#[test]
fn pair_uses_non_terminal_first_part() {
    let key = Pair::new("milan".to_string(), 7u16);
    let bytes = encode_key(&key).expect("pair should encode");

    assert_eq!(bytes, b"milan\x00\x00\x07".to_vec());
    assert_eq!(key.size(), bytes.len());
    assert_eq!(decode_key_exact::<Pair<String, u16>>(&bytes).expect("decode"), key);
}

#[test]
fn prefix_encoding_is_byte_prefix_of_full_key() {
    let full = encode_key(&Triple::new("a".to_string(), 1u32, "z".to_string())).expect("full");
    let prefix = encode_key(&Triple::<String, u32, String>::prefix("a".to_string())).expect("p");
    let super_prefix =
        encode_key(&Triple::<String, u32, String>::super_prefix("a".to_string(), 1)).expect("sp");

    assert!(full.starts_with(&prefix));
    assert!(full.starts_with(&super_prefix));
    assert_eq!(prefix, b"a\x00".to_vec());
}

#[test]
fn prefix_does_not_match_longer_first_part() {
    let milan = encode_key(&Pair::<String, u8>::prefix("milan".to_string())).expect("prefix");
    let milano = encode_key(&Pair::new("milano".to_string(), 1u8)).expect("full");

    assert!(!milano.starts_with(&milan));
}

#[test]
fn nested_pair_is_fully_non_terminal() {
    let inner = Pair::new("x".to_string(), "y".to_string());
    let outer = Pair::new(inner.clone(), 3u8);

    let bytes = encode_key(&outer).expect("nested pair should encode");

    assert_eq!(bytes, b"x\x00y\x00\x03".to_vec());
    assert_eq!(inner.size_non_terminal(), 4);
    assert_eq!(
        decode_key_exact::<Pair<Pair<String, String>, u8>>(&bytes).expect("decode"),
        outer
    );
}

#[test]
fn quad_round_trips_and_rejects_trailing_bytes() {
    let key = Quad::new(1u8, "b".to_string(), true, -4i32);
    let mut bytes = encode_key(&key).expect("quad should encode");

    assert_eq!(
        decode_key_exact::<Quad<u8, String, bool, i32>>(&bytes).expect("decode"),
        key
    );

    bytes.push(0xee);
    let err = decode_key_exact::<Quad<u8, String, bool, i32>>(&bytes)
        .expect_err("trailing byte should fail");
    assert!(matches!(err, CodecError::PartialConsumption { .. }));
}

#[test]
fn into_parts_rejects_prefix_keys() {
    let err = Pair::<u8, u8>::prefix(1)
        .into_parts()
        .expect_err("prefix pair is incomplete");

    assert!(matches!(err, CodecError::IncompleteKey { part: "k2", .. }));
    assert_eq!(Pair::new(1u8, 2u8).into_parts().expect("complete"), (1, 2));
}

#[test]
fn composite_key_types_are_descriptive() {
    assert_eq!(Pair::<String, u64>::key_type(), "pair[string, uint64]");
    assert_eq!(
        Triple::<u8, bool, Vec<u8>>::key_type(),
        "triple[uint8, bool, bytes]"
    );
}

#[test]
fn composite_json_is_an_array_of_parts() {
    let key = Pair::new("rome".to_string(), 5u64);
    let json = key.encode_json().expect("pair json");

    assert_eq!(json, serde_json::json!(["rome", "5"]));
    assert_eq!(Pair::<String, u64>::decode_json(&json).expect("decode"), key);
    assert!(Pair::<String, u64>::decode_json(&serde_json::json!(["rome"])).is_err());
    assert_eq!(key.stringify(), "(rome, 5)");
}

#[test]
fn pair_range_defaults_to_prefix_bounds() {
    let values = PairRange::<String, u64>::prefixed("milan".to_string())
        .range_values()
        .expect("pair range");

    assert_eq!(
        values.start,
        Some(RangeKey::Exact(Pair::prefix("milan".to_string())))
    );
    assert_eq!(
        values.end,
        Some(RangeKey::PrefixEnd(Pair::prefix("milan".to_string())))
    );

    let bounds = raw_bounds(&[0x01], &values).expect("lower");
    assert_eq!(bounds.start, b"\x01milan\x00".to_vec());
    assert_eq!(bounds.end, Some(b"\x01milan\x01".to_vec()));
}

#[test]
fn pair_range_bounds_the_second_part() {
    let values = PairRange::prefixed(2u8)
        .start_inclusive(10u8)
        .end_exclusive(20u8)
        .descending()
        .range_values()
        .expect("pair range");

    assert_eq!(values.start, Some(RangeKey::Exact(Pair::new(2, 10))));
    assert_eq!(values.end, Some(RangeKey::Exact(Pair::new(2, 20))));
    assert!(values.direction.is_desc());
}

#[test]
fn quad_super_prefix3_range_covers_matching_keys() {
    let values = QuadRange::<u8, u8, u8, String>::super_prefixed3(1, 2, 3)
        .range_values()
        .expect("quad range");
    let bounds = raw_bounds(&[], &values).expect("lower");

    let inside = encode_key(&Quad::new(1u8, 2u8, 3u8, "zz".to_string())).expect("encode");
    let outside = encode_key(&Quad::new(1u8, 2u8, 4u8, String::new())).expect("encode");

    assert!(inside >= bounds.start && Some(&inside) < bounds.end.as_ref());
    assert!(Some(&outside) >= bounds.end.as_ref());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn pair_order_matches_tuple_order(
        a in any::<u32>(),
        b in "[a-z]{0,6}",
        c in any::<u32>(),
        d in "[a-z]{0,6}",
    ) {
        let lhs = encode_key(&Pair::new(a, b.clone())).expect("encode");
        let rhs = encode_key(&Pair::new(c, d.clone())).expect("encode");

        prop_assert_eq!((a, b).cmp(&(c, d)), lhs.cmp(&rhs));
    }

    #[test]
    fn triple_round_trips(a in any::<i64>(), b in "[a-z]{0,8}", c in any::<bool>()) {
        let key = Triple::new(a, b, c);
        let bytes = encode_key(&key).expect("encode");

        prop_assert_eq!(decode_key_exact::<Triple<i64, String, bool>>(&bytes).expect("decode"), key);
    }
}
