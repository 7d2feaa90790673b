//! Fixed-width scalar byte transforms preserving order.
//!
//! Signed integers are biased by flipping the sign bit, which is the same
//! as `byte0 ^= 0x80` on the big-endian two's-complement bytes.

macro_rules! ordered_signed {
    ($encode:ident, $decode:ident, $signed:ty, $unsigned:ty, $width:expr) => {
        pub(super) const fn $encode(value: $signed) -> [u8; $width] {
            let biased = value.cast_unsigned() ^ (1 << (<$unsigned>::BITS - 1));
            biased.to_be_bytes()
        }

        pub(super) const fn $decode(bytes: [u8; $width]) -> $signed {
            let biased = <$unsigned>::from_be_bytes(bytes);
            (biased ^ (1 << (<$unsigned>::BITS - 1))).cast_signed()
        }
    };
}

ordered_signed!(ordered_i8_bytes, i8_from_ordered, i8, u8, 1);
ordered_signed!(ordered_i16_bytes, i16_from_ordered, i16, u16, 2);
ordered_signed!(ordered_i32_bytes, i32_from_ordered, i32, u32, 4);
ordered_signed!(ordered_i64_bytes, i64_from_ordered, i64, u64, 8);

///
/// TESTS
///
