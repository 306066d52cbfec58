//! Binary codec for the Strand L5 application protocol.
//!
//! All primitives are little-endian. A [`Writer`] appends to a growable
//! [`bytes::BytesMut`] buffer (amortized doubling is `BytesMut`'s own growth
//! strategy). A [`Reader`] walks a borrowed byte slice with a bounded cursor
//! and rejects any length-prefixed field whose declared size would run past
//! the end of the buffer *before* allocating space for it.
//!
//! # Wire primitives
//!
//! - `u8 u16 u32 u64 f32 f64`: little-endian, fixed width.
//! - `string`: `u32` length + UTF-8 bytes.
//! - `bytes`: `u32` length + raw bytes.
//! - `list<T>`: `u32` count + `T` encodings.
//! - `map<K, V>`: `u32` count + alternating `K`, `V` encodings in insertion
//!   order. Decoders must not assume any particular order is meaningful.

mod error;
mod reader;
mod writer;

pub use error::CodecError;
pub use reader::Reader;
pub use writer::Writer;

/// Convenience alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn primitive_round_trip() {
        let mut w = Writer::new();
        w.write_u8(7);
        w.write_u16(1234);
        w.write_u32(0xDEAD_BEEF);
        w.write_u64(0x0123_4567_89AB_CDEF);
        w.write_f32(1.5);
        w.write_f64(2.25);
        w.write_string("hello");
        w.write_bytes(b"world");

        let buf = w.into_bytes();
        let mut r = Reader::new(&buf);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert_eq!(r.read_u16().unwrap(), 1234);
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.read_u64().unwrap(), 0x0123_4567_89AB_CDEF);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f64().unwrap(), 2.25);
        assert_eq!(r.read_string(1024).unwrap(), "hello");
        assert_eq!(r.read_bytes(1024).unwrap(), b"world");
        assert!(r.is_empty());
    }

    #[test]
    fn list_and_map_round_trip() {
        let mut w = Writer::new();
        w.write_list(&[1u32, 2, 3], |w, v| w.write_u32(*v));
        w.write_map(&[("a".to_string(), 1u32), ("b".to_string(), 2u32)], |w, k, v| {
            w.write_string(k);
            w.write_u32(*v);
        });

        let buf = w.into_bytes();
        let mut r = Reader::new(&buf);
        let list: Vec<u32> = r.read_list(16, |r| r.read_u32()).unwrap();
        assert_eq!(list, vec![1, 2, 3]);

        let map: Vec<(String, u32)> =
            r.read_map(16, |r| Ok(r.read_string(64)?), |r| r.read_u32()).unwrap();
        assert_eq!(map, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn short_buffer_rejected() {
        let buf = [0u8; 2];
        let mut r = Reader::new(&buf);
        assert!(matches!(r.read_u32(), Err(CodecError::ShortBuffer { .. })));
    }

    #[test]
    fn oversize_string_rejected_before_allocating() {
        let mut w = Writer::new();
        // Claim a 1 GiB string but supply no payload bytes.
        w.write_raw_u32(1024 * 1024 * 1024);
        let buf = w.into_bytes();
        let mut r = Reader::new(&buf);
        let err = r.read_string(1024).unwrap_err();
        assert!(matches!(err, CodecError::OversizeField { .. }));
    }

    proptest! {
        #[test]
        fn string_round_trip_prop(s in ".{0,256}") {
            let mut w = Writer::new();
            w.write_string(&s);
            let buf = w.into_bytes();
            let mut r = Reader::new(&buf);
            let out = r.read_string(1024).unwrap();
            prop_assert_eq!(out, s);
            prop_assert!(r.is_empty());
        }

        #[test]
        fn bytes_round_trip_prop(v in prop::collection::vec(any::<u8>(), 0..256)) {
            let mut w = Writer::new();
            w.write_bytes(&v);
            let buf = w.into_bytes();
            let mut r = Reader::new(&buf);
            let out = r.read_bytes(1024).unwrap();
            prop_assert_eq!(out, v);
        }

        #[test]
        fn u64_round_trip_prop(n in any::<u64>()) {
            let mut w = Writer::new();
            w.write_u64(n);
            let buf = w.into_bytes();
            let mut r = Reader::new(&buf);
            prop_assert_eq!(r.read_u64().unwrap(), n);
        }
    }
}
