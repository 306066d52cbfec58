use bytes::{BufMut, BytesMut};

/// Growable little-endian output buffer.
///
/// Backed by [`bytes::BytesMut`], which doubles its capacity on overflow, so
/// encoding a message never re-allocates more than `O(log n)` times for `n`
/// bytes written.
#[derive(Debug, Default)]
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    /// Create an empty writer with a pre-reserved capacity hint.
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: BytesMut::with_capacity(cap) }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether no bytes have been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer, returning the accumulated bytes.
    #[must_use]
    pub fn into_bytes(self) -> BytesMut {
        self.buf
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    /// Append a little-endian `u16`.
    pub fn write_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    /// Append a little-endian `u32`.
    pub fn write_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    /// Alias for [`Self::write_u32`] used where a raw length prefix is being
    /// constructed directly (e.g. in tests exercising oversize rejection).
    pub fn write_raw_u32(&mut self, v: u32) {
        self.write_u32(v);
    }

    /// Append a little-endian `u64`.
    pub fn write_u64(&mut self, v: u64) {
        self.buf.put_u64_le(v);
    }

    /// Append a little-endian `f32`.
    pub fn write_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    /// Append a little-endian `f64`.
    pub fn write_f64(&mut self, v: f64) {
        self.buf.put_f64_le(v);
    }

    /// Append a fixed-size byte array verbatim (no length prefix).
    pub fn write_fixed(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Append a `string`: `u32` length + UTF-8 bytes.
    pub fn write_string(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.buf.put_slice(s.as_bytes());
    }

    /// Append a `bytes` field: `u32` length + raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.buf.put_slice(bytes);
    }

    /// Append a `list<T>`: `u32` count + each element encoded by `encode_one`.
    pub fn write_list<T>(&mut self, items: &[T], mut encode_one: impl FnMut(&mut Self, &T)) {
        self.write_u32(items.len() as u32);
        for item in items {
            encode_one(self, item);
        }
    }

    /// Append a `map<K, V>`: `u32` count + alternating key/value encodings in
    /// the order supplied by `entries`. Insertion order is written verbatim;
    /// decoders must not rely on it.
    pub fn write_map<K, V>(
        &mut self,
        entries: &[(K, V)],
        mut encode_entry: impl FnMut(&mut Self, &K, &V),
    ) {
        self.write_u32(entries.len() as u32);
        for (k, v) in entries {
            encode_entry(self, k, v);
        }
    }
}
