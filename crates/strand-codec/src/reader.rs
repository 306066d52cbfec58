use crate::error::CodecError;

/// Bounded cursor over a borrowed byte slice.
///
/// Every read checks remaining length first; length-prefixed reads
/// (`string`, `bytes`, `list`, `map`) additionally reject declared sizes
/// exceeding a caller-supplied cap *before* allocating storage for the
/// field, satisfying the decode-before-allocate requirement for hostile
/// input.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Wrap a byte slice for reading from the start.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes remaining after the current cursor position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the cursor has consumed the entire buffer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current cursor offset from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> crate::Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::ShortBuffer { needed: n, remaining: self.remaining() });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> crate::Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16(&mut self) -> crate::Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32(&mut self) -> crate::Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64(&mut self) -> crate::Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap_or_else(|_| unreachable!("take(8) guarantees 8 bytes"))))
    }

    /// Read a little-endian `f32`.
    pub fn read_f32(&mut self) -> crate::Result<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a little-endian `f64`.
    pub fn read_f64(&mut self) -> crate::Result<f64> {
        let b = self.take(8)?;
        Ok(f64::from_le_bytes(b.try_into().unwrap_or_else(|_| unreachable!("take(8) guarantees 8 bytes"))))
    }

    /// Read a fixed-size array of raw bytes (no length prefix).
    pub fn read_fixed<const N: usize>(&mut self) -> crate::Result<[u8; N]> {
        let b = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(b);
        Ok(out)
    }

    /// Read exactly `n` raw bytes (no length prefix, no cap check — the
    /// caller has already validated `n` against whatever bound applies).
    pub fn read_bytes_exact(&mut self, n: usize) -> crate::Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    /// Read a `string`: `u32` length + UTF-8 bytes. `max_len` bounds the
    /// declared length before any buffer for the string's contents is
    /// materialized.
    pub fn read_string(&mut self, max_len: usize) -> crate::Result<String> {
        let bytes = self.read_bytes(max_len)?;
        String::from_utf8(bytes).map_err(|e| CodecError::InvalidUtf8(e.to_string()))
    }

    /// Read a `bytes` field: `u32` length + raw bytes, capped at `max_len`.
    pub fn read_bytes(&mut self, max_len: usize) -> crate::Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        if len > max_len {
            return Err(CodecError::OversizeField { declared: len, cap: max_len });
        }
        Ok(self.take(len)?.to_vec())
    }

    /// Read a `list<T>`: `u32` count (capped at `max_count`) + `decode_one`
    /// applied `count` times.
    pub fn read_list<T>(
        &mut self,
        max_count: usize,
        mut decode_one: impl FnMut(&mut Self) -> crate::Result<T>,
    ) -> crate::Result<Vec<T>> {
        let count = self.read_u32()? as usize;
        if count > max_count {
            return Err(CodecError::OversizeField { declared: count, cap: max_count });
        }
        let mut out = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            out.push(decode_one(self)?);
        }
        Ok(out)
    }

    /// Read a `map<K, V>`: `u32` count (capped at `max_count`) + alternating
    /// key/value decodes, returned as a vector of pairs in wire order.
    /// Insertion order on the wire is not a canonical order — callers that
    /// need canonicalization (e.g. for signing) must sort the result
    /// themselves.
    pub fn read_map<K, V>(
        &mut self,
        max_count: usize,
        mut decode_key: impl FnMut(&mut Self) -> crate::Result<K>,
        mut decode_value: impl FnMut(&mut Self) -> crate::Result<V>,
    ) -> crate::Result<Vec<(K, V)>> {
        let count = self.read_u32()? as usize;
        if count > max_count {
            return Err(CodecError::OversizeField { declared: count, cap: max_count });
        }
        let mut out = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let k = decode_key(self)?;
            let v = decode_value(self)?;
            out.push((k, v));
        }
        Ok(out)
    }
}
