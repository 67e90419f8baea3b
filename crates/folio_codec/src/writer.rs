//! Record encoder.

use crate::ticks::Ticks;
use bytes::{BufMut, BytesMut};

/// Builds the byte image of one record.
///
/// All `put_*` methods are infallible; the writer only grows a buffer.
///
/// # Example
///
/// ```
/// use folio_codec::RecordWriter;
///
/// let mut w = RecordWriter::new();
/// w.put_string("title");
/// w.put_u8(1);
/// assert_eq!(w.len(), 7);
/// ```
#[derive(Debug, Default)]
pub struct RecordWriter {
    buf: BytesMut,
}

impl RecordWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a writer with the given initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer and returns the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    /// Writes a single byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Writes a boolean as one byte, `1` for true and `0` for false.
    pub fn put_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    /// Writes a little-endian u32.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    /// Writes a little-endian i64.
    pub fn put_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    /// Writes a tick timestamp as a little-endian i64.
    pub fn put_ticks(&mut self, value: Ticks) {
        self.put_i64(value.as_raw());
    }

    /// Writes raw bytes with no prefix.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Writes a 16-byte identifier.
    pub fn put_id(&mut self, id: &[u8; 16]) {
        self.buf.put_slice(id);
    }

    /// Writes a LEB128 length-prefixed UTF-8 string.
    pub fn put_string(&mut self, value: &str) {
        self.put_varint(value.len() as u32);
        self.buf.put_slice(value.as_bytes());
    }

    /// Writes an unsigned LEB128 varint, 7 bits per byte.
    pub fn put_varint(&mut self, mut value: u32) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.put_u8(byte);
                return;
            }
            self.buf.put_u8(byte | 0x80);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_encodings() {
        let cases: &[(u32, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
            (u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
        ];
        for (value, expected) in cases {
            let mut w = RecordWriter::new();
            w.put_varint(*value);
            assert_eq!(&w.into_bytes(), expected, "varint {value}");
        }
    }

    #[test]
    fn string_is_length_prefixed() {
        let mut w = RecordWriter::new();
        w.put_string("abc");
        assert_eq!(w.into_bytes(), vec![0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn integers_are_little_endian() {
        let mut w = RecordWriter::new();
        w.put_u32(0x0102_0304);
        w.put_i64(-2);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[4..], &(-2i64).to_le_bytes());
    }
}
