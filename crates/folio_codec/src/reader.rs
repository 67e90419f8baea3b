//! Record decoder.

use crate::error::{CodecError, CodecResult};
use crate::ticks::Ticks;

/// Guard against absurd string prefixes in corrupt files. No legitimate
/// field (article bodies included) approaches this.
const MAX_STRING_LEN: u32 = 64 * 1024 * 1024;

/// A positional cursor over the byte image of one or more records.
///
/// Decoding is strictly sequential; [`RecordReader::position`] after a
/// successful entity decode is how the record store learns that record's
/// byte length during a file scan.
#[derive(Debug)]
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Creates a reader over `buf` starting at offset 0.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset into the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether the input is fully consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(CodecError::UnexpectedEof {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Reads a single byte.
    pub fn get_u8(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a boolean byte, rejecting anything but `0` or `1`.
    pub fn get_bool(&mut self) -> CodecResult<bool> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CodecError::InvalidTag {
                field: "boolean",
                value,
            }),
        }
    }

    /// Reads a little-endian u32.
    pub fn get_u32(&mut self) -> CodecResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a little-endian i64.
    pub fn get_i64(&mut self) -> CodecResult<i64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(raw))
    }

    /// Reads a tick timestamp.
    pub fn get_ticks(&mut self) -> CodecResult<Ticks> {
        Ok(Ticks::from_raw(self.get_i64()?))
    }

    /// Reads `len` raw bytes.
    pub fn get_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        self.take(len)
    }

    /// Reads a 16-byte identifier.
    pub fn get_id(&mut self) -> CodecResult<[u8; 16]> {
        let bytes = self.take(16)?;
        let mut id = [0u8; 16];
        id.copy_from_slice(bytes);
        Ok(id)
    }

    /// Reads a LEB128 length-prefixed UTF-8 string.
    pub fn get_string(&mut self) -> CodecResult<String> {
        let len = self.get_varint()?;
        if len > MAX_STRING_LEN {
            return Err(CodecError::InvalidLength(u64::from(len)));
        }
        let bytes = self.take(len as usize)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// Reads an unsigned LEB128 varint, at most 5 bytes.
    pub fn get_varint(&mut self) -> CodecResult<u32> {
        let mut value: u64 = 0;
        for shift in (0..35).step_by(7) {
            let byte = self.get_u8()?;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return u32::try_from(value).map_err(|_| CodecError::InvalidLength(value));
            }
        }
        Err(CodecError::InvalidLength(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::RecordWriter;
    use proptest::prelude::*;

    #[test]
    fn sequential_fields() {
        let mut w = RecordWriter::new();
        w.put_string("sender");
        w.put_bool(true);
        w.put_ticks(Ticks::from_unix_seconds(42));
        let bytes = w.into_bytes();

        let mut r = RecordReader::new(&bytes);
        assert_eq!(r.get_string().unwrap(), "sender");
        assert!(r.get_bool().unwrap());
        assert_eq!(r.get_ticks().unwrap(), Ticks::from_unix_seconds(42));
        assert!(r.is_empty());
    }

    #[test]
    fn position_tracks_record_length() {
        let mut w = RecordWriter::new();
        w.put_string("ab");
        w.put_u8(7);
        let bytes = w.into_bytes();

        let mut r = RecordReader::new(&bytes);
        r.get_string().unwrap();
        assert_eq!(r.position(), 3);
        r.get_u8().unwrap();
        assert_eq!(r.position(), 4);
    }

    #[test]
    fn eof_is_reported() {
        let mut r = RecordReader::new(&[0x05, b'a']);
        assert!(matches!(
            r.get_string(),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn bad_boolean_tag() {
        let mut r = RecordReader::new(&[0x02]);
        assert!(matches!(
            r.get_bool(),
            Err(CodecError::InvalidTag { field: "boolean", value: 2 })
        ));
    }

    #[test]
    fn unterminated_varint() {
        let mut r = RecordReader::new(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert!(r.get_varint().is_err());
    }

    #[test]
    fn invalid_utf8_string() {
        let mut r = RecordReader::new(&[0x02, 0xc3, 0x28]);
        assert!(matches!(r.get_string(), Err(CodecError::InvalidUtf8(_))));
    }

    proptest! {
        #[test]
        fn varint_roundtrip(value in any::<u32>()) {
            let mut w = RecordWriter::new();
            w.put_varint(value);
            let bytes = w.into_bytes();
            let mut r = RecordReader::new(&bytes);
            prop_assert_eq!(r.get_varint().unwrap(), value);
            prop_assert!(r.is_empty());
        }

        #[test]
        fn string_roundtrip(value in ".{0,128}") {
            let mut w = RecordWriter::new();
            w.put_string(&value);
            let bytes = w.into_bytes();
            let mut r = RecordReader::new(&bytes);
            prop_assert_eq!(r.get_string().unwrap(), value);
        }

        #[test]
        fn ticks_roundtrip(raw in any::<i64>()) {
            let mut w = RecordWriter::new();
            w.put_ticks(Ticks::from_raw(raw));
            let bytes = w.into_bytes();
            let mut r = RecordReader::new(&bytes);
            prop_assert_eq!(r.get_ticks().unwrap(), Ticks::from_raw(raw));
        }
    }
}
