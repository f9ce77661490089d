//! Positional field reads
//!
//! Execute requests and bind descriptors are sequences of unnamed fields
//! whose only framing is their order. Each message declares its layout as a
//! table of `(field, encoding)` pairs and decodes by walking that table, so
//! the order is written down once and can be checked entry by entry.

use crate::buffer::ReadBuffer;
use crate::error::Result;

/// Wire encoding of one positional field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    /// A single raw byte
    Byte,
    /// Compressed integer with its nominal width in bytes
    Compressed(usize),
    /// Presence byte; when non-zero, a compressed length followed by a
    /// length-prefixed byte string
    OptionalBytes,
}

/// Value produced by reading a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Byte or integer field
    Int(i64),
    /// Optional byte string, `None` when the presence byte was zero
    Bytes(Option<Vec<u8>>),
}

impl FieldValue {
    /// Integer value; byte strings count as zero
    pub fn as_int(&self) -> i64 {
        match self {
            FieldValue::Int(value) => *value,
            FieldValue::Bytes(_) => 0,
        }
    }
}

/// Read one field with the given encoding
pub fn read_field(buf: &mut ReadBuffer, encoding: FieldEncoding) -> Result<FieldValue> {
    match encoding {
        FieldEncoding::Byte => Ok(FieldValue::Int(buf.read_u8()? as i64)),
        FieldEncoding::Compressed(width) => Ok(FieldValue::Int(buf.read_integer(width, true, true)?)),
        FieldEncoding::OptionalBytes => {
            if buf.read_u8()? == 0 {
                return Ok(FieldValue::Bytes(None));
            }
            // Declared length; the byte string carries its own
            buf.skip_ub()?;
            Ok(FieldValue::Bytes(Some(buf.read_length_prefixed_bytes()?)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_read_byte_and_compressed() {
        let mut buf = ReadBuffer::from_slice(&[0x7F, 0x02, 0x80, 0x61, 0x81, 0x05]);
        assert_eq!(read_field(&mut buf, FieldEncoding::Byte).unwrap(), FieldValue::Int(0x7F));
        assert_eq!(
            read_field(&mut buf, FieldEncoding::Compressed(4)).unwrap(),
            FieldValue::Int(0x8061)
        );
        assert_eq!(
            read_field(&mut buf, FieldEncoding::Compressed(4)).unwrap(),
            FieldValue::Int(-5)
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_read_optional_bytes() {
        let mut buf = ReadBuffer::from_slice(&[0x00, 0x01, 0x01, 0x03, 0x02, 0xAA, 0xBB]);
        assert_eq!(
            read_field(&mut buf, FieldEncoding::OptionalBytes).unwrap(),
            FieldValue::Bytes(None)
        );
        assert_eq!(
            read_field(&mut buf, FieldEncoding::OptionalBytes).unwrap(),
            FieldValue::Bytes(Some(vec![0xAA, 0xBB]))
        );
    }

    #[test]
    fn test_truncated_field() {
        let mut buf = ReadBuffer::from_slice(&[0x02, 0x01]);
        assert!(matches!(
            read_field(&mut buf, FieldEncoding::Compressed(2)),
            Err(Error::BufferUnderflow { .. })
        ));
    }

    #[test]
    fn test_as_int() {
        assert_eq!(FieldValue::Int(13).as_int(), 13);
        assert_eq!(FieldValue::Bytes(None).as_int(), 0);
    }
}
