//! Bind descriptor parsing
//!
//! An execute request carrying bind variables lists one descriptor per
//! variable, all descriptors first, then all values:
//!
//! ```text
//! Field              | Encoding
//! -------------------+-------------------------------------------
//! data type          | byte
//! flag               | byte
//! precision          | byte
//! scale              | byte
//! max length         | compressed (4)
//! max array elements | compressed (4)
//! cont flag          | compressed (4)
//! type OID           | presence byte, compressed length, bytes
//! version            | compressed (4)
//! charset id         | compressed (2)
//! charset form       | byte
//! max char length    | compressed (4)
//! ```

use super::field::{read_field, FieldEncoding, FieldValue};
use crate::buffer::ReadBuffer;
use crate::constants::DataType;
use crate::error::Result;
use crate::statement::ParameterInfo;

/// Named descriptor fields, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindField {
    /// Oracle type code
    DataType,
    /// Descriptor flag byte
    Flag,
    /// Numeric precision
    Precision,
    /// Numeric scale
    Scale,
    /// Maximum value length
    MaxLength,
    /// Maximum number of array elements
    MaxArrayElements,
    /// Continuation flags
    ContFlag,
    /// Object type identifier
    TypeOid,
    /// Type version
    Version,
    /// Character set id
    CharsetId,
    /// Character set form
    CharsetForm,
    /// Maximum length in characters
    MaxCharLength,
}

/// Layout of one bind descriptor
pub const BIND_DESCRIPTOR_LAYOUT: [(BindField, FieldEncoding); 12] = [
    (BindField::DataType, FieldEncoding::Byte),
    (BindField::Flag, FieldEncoding::Byte),
    (BindField::Precision, FieldEncoding::Byte),
    (BindField::Scale, FieldEncoding::Byte),
    (BindField::MaxLength, FieldEncoding::Compressed(4)),
    (BindField::MaxArrayElements, FieldEncoding::Compressed(4)),
    (BindField::ContFlag, FieldEncoding::Compressed(4)),
    (BindField::TypeOid, FieldEncoding::OptionalBytes),
    (BindField::Version, FieldEncoding::Compressed(4)),
    (BindField::CharsetId, FieldEncoding::Compressed(2)),
    (BindField::CharsetForm, FieldEncoding::Byte),
    (BindField::MaxCharLength, FieldEncoding::Compressed(4)),
];

/// Parse one bind descriptor
///
/// Fails on the first field that can't be read; no partial descriptor is
/// returned.
pub fn parse_bind_descriptor(buf: &mut ReadBuffer) -> Result<ParameterInfo> {
    let mut param = ParameterInfo::default();
    for (field, encoding) in BIND_DESCRIPTOR_LAYOUT {
        let value = read_field(buf, encoding)?;
        assign(&mut param, field, value);
    }
    Ok(param)
}

/// Read the bind values following the descriptors, one per parameter in order
///
/// A zero-length value is a NULL.
pub fn parse_bind_values(buf: &mut ReadBuffer, params: &mut [ParameterInfo]) -> Result<()> {
    for param in params.iter_mut() {
        let value = buf.read_length_prefixed_bytes()?;
        param.is_null = value.is_empty();
        param.value = value;
    }
    Ok(())
}

fn assign(param: &mut ParameterInfo, field: BindField, value: FieldValue) {
    let int = value.as_int();
    match field {
        BindField::DataType => param.data_type = DataType::from(int as u8),
        BindField::Flag => param.flag = int as u8,
        BindField::Precision => param.precision = int as u8,
        BindField::Scale => param.scale = int as u8,
        BindField::MaxLength => param.max_len = int as u32,
        BindField::MaxArrayElements => param.max_array_elements = int as u32,
        BindField::ContFlag => param.cont_flag = int,
        BindField::TypeOid => {
            if let FieldValue::Bytes(oid) = value {
                param.type_oid = oid;
            }
        }
        BindField::Version => param.version = int as u32,
        BindField::CharsetId => param.charset_id = int as u16,
        BindField::CharsetForm => param.charset_form = int as u8,
        BindField::MaxCharLength => param.max_char_len = int as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BindDirection, OracleType};

    // CHAR(32) descriptor, charset 873 (AL32UTF8), no type OID
    const CHAR_DESCRIPTOR: [u8; 16] = [
        0x60, 0x01, 0x00, 0x00, 0x01, 0xC0, 0x00, 0x01, 0x10, 0x00, 0x00, 0x02, 0x03, 0x69, 0x01,
        0x00,
    ];

    #[test]
    fn test_parse_char_descriptor() {
        let mut buf = ReadBuffer::from_slice(&CHAR_DESCRIPTOR);
        let param = parse_bind_descriptor(&mut buf).unwrap();
        assert_eq!(param.data_type, DataType::Known(OracleType::Char));
        assert_eq!(param.flag, 1);
        assert_eq!(param.max_len, 0xC0);
        assert_eq!(param.max_array_elements, 0);
        assert_eq!(param.cont_flag, 0x10);
        assert_eq!(param.type_oid, None);
        assert_eq!(param.version, 0);
        assert_eq!(param.charset_id, 873);
        assert_eq!(param.charset_form, 1);
        assert_eq!(param.max_char_len, 0);
        assert_eq!(param.direction, BindDirection::Input);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_parse_descriptor_with_type_oid() {
        let data = [
            0x6D, 0x00, 0x00, 0x00, 0x01, 0x10, 0x00, 0x00, // type 109, max len 16
            0x01, 0x01, 0x02, 0x02, 0xAB, 0xCD, // OID present
            0x01, 0x01, 0x00, 0x00, 0x00,
        ];
        let mut buf = ReadBuffer::from_slice(&data);
        let param = parse_bind_descriptor(&mut buf).unwrap();
        assert_eq!(param.data_type, DataType::Other(109));
        assert_eq!(param.type_oid, Some(vec![0xAB, 0xCD]));
        assert_eq!(param.version, 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_truncated_descriptor_fails() {
        let mut buf = ReadBuffer::from_slice(&CHAR_DESCRIPTOR[..10]);
        assert!(parse_bind_descriptor(&mut buf).is_err());
    }

    #[test]
    fn test_parse_values_marks_nulls() {
        let mut params = vec![ParameterInfo::default(), ParameterInfo::default()];
        let mut buf = ReadBuffer::from_slice(&[0x02, b'O', b'K', 0x00]);
        parse_bind_values(&mut buf, &mut params).unwrap();
        assert_eq!(params[0].value, b"OK".to_vec());
        assert!(!params[0].is_null);
        assert!(params[1].is_null);
    }

    #[test]
    fn test_layout_order() {
        let fields: Vec<BindField> = BIND_DESCRIPTOR_LAYOUT.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields[0], BindField::DataType);
        assert_eq!(fields[7], BindField::TypeOid);
        assert_eq!(fields[11], BindField::MaxCharLength);
    }
}
