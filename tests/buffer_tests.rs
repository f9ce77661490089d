//! Integration tests for the payload codec

use oracle_trc::buffer::ReadBuffer;
use oracle_trc::messages::{read_field, FieldEncoding, FieldValue};
use oracle_trc::types::{decode_date, decode_packed_decimal, format_date, format_number};
use oracle_trc::Error;

#[test]
fn test_compressed_integers_in_sequence() {
    // 0, 256, -5, 0x12345678
    let data = [
        0x00, //
        0x02, 0x01, 0x00, //
        0x81, 0x05, //
        0x04, 0x12, 0x34, 0x56, 0x78,
    ];
    let mut buf = ReadBuffer::from_slice(&data);

    assert_eq!(buf.read_ub2().unwrap(), 0);
    assert_eq!(buf.read_ub2().unwrap(), 256);
    assert_eq!(buf.read_sb4().unwrap(), -5);
    assert_eq!(buf.read_ub4().unwrap(), 0x1234_5678);
    assert!(buf.is_empty());
}

#[test]
fn test_compressed_width_ignores_declared_size() {
    // Count byte says 3 even though the field is nominally 2 wide
    let mut buf = ReadBuffer::from_slice(&[0x03, 0x01, 0x00, 0x00]);
    assert_eq!(buf.read_integer(2, true, true).unwrap(), 0x1_0000);
}

#[test]
fn test_fixed_integers_both_orders() {
    let data = [0x01, 0x02, 0x03, 0x04];

    let mut buf = ReadBuffer::from_slice(&data);
    assert_eq!(buf.read_integer(4, false, true).unwrap(), 0x0102_0304);

    let mut buf = ReadBuffer::from_slice(&data);
    assert_eq!(buf.read_integer(4, false, false).unwrap(), 0x0403_0201);
}

#[test]
fn test_oversized_count_byte() {
    let mut buf = ReadBuffer::from_slice(&[0x09, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let err = buf.read_ub4().unwrap_err();
    assert!(matches!(err, Error::InvalidLengthIndicator(9)));
    assert!(err.is_decode_error());
}

#[test]
fn test_integer_past_end() {
    let mut buf = ReadBuffer::from_slice(&[0x04, 0x01, 0x02]);
    let err = buf.read_ub4().unwrap_err();
    assert!(matches!(
        err,
        Error::BufferUnderflow {
            needed: 4,
            available: 2
        }
    ));
}

#[test]
fn test_short_byte_string() {
    let mut buf = ReadBuffer::from_slice(&[0x05, b'h', b'e', b'l', b'l', b'o', 0xFF]);
    assert_eq!(buf.read_length_prefixed_bytes().unwrap(), b"hello");
    assert_eq!(buf.remaining(), 1);
}

#[test]
fn test_chunked_byte_string() {
    let data = [0xFE, 0x02, 0xAB, 0xCD, 0x03, 0x01, 0x02, 0x03, 0x00, 0x7F];
    let mut buf = ReadBuffer::from_slice(&data);
    assert_eq!(
        buf.read_length_prefixed_bytes().unwrap(),
        vec![0xAB, 0xCD, 0x01, 0x02, 0x03]
    );
    assert_eq!(buf.read_u8().unwrap(), 0x7F);
}

#[test]
fn test_chunked_byte_string_without_terminator() {
    let mut buf = ReadBuffer::from_slice(&[0xFE, 0x02, 0xAB, 0xCD]);
    assert!(buf.read_length_prefixed_bytes().is_err());
}

#[test]
fn test_empty_byte_string() {
    let mut buf = ReadBuffer::from_slice(&[0x00]);
    assert!(buf.read_length_prefixed_bytes().unwrap().is_empty());
    assert!(buf.is_empty());
}

#[test]
fn test_unread_steps_back_one_byte() {
    let mut buf = ReadBuffer::from_slice(&[0x01, 0x02, 0x06]);
    buf.skip(2).unwrap();
    assert_eq!(buf.read_u8().unwrap(), 0x06);
    buf.unread().unwrap();
    assert_eq!(buf.position(), 2);
    assert_eq!(buf.peek_u8().unwrap(), 0x06);
}

#[test]
fn test_unread_at_start_fails() {
    let mut buf = ReadBuffer::from_slice(&[0x01]);
    assert!(buf.unread().is_err());
}

#[test]
fn test_set_position_bounds() {
    let mut buf = ReadBuffer::from_slice(&[0u8; 4]);
    buf.set_position(4).unwrap();
    assert_eq!(buf.remaining(), 0);
    assert!(buf.set_position(5).is_err());
}

#[test]
fn test_field_table_walk() {
    // Byte, compressed width 4, absent optional bytes, present optional bytes
    let data = [
        0x02, //
        0x01, 0x20, //
        0x00, //
        0x01, 0x01, 0x02, 0x00, 0x6D,
    ];
    let layout = [
        FieldEncoding::Byte,
        FieldEncoding::Compressed(4),
        FieldEncoding::OptionalBytes,
        FieldEncoding::OptionalBytes,
    ];

    let mut buf = ReadBuffer::from_slice(&data);
    let values: Vec<FieldValue> = layout
        .iter()
        .map(|&encoding| read_field(&mut buf, encoding).unwrap())
        .collect();

    assert_eq!(
        values,
        vec![
            FieldValue::Int(2),
            FieldValue::Int(32),
            FieldValue::Bytes(None),
            FieldValue::Bytes(Some(vec![0x00, 0x6D])),
        ]
    );
    assert!(buf.is_empty());
    assert_eq!(values[1].as_int(), 32);
    assert_eq!(values[3].as_int(), 0);
}

#[test]
fn test_number_values() {
    assert_eq!(format_number(decode_packed_decimal(&[0xC2, 0x02, 0x36, 0x0D])), "153.12");
    assert_eq!(format_number(decode_packed_decimal(&[0x80])), "0");
    assert_eq!(format_number(decode_packed_decimal(&[0x3E, 0x64, 0x66])), "-1");
    assert!(decode_packed_decimal(&[]).is_nan());
}

#[test]
fn test_date_value() {
    let date = decode_date(&[120, 120, 1, 1, 1, 1, 1]).unwrap();
    assert_eq!(format_date(&date), "2020-01-01T00:00:00Z");
}

#[test]
fn test_date_value_too_short() {
    assert!(decode_date(&[120, 120, 1]).unwrap_err().is_decode_error());
}
