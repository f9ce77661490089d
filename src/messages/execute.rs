//! Execute request parsing
//!
//! Client execute calls travel in DATA packets whose TTC function sits at a
//! fixed offset of the reconstructed payload:
//!
//! ```text
//! Offset | Description
//! -------+---------------------------------------------
//!      0 | TNS header (8 bytes)
//!      8 | Data flags (2 bytes)
//!     10 | Pre-function bytes
//!   0x12 | 0x03 0x5E (TTC function, execute)
//!   0x14 | Execute header (see EXECUTE_HEADER_LAYOUT)
//!      n | Filler bytes <= 5
//!      m | SQL text (length prefixed, possibly chunked)
//!        | 13 compressed integers (al8i4)
//!        | Bind descriptors, one separator byte, bind values
//! ```
//!
//! The layout was recovered from observed traces; the purpose of the unused
//! fields is not known.

use super::bind::{parse_bind_descriptor, parse_bind_values};
use super::field::{read_field, FieldEncoding};
use crate::buffer::ReadBuffer;
use crate::constants::execute;
use crate::error::{Error, Result};
use crate::statement::ParameterInfo;

/// Named execute header fields, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteField {
    /// Execute flags
    Flags,
    /// Execute operation bit set
    ExecuteOp,
    /// Server cursor id, 0 for a new cursor
    CursorId,
    /// Declared statement length
    DeclaredLength,
    /// Length of the al8i4 array, observed as 13
    Al8i4Length,
    /// Rows to prefetch
    RowsToFetch,
    /// Non-zero when bind parameters follow
    HasParameters,
    /// Read and ignored
    Unused,
}

/// Layout of the execute header following the function marker
pub const EXECUTE_HEADER_LAYOUT: [(ExecuteField, FieldEncoding); 13] = [
    (ExecuteField::Flags, FieldEncoding::Byte),
    (ExecuteField::ExecuteOp, FieldEncoding::Compressed(4)),
    (ExecuteField::CursorId, FieldEncoding::Compressed(2)),
    (ExecuteField::Unused, FieldEncoding::Byte),
    (ExecuteField::DeclaredLength, FieldEncoding::Compressed(4)),
    (ExecuteField::Unused, FieldEncoding::Byte),
    (ExecuteField::Al8i4Length, FieldEncoding::Compressed(2)),
    (ExecuteField::Unused, FieldEncoding::Byte),
    (ExecuteField::Unused, FieldEncoding::Byte),
    (ExecuteField::Unused, FieldEncoding::Compressed(4)),
    (ExecuteField::RowsToFetch, FieldEncoding::Compressed(4)),
    (ExecuteField::Unused, FieldEncoding::Compressed(4)),
    (ExecuteField::HasParameters, FieldEncoding::Byte),
];

/// Execute request decoded from a client packet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteRequest {
    /// Execute flags
    pub flags: u8,
    /// Execute operation bit set
    pub execute_op: u32,
    /// Cursor id
    pub cursor_id: u16,
    /// Declared statement length
    pub declared_length: u32,
    /// al8i4 array length
    pub al8i4_length: u16,
    /// Rows to prefetch
    pub rows_to_fetch: u32,
    /// Number of bind parameters declared
    pub parameter_count: u16,
    /// SQL text
    pub sql: String,
    /// Bind parameters with their values
    pub parameters: Vec<ParameterInfo>,
}

impl ExecuteRequest {
    /// Parse an execute request from a reconstructed payload
    ///
    /// Fails with [`Error::PacketTooShort`] on truncated captures,
    /// [`Error::UnexpectedMarker`] when the payload is not an execute call,
    /// and with a buffer error when any field is cut short.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        if payload.len() < execute::MIN_PAYLOAD {
            return Err(Error::PacketTooShort {
                expected: execute::MIN_PAYLOAD,
                actual: payload.len(),
            });
        }

        let mut buf = ReadBuffer::from_slice(payload);
        buf.set_position(execute::MARKER_OFFSET)?;
        expect_marker(&mut buf, execute::FUNCTION_MARKER)?;
        expect_marker(&mut buf, execute::EXECUTE_FUNCTION)?;

        let mut request = ExecuteRequest::default();
        for (field, encoding) in EXECUTE_HEADER_LAYOUT {
            let value = read_field(&mut buf, encoding)?.as_int();
            match field {
                ExecuteField::Flags => request.flags = value as u8,
                ExecuteField::ExecuteOp => request.execute_op = value as u32,
                ExecuteField::CursorId => request.cursor_id = value as u16,
                ExecuteField::DeclaredLength => request.declared_length = value as u32,
                ExecuteField::Al8i4Length => request.al8i4_length = value as u16,
                ExecuteField::RowsToFetch => request.rows_to_fetch = value as u32,
                ExecuteField::HasParameters => {
                    if value > 0 {
                        request.parameter_count = buf.read_ub2()?;
                    }
                }
                ExecuteField::Unused => {}
            }
        }

        skip_filler(&mut buf)?;
        let sql = buf.read_length_prefixed_bytes()?;
        request.sql = String::from_utf8_lossy(&sql).into_owned();

        for _ in 0..execute::AL8I4_LEN {
            buf.skip_ub()?;
        }

        if request.parameter_count > 0 {
            let mut parameters = Vec::with_capacity(request.parameter_count as usize);
            for _ in 0..request.parameter_count {
                parameters.push(parse_bind_descriptor(&mut buf)?);
            }
            buf.skip(1)?;
            parse_bind_values(&mut buf, &mut parameters)?;
            request.parameters = parameters;
        }

        Ok(request)
    }
}

fn expect_marker(buf: &mut ReadBuffer, expected: u8) -> Result<()> {
    let offset = buf.position();
    let actual = buf.read_u8()?;
    if actual != expected {
        return Err(Error::UnexpectedMarker {
            offset,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Skip the run of small structural bytes ahead of the SQL text
fn skip_filler(buf: &mut ReadBuffer) -> Result<()> {
    loop {
        if buf.read_u8()? > execute::SQL_FILLER_MAX {
            return buf.unread();
        }
    }
}
