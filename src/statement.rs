//! Recovered SQL statements
//!
//! A [`Query`] is an execute call found in a client packet: the SQL text, the
//! execute header fields and the bind parameters with their raw values.
//! Values stay undecoded until rendered.

use std::fmt;

use crate::constants::{BindDirection, DataType, OracleType};
use crate::error::Result;
use crate::messages::ExecuteRequest;
use crate::packet::Packet;
use crate::types::{decode_date, decode_packed_decimal, format_date, format_number};

/// Rendering of a NULL bind value
pub const NULL_TEXT: &str = "(null)";

/// A bind parameter: its descriptor and raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Oracle type code
    pub data_type: DataType,
    /// Bind direction
    pub direction: BindDirection,
    /// Whether the value is NULL
    pub is_null: bool,
    /// Descriptor flag byte
    pub flag: u8,
    /// Numeric precision
    pub precision: u8,
    /// Numeric scale
    pub scale: u8,
    /// Maximum value length
    pub max_len: u32,
    /// Maximum number of array elements
    pub max_array_elements: u32,
    /// Continuation flags
    pub cont_flag: i64,
    /// Object type identifier, for object binds
    pub type_oid: Option<Vec<u8>>,
    /// Type version
    pub version: u32,
    /// Character set id
    pub charset_id: u16,
    /// Character set form (1=implicit, 2=nchar)
    pub charset_form: u8,
    /// Maximum length in characters
    pub max_char_len: u32,
    /// Raw value bytes
    pub value: Vec<u8>,
}

impl Default for ParameterInfo {
    fn default() -> Self {
        Self {
            data_type: DataType::Other(0),
            direction: BindDirection::Input,
            is_null: false,
            flag: 0,
            precision: 0,
            scale: 0,
            max_len: 0,
            max_array_elements: 0,
            cont_flag: 0,
            type_oid: None,
            version: 0,
            charset_id: 0,
            charset_form: 0,
            max_char_len: 0,
            value: Vec::new(),
        }
    }
}

impl ParameterInfo {
    /// Check if the value renders as text that needs quoting
    pub fn is_character(&self) -> bool {
        matches!(self.data_type, DataType::Known(t) if t.is_character())
    }

    /// Render the value as text
    ///
    /// Character values are returned as is (less the terminator of a
    /// null-terminated string), dates in RFC 3339, NUMBER values in their
    /// shortest form. Other types render as the type name in
    /// parentheses.
    pub fn render(&self) -> String {
        if self.is_null {
            return NULL_TEXT.to_string();
        }
        match self.data_type {
            DataType::Known(OracleType::NullStr) => {
                let text = self.value.strip_suffix(&[0u8]).unwrap_or(&self.value[..]);
                String::from_utf8_lossy(text).into_owned()
            }
            DataType::Known(t) if t.is_character() => {
                String::from_utf8_lossy(&self.value).into_owned()
            }
            DataType::Known(t) if t.is_datetime() => match decode_date(&self.value) {
                Ok(date) => format_date(&date),
                Err(e) => format!("({})", e),
            },
            DataType::Known(t) if t.is_numeric() => {
                format_number(decode_packed_decimal(&self.value))
            }
            other => format!("({})", other),
        }
    }
}

/// A SQL statement recovered from a client packet
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Packet the statement was decoded from
    pub packet: Packet,
    /// SQL text
    pub text: String,
    /// Execute operation bit set
    pub execute_op: u32,
    /// Cursor id
    pub cursor_id: u16,
    /// Declared statement length
    pub declared_length: u32,
    /// Rows to prefetch
    pub rows_to_fetch: u32,
    /// Number of bind parameters declared
    pub parameter_count: u16,
    /// Bind parameters in position order
    pub parameters: Vec<ParameterInfo>,
    /// Server packet answering the statement, when paired
    pub response: Option<Packet>,
}

impl Query {
    /// Decode the execute call carried by a packet
    ///
    /// Either the whole statement decodes or an error is returned.
    pub fn from_packet(packet: Packet) -> Result<Self> {
        let request = ExecuteRequest::parse(&packet.payload)?;
        Ok(Self {
            packet,
            text: request.sql,
            execute_op: request.execute_op,
            cursor_id: request.cursor_id,
            declared_length: request.declared_length,
            rows_to_fetch: request.rows_to_fetch,
            parameter_count: request.parameter_count,
            parameters: request.parameters,
            response: None,
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.packet.context())?;
        writeln!(f, "{}", self.text)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if param.is_character() && !param.is_null {
                writeln!(f, "  :{} = '{}'", i + 1, param.render().replace('\'', "''"))?;
            } else {
                writeln!(f, "  :{} = {}", i + 1, param.render())?;
            }
        }
        Ok(())
    }
}
