//! TNS protocol and trace file constants
//!
//! Wire constants are limited to what is needed to recognize data packets and
//! decode execute requests. Type codes follow the Oracle external datatype
//! numbering used in bind descriptors.

use std::fmt;

// =============================================================================
// Packet Types
// =============================================================================

/// TNS packet types (found in packet header byte 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketType {
    /// Initial connection request from client
    Connect = 1,
    /// Server accepts connection
    Accept = 2,
    /// Server acknowledges (rarely used)
    Ack = 3,
    /// Server refuses connection
    Refuse = 4,
    /// Server redirects to different address
    Redirect = 5,
    /// Data packet (contains protocol messages)
    Data = 6,
    /// Null packet
    Null = 7,
    /// Abort connection
    Abort = 9,
    /// Request packet resend
    Resend = 11,
    /// Marker packet (break/reset/interrupt)
    Marker = 12,
    /// Attention packet
    Attention = 13,
    /// Control packet (inband notifications)
    Control = 14,
}

impl TryFrom<u8> for PacketType {
    type Error = crate::error::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PacketType::Connect),
            2 => Ok(PacketType::Accept),
            3 => Ok(PacketType::Ack),
            4 => Ok(PacketType::Refuse),
            5 => Ok(PacketType::Redirect),
            6 => Ok(PacketType::Data),
            7 => Ok(PacketType::Null),
            9 => Ok(PacketType::Abort),
            11 => Ok(PacketType::Resend),
            12 => Ok(PacketType::Marker),
            13 => Ok(PacketType::Attention),
            14 => Ok(PacketType::Control),
            _ => Err(crate::error::Error::conversion(format!(
                "invalid packet type: {}",
                value
            ))),
        }
    }
}

/// Data flags (first 2 bytes after the header of a DATA packet)
#[allow(missing_docs)]
pub mod data_flags {
    pub const EOF: u16 = 0x0040;
}

/// TNS packet header size in bytes
pub const PACKET_HEADER_SIZE: usize = 8;

/// Size of the header plus the data-packet fields (flags, function, sequence,
/// extended function)
pub const DATA_HEADER_SIZE: usize = 13;

// =============================================================================
// Length Indicators
// =============================================================================

/// Length prefix constants
pub mod length {
    /// Marker announcing a value split in length-prefixed chunks
    pub const LONG_INDICATOR: u8 = 0xFE;
    /// Widest integer a compressed integer can carry
    pub const MAX_INTEGER_BYTES: usize = 8;
}

// =============================================================================
// Execute Request Layout
// =============================================================================

/// Positional constants of a client execute request
pub mod execute {
    /// Execute requests shorter than this are truncated captures
    pub const MIN_PAYLOAD: usize = 0x20;
    /// Offset of the function marker pair in the payload
    pub const MARKER_OFFSET: usize = 0x12;
    /// TTC function message marker
    pub const FUNCTION_MARKER: u8 = 0x03;
    /// Execute function code
    pub const EXECUTE_FUNCTION: u8 = 0x5E;
    /// Bytes at or below this value are structural filler before the SQL text
    pub const SQL_FILLER_MAX: u8 = 5;
    /// Number of two-byte integers of the AL8I4 array following the SQL text
    pub const AL8I4_LEN: usize = 13;
}

// =============================================================================
// Trace Categories
// =============================================================================

/// Trace category emitting a packet dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    /// `nspsend`: packet handed to the transport
    Send,
    /// `nsprecv`: packet read from the transport
    Receive,
    /// `nsbasic_bsd`: client buffer send
    BasicSend,
    /// `nsbasic_brc`: client buffer receive
    BasicReceive,
}

impl OperationKind {
    /// All recognized categories
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Send,
        OperationKind::Receive,
        OperationKind::BasicSend,
        OperationKind::BasicReceive,
    ];

    /// Category name as written in trace files
    pub fn category(&self) -> &'static str {
        match self {
            OperationKind::Send => "nspsend",
            OperationKind::Receive => "nsprecv",
            OperationKind::BasicSend => "nsbasic_bsd",
            OperationKind::BasicReceive => "nsbasic_brc",
        }
    }

    /// Look up a category by its trace name
    pub fn from_category(name: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.category().as_bytes() == name)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

/// Literal markers found in trace lines
pub mod trace_marker {
    /// Suffix of the line announcing a hex dump
    pub const PACKET_DUMP: &[u8] = b"packet dump";
    /// Message opening a category block
    pub const ENTRY: &[u8] = b"entry";
    /// Message closing a category block
    pub const EXIT: &[u8] = b"exit";
    /// Message closing a category block on success
    pub const NORMAL_EXIT: &[u8] = b"normal exit";
    /// Message closing a category block on failure
    pub const ERROR_EXIT: &[u8] = b"error exit";
    /// Category carrying connection descriptions
    pub const CONNECTION_INFO: &[u8] = b"nsc2addr";
    /// Key of the client program in a connection description
    pub const PROGRAM_KEY: &[u8] = b"PROGRAM=";
    /// Token preceding a socket handle number
    pub const SOCKET: &[u8] = b"socket";
    /// Right-hand delimiter of a hex dump row
    pub const DUMP_DELIMITER: u8 = b'|';
}

// =============================================================================
// Oracle Data Types
// =============================================================================

/// Oracle external data type codes found in bind descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OracleType {
    /// VARCHAR2 / NVARCHAR2
    Varchar = 1,
    /// NUMBER
    Number = 2,
    /// Signed binary integer
    BinaryInteger = 3,
    /// FLOAT
    Float = 4,
    /// Null-terminated string
    NullStr = 5,
    /// VARNUM
    VarNum = 6,
    /// LONG
    Long = 8,
    /// VARCHAR
    VarcharExt = 9,
    /// ROWID
    Rowid = 11,
    /// DATE
    Date = 12,
    /// VARRAW
    VarRaw = 15,
    /// Native BINARY_FLOAT
    BFloat = 21,
    /// Native BINARY_DOUBLE
    BDouble = 22,
    /// RAW
    Raw = 23,
    /// LONG RAW
    LongRaw = 24,
    /// Unsigned integer
    Uint = 68,
    /// LONG VARCHAR
    LongVarchar = 94,
    /// LONG VARRAW
    LongVarRaw = 95,
    /// CHAR / NCHAR
    Char = 96,
    /// Null-terminated CHAR
    Charz = 97,
    /// BINARY_FLOAT
    BinaryFloat = 100,
    /// BINARY_DOUBLE
    BinaryDouble = 101,
    /// REF CURSOR
    Cursor = 102,
    /// XMLTYPE / named type
    XmlType = 108,
    /// REF
    Ref = 110,
    /// CLOB
    Clob = 112,
    /// BLOB
    Blob = 113,
    /// BFILE
    Bfile = 114,
    /// Result set
    ResultSet = 116,
    /// OCI string
    OciString = 155,
    /// OCI date
    OciDate = 156,
    /// TIMESTAMP (descriptor form)
    TimestampDty = 180,
    /// TIMESTAMP WITH TIME ZONE (descriptor form)
    TimestampTzDty = 181,
    /// INTERVAL YEAR TO MONTH (descriptor form)
    IntervalYmDty = 182,
    /// INTERVAL DAY TO SECOND (descriptor form)
    IntervalDsDty = 183,
    /// TIME WITH TIME ZONE
    TimeTz = 186,
    /// TIMESTAMP
    Timestamp = 187,
    /// TIMESTAMP WITH TIME ZONE
    TimestampTz = 188,
    /// INTERVAL YEAR TO MONTH
    IntervalYm = 189,
    /// INTERVAL DAY TO SECOND
    IntervalDs = 190,
    /// UROWID
    Urowid = 208,
    /// TIMESTAMP WITH LOCAL TIME ZONE (descriptor form)
    TimestampLtzDty = 231,
    /// TIMESTAMP WITH LOCAL TIME ZONE
    TimestampLtz = 232,
}

impl OracleType {
    /// Check if values of this type are character data
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            OracleType::Varchar
                | OracleType::VarcharExt
                | OracleType::Char
                | OracleType::Charz
                | OracleType::Long
                | OracleType::LongVarchar
                | OracleType::NullStr
        )
    }

    /// Check if values of this type use the DATE/TIMESTAMP encoding
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            OracleType::Date
                | OracleType::Timestamp
                | OracleType::TimestampDty
                | OracleType::TimestampTz
                | OracleType::TimestampTzDty
                | OracleType::TimestampLtz
                | OracleType::TimestampLtzDty
        )
    }

    /// Check if values of this type use the packed decimal encoding
    pub fn is_numeric(&self) -> bool {
        *self == OracleType::Number
    }

    /// Type name used in placeholders
    pub fn name(&self) -> &'static str {
        match self {
            OracleType::Varchar => "VARCHAR2",
            OracleType::Number => "NUMBER",
            OracleType::BinaryInteger => "BINARY_INTEGER",
            OracleType::Float => "FLOAT",
            OracleType::NullStr => "STRING",
            OracleType::VarNum => "VARNUM",
            OracleType::Long => "LONG",
            OracleType::VarcharExt => "VARCHAR",
            OracleType::Rowid => "ROWID",
            OracleType::Date => "DATE",
            OracleType::VarRaw => "VARRAW",
            OracleType::BFloat => "NATIVE_FLOAT",
            OracleType::BDouble => "NATIVE_DOUBLE",
            OracleType::Raw => "RAW",
            OracleType::LongRaw => "LONG_RAW",
            OracleType::Uint => "UNSIGNED",
            OracleType::LongVarchar => "LONG_VARCHAR",
            OracleType::LongVarRaw => "LONG_VARRAW",
            OracleType::Char => "CHAR",
            OracleType::Charz => "CHARZ",
            OracleType::BinaryFloat => "BINARY_FLOAT",
            OracleType::BinaryDouble => "BINARY_DOUBLE",
            OracleType::Cursor => "REF_CURSOR",
            OracleType::XmlType => "XMLTYPE",
            OracleType::Ref => "REF",
            OracleType::Clob => "CLOB",
            OracleType::Blob => "BLOB",
            OracleType::Bfile => "BFILE",
            OracleType::ResultSet => "RESULT_SET",
            OracleType::OciString => "OCI_STRING",
            OracleType::OciDate => "OCI_DATE",
            OracleType::TimestampDty => "TIMESTAMP_DTY",
            OracleType::TimestampTzDty => "TIMESTAMP_TZ_DTY",
            OracleType::IntervalYmDty => "INTERVAL_YM_DTY",
            OracleType::IntervalDsDty => "INTERVAL_DS_DTY",
            OracleType::TimeTz => "TIME_TZ",
            OracleType::Timestamp => "TIMESTAMP",
            OracleType::TimestampTz => "TIMESTAMP_TZ",
            OracleType::IntervalYm => "INTERVAL_YM",
            OracleType::IntervalDs => "INTERVAL_DS",
            OracleType::Urowid => "UROWID",
            OracleType::TimestampLtzDty => "TIMESTAMP_LTZ_DTY",
            OracleType::TimestampLtz => "TIMESTAMP_LTZ",
        }
    }
}

impl TryFrom<u8> for OracleType {
    type Error = crate::error::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OracleType::Varchar),
            2 => Ok(OracleType::Number),
            3 => Ok(OracleType::BinaryInteger),
            4 => Ok(OracleType::Float),
            5 => Ok(OracleType::NullStr),
            6 => Ok(OracleType::VarNum),
            8 => Ok(OracleType::Long),
            9 => Ok(OracleType::VarcharExt),
            11 => Ok(OracleType::Rowid),
            12 => Ok(OracleType::Date),
            15 => Ok(OracleType::VarRaw),
            21 => Ok(OracleType::BFloat),
            22 => Ok(OracleType::BDouble),
            23 => Ok(OracleType::Raw),
            24 => Ok(OracleType::LongRaw),
            68 => Ok(OracleType::Uint),
            94 => Ok(OracleType::LongVarchar),
            95 => Ok(OracleType::LongVarRaw),
            96 => Ok(OracleType::Char),
            97 => Ok(OracleType::Charz),
            100 => Ok(OracleType::BinaryFloat),
            101 => Ok(OracleType::BinaryDouble),
            102 => Ok(OracleType::Cursor),
            108 => Ok(OracleType::XmlType),
            110 => Ok(OracleType::Ref),
            112 => Ok(OracleType::Clob),
            113 => Ok(OracleType::Blob),
            114 => Ok(OracleType::Bfile),
            116 => Ok(OracleType::ResultSet),
            155 => Ok(OracleType::OciString),
            156 => Ok(OracleType::OciDate),
            180 => Ok(OracleType::TimestampDty),
            181 => Ok(OracleType::TimestampTzDty),
            182 => Ok(OracleType::IntervalYmDty),
            183 => Ok(OracleType::IntervalDsDty),
            186 => Ok(OracleType::TimeTz),
            187 => Ok(OracleType::Timestamp),
            188 => Ok(OracleType::TimestampTz),
            189 => Ok(OracleType::IntervalYm),
            190 => Ok(OracleType::IntervalDs),
            208 => Ok(OracleType::Urowid),
            231 => Ok(OracleType::TimestampLtzDty),
            232 => Ok(OracleType::TimestampLtz),
            _ => Err(crate::error::Error::conversion(format!(
                "invalid Oracle type: {}",
                value
            ))),
        }
    }
}

/// Type code of a bind descriptor, keeping codes this crate does not name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// A known Oracle type
    Known(OracleType),
    /// A type code outside [`OracleType`]
    Other(u8),
}

impl From<u8> for DataType {
    fn from(value: u8) -> Self {
        OracleType::try_from(value)
            .map(DataType::Known)
            .unwrap_or(DataType::Other(value))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Known(t) => f.write_str(t.name()),
            DataType::Other(code) => write!(f, "OracleType({})", code),
        }
    }
}

// =============================================================================
// Bind Directions
// =============================================================================

/// Bind parameter direction
///
/// Execute calls in client traces carry no direction field, so recovered
/// parameters are always [`BindDirection::Input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BindDirection {
    /// Input only parameter - default
    #[default]
    Input = 1,
    /// Output only parameter
    Output = 2,
    /// Input/Output parameter
    InputOutput = 3,
    /// Returned value
    ReturnValue = 9,
}
