//! TNS packet header decoding
//!
//! The TNS packet header is 8 bytes:
//!
//! ```text
//! +--------+--------+--------+--------+--------+--------+--------+--------+
//! |   Length (2)    | Pkt Checksum(2) | Type(1)| Flags(1)| Hdr Checksum(2)|
//! +--------+--------+--------+--------+--------+--------+--------+--------+
//! ```
//!
//! Trace dumps are written by pre-large-SDU clients, so the length field is
//! always the 2-byte form. DATA packets follow the header with a 2-byte data
//! flags word, the TTC function code, a sequence number and an extended
//! function code.

use std::fmt;

use crate::buffer::ReadBuffer;
use crate::constants::{data_flags, PacketType, DATA_HEADER_SIZE, PACKET_HEADER_SIZE};
use crate::error::{Error, Result};

/// TNS packet header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Total packet length including header
    pub length: u16,
    /// Packet checksum (usually 0)
    pub packet_checksum: u16,
    /// Raw packet type code
    pub type_code: u8,
    /// Packet flags
    pub flags: u8,
    /// Header checksum (usually 0)
    pub header_checksum: u16,
}

impl PacketHeader {
    /// Parse a packet header from the start of a payload
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PACKET_HEADER_SIZE {
            return Err(Error::PacketTooShort {
                expected: PACKET_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = ReadBuffer::from_slice(&data[..PACKET_HEADER_SIZE]);
        Self::read(&mut buf)
    }

    /// Read a packet header from a buffer
    pub fn read(buf: &mut ReadBuffer) -> Result<Self> {
        Ok(Self {
            length: buf.read_u16_be()?,
            packet_checksum: buf.read_u16_be()?,
            type_code: buf.read_u8()?,
            flags: buf.read_u8()?,
            header_checksum: buf.read_u16_be()?,
        })
    }

    /// Get the packet type, if the code is a known one
    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::try_from(self.type_code).ok()
    }

    /// Check if this is a DATA packet
    pub fn is_data(&self) -> bool {
        self.packet_type() == Some(PacketType::Data)
    }

    /// Get the payload length (total length minus header)
    pub fn payload_length(&self) -> usize {
        (self.length as usize).saturating_sub(PACKET_HEADER_SIZE)
    }
}

impl fmt::Display for PacketHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.packet_type() {
            Some(t) => format!("{:?}", t),
            None => "Unknown".to_string(),
        };
        write!(
            f,
            "Packet header: PktLen({}),Chksum({:04x}),PkType({}={}),Flags({:02x}),HdrChkSum({:04x})",
            self.length, self.packet_checksum, self.type_code, name, self.flags, self.header_checksum
        )
    }
}

/// Header of a DATA packet: the TNS header plus the data packet fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// The TNS header
    pub header: PacketHeader,
    /// Data flags word
    pub data_flags: u16,
    /// TTC function code
    pub function: u8,
    /// Sequence number
    pub sequence: u8,
    /// Extended function code
    pub extended_function: u8,
}

impl DataHeader {
    /// Parse the data packet header from the start of a payload
    ///
    /// Returns `Ok(None)` when the payload is a valid TNS packet of another type.
    pub fn parse(data: &[u8]) -> Result<Option<Self>> {
        let header = PacketHeader::parse(data)?;
        if !header.is_data() {
            return Ok(None);
        }
        if data.len() < DATA_HEADER_SIZE {
            return Err(Error::PacketTooShort {
                expected: DATA_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut buf = ReadBuffer::from_slice(&data[PACKET_HEADER_SIZE..DATA_HEADER_SIZE]);
        Ok(Some(Self {
            header,
            data_flags: buf.read_u16_be()?,
            function: buf.read_u8()?,
            sequence: buf.read_u8()?,
            extended_function: buf.read_u8()?,
        }))
    }

    /// Check if the EOF data flag is set
    pub fn is_eof(&self) -> bool {
        self.data_flags & data_flags::EOF != 0
    }
}

impl fmt::Display for DataHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        write!(
            f,
            "Data packet fields: DataFlag({:016b}),Function({:02x}),Sequence({}),ExtendedFunction({:02x})",
            self.data_flags, self.function, self.sequence, self.extended_function
        )
    }
}
