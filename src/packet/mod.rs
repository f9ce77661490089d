//! Reconstructed TNS packets
//!
//! A [`Packet`] is one network operation recovered from a trace file: the
//! payload bytes gathered from a hex dump block plus the context found around
//! it. The TNS framing of the payload can be inspected with [`PacketHeader`]
//! and [`DataHeader`].

mod header;

pub use header::{DataHeader, PacketHeader};

use std::fmt;

use bytes::Bytes;
use chrono::NaiveDateTime;

use crate::constants::OperationKind;
use crate::error::Result;
use crate::timestamp::TimestampFormat;

/// Octets per row of a hex dump
const DUMP_ROW: usize = 16;

/// A packet reconstructed from a trace file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Trace file the packet comes from
    pub source_name: String,
    /// Line of the `packet dump` marker
    pub line: usize,
    /// Trace category that dumped the packet
    pub kind: OperationKind,
    /// Client process id
    pub pid: Option<u32>,
    /// Client program name, empty when unknown
    pub client: String,
    /// Timestamp as written in the trace
    pub timestamp: String,
    /// Socket handle reported next to the dump
    pub socket: Option<u32>,
    /// Packet bytes
    pub payload: Bytes,
}

impl Packet {
    /// Decode the TNS header at the start of the payload
    pub fn header(&self) -> Result<PacketHeader> {
        PacketHeader::parse(&self.payload)
    }

    /// Decode the DATA packet header, if this is a DATA packet
    pub fn data_header(&self) -> Result<Option<DataHeader>> {
        DataHeader::parse(&self.payload)
    }

    /// Parse the packet timestamp with the given mask
    pub fn parsed_timestamp(&self, format: &TimestampFormat) -> Result<NaiveDateTime> {
        format.parse(&self.timestamp)
    }

    /// Context line: `source(line),timestamp,program(pid),kind:`
    pub fn context(&self) -> String {
        format!(
            "{}({}),{},{}({}),{}:",
            self.source_name,
            self.line,
            self.timestamp,
            self.client,
            self.pid.unwrap_or(0),
            self.kind
        )
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.context())?;
        f.write_str(&hex_dump(&self.payload))
    }
}

/// Canonical hex dump: offset column, 16 octets per row, ASCII column
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() / DUMP_ROW * 79 + 79);
    for (row, chunk) in data.chunks(DUMP_ROW).enumerate() {
        out.push_str(&format!("{:08x}  ", row * DUMP_ROW));
        for i in 0..DUMP_ROW {
            match chunk.get(i) {
                Some(b) => out.push_str(&format!("{:02x} ", b)),
                None => out.push_str("   "),
            }
            if i == DUMP_ROW / 2 - 1 {
                out.push(' ');
            }
        }
        out.push_str(" |");
        out.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Packet {
        Packet {
            source_name: "cli_5304.trc".to_string(),
            line: 7,
            kind: OperationKind::Receive,
            pid: Some(5304),
            client: "Service.exe".to_string(),
            timestamp: "12-FEB-2019 17:25:10:804".to_string(),
            socket: None,
            payload: Bytes::from_static(&[0x00, 0x08, 0x00, 0x00, 0x0B, 0x00, 0x00, 0x00]),
        }
    }

    #[test]
    fn test_context_line() {
        assert_eq!(
            sample().context(),
            "cli_5304.trc(7),12-FEB-2019 17:25:10:804,Service.exe(5304),nsprecv:"
        );
    }

    #[test]
    fn test_display_includes_dump() {
        let text = sample().to_string();
        let mut lines = text.lines();
        lines.next();
        let dump = lines.next().unwrap();
        assert!(dump.starts_with("00000000  00 08 00 00 0b 00 00 00 "));
        assert!(dump.ends_with("|........|"));
    }

    #[test]
    fn test_hex_dump_rows() {
        let data: Vec<u8> = (0x41..0x41 + 20).collect();
        let dump = hex_dump(&data);
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            "00000000  41 42 43 44 45 46 47 48  49 4a 4b 4c 4d 4e 4f 50  |ABCDEFGHIJKLMNOP|"
        );
        assert!(rows[1].starts_with("00000010  51 52 53 54 "));
        assert!(rows[1].ends_with("|QRST|"));
        assert!(hex_dump(&[]).is_empty());
    }

    #[test]
    fn test_header_of_payload() {
        let header = sample().header().unwrap();
        assert_eq!(header.length, 8);
        assert!(sample().data_header().unwrap().is_none());
    }

    #[test]
    fn test_parsed_timestamp() {
        let ts = sample()
            .parsed_timestamp(&TimestampFormat::default())
            .unwrap();
        assert_eq!(ts.to_string(), "2019-02-12 17:25:10.804");
    }
}
