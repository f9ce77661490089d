//! Field extraction from single trace lines
//!
//! Trace lines have the shape `(pid) [timestamp] category: message`. The pid
//! and timestamp prefixes are optional (they depend on the client's trace
//! settings) and lines of free-form text are common, so every field is
//! optional and extraction never fails.

use crate::constants::{trace_marker, OperationKind};

/// Fields of one trace line, borrowed from the line bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceLine<'a> {
    /// Leading `(pid)`
    pub pid: Option<u32>,
    /// Text between the first pair of brackets
    pub timestamp: Option<&'a [u8]>,
    /// Single word before the first colon
    pub category: Option<&'a [u8]>,
    /// Text after the category separator, leading blanks removed
    pub message: &'a [u8],
}

impl<'a> TraceLine<'a> {
    /// Split a line into its fields
    pub fn parse(line: &'a [u8]) -> Self {
        let mut rest = trim_start(line);
        let mut fields = TraceLine::default();

        if let Some((pid, tail)) = enclosed(rest, b'(', b')') {
            if let Some(pid) = parse_digits(pid) {
                fields.pid = Some(pid);
                rest = trim_start(tail);
            }
        }

        if let Some((timestamp, tail)) = enclosed(rest, b'[', b']') {
            fields.timestamp = Some(timestamp);
            rest = trim_start(tail);
        }

        match rest.iter().position(|&c| c == b':') {
            Some(colon) if colon > 0 && !rest[..colon].contains(&b' ') => {
                fields.category = Some(&rest[..colon]);
                fields.message = trim_start(&rest[colon + 1..]);
            }
            _ => fields.message = rest,
        }
        fields
    }

    /// Category as a packet-producing operation
    pub fn operation(&self) -> Option<OperationKind> {
        self.category.and_then(OperationKind::from_category)
    }

    /// Check if the message opens a category block
    pub fn is_entry(&self) -> bool {
        self.message.starts_with(trace_marker::ENTRY)
    }

    /// Check if the message closes a category block
    pub fn is_exit(&self) -> bool {
        self.message.starts_with(trace_marker::EXIT)
            || self.message.starts_with(trace_marker::NORMAL_EXIT)
            || self.message.starts_with(trace_marker::ERROR_EXIT)
    }

    /// Check if the message announces a hex dump
    pub fn is_packet_dump(&self) -> bool {
        trim_end(self.message) == trace_marker::PACKET_DUMP
    }

    /// Check if this line belongs to the connection description category
    pub fn is_connection_info(&self) -> bool {
        self.category == Some(trace_marker::CONNECTION_INFO)
    }

    /// Append the hex octets of a dump row to `out`
    ///
    /// Octets are space separated pairs of hex digits, optionally split by a
    /// lone `-`. Decoding stops at the first token that is not an octet,
    /// normally the blank padding before the ASCII column. Returns the number
    /// of octets appended.
    pub fn decode_octets(&self, out: &mut Vec<u8>) -> usize {
        let before = out.len();
        let mut octet = [0u8; 1];
        for token in self.message.split(|&c| c == b' ') {
            if token == b"-" {
                continue;
            }
            if token.len() != 2 || hex::decode_to_slice(token, &mut octet).is_err() {
                break;
            }
            out.push(octet[0]);
        }
        out.len() - before
    }
}

/// Check if a line is a row of a hex dump block
pub fn is_dump_row(line: &[u8]) -> bool {
    trim_end(line).last() == Some(&trace_marker::DUMP_DELIMITER)
}

/// Find a socket handle number: the token `socket` followed by digits
pub fn find_socket(line: &[u8]) -> Option<u32> {
    let marker = trace_marker::SOCKET;
    let mut from = 0;
    while let Some(pos) = find(&line[from..], marker) {
        let start = from + pos;
        let after = trim_start(&line[start + marker.len()..]);
        let preceded_by_word = start > 0 && line[start - 1].is_ascii_alphanumeric();
        let digits = after.iter().take_while(|c| c.is_ascii_digit()).count();
        if !preceded_by_word && digits > 0 {
            if let Some(socket) = parse_digits(&after[..digits]) {
                return Some(socket);
            }
        }
        from = start + marker.len();
    }
    None
}

/// Extract the client program from a connection description
///
/// The `PROGRAM=` value runs up to the next closing parenthesis; any `/` or
/// `\` separated directory prefix is removed.
pub fn find_program(line: &[u8]) -> Option<String> {
    let start = find(line, trace_marker::PROGRAM_KEY)? + trace_marker::PROGRAM_KEY.len();
    let value = &line[start..];
    let end = value.iter().position(|&c| c == b')')?;
    let program = String::from_utf8_lossy(&value[..end]);
    Some(base_name(&program).to_string())
}

/// Last component of a path using either `/` or `\` as separator
pub fn base_name(path: &str) -> &str {
    match path.rfind(|c| c == '/' || c == '\\') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

fn enclosed(text: &[u8], open: u8, close: u8) -> Option<(&[u8], &[u8])> {
    if text.first() != Some(&open) {
        return None;
    }
    let end = text.iter().position(|&c| c == close)?;
    Some((&text[1..end], &text[end + 1..]))
}

fn parse_digits(text: &[u8]) -> Option<u32> {
    std::str::from_utf8(text).ok()?.trim().parse().ok()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_start(text: &[u8]) -> &[u8] {
    let n = text.iter().take_while(|c| c.is_ascii_whitespace()).count();
    &text[n..]
}

fn trim_end(text: &[u8]) -> &[u8] {
    let n = text
        .iter()
        .rev()
        .take_while(|c| c.is_ascii_whitespace())
        .count();
    &text[..text.len() - n]
}
