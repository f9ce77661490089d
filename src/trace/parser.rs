//! Packet reconstruction from trace lines
//!
//! The parser walks the trace with an explicit state machine:
//!
//! ```text
//!  Waiting ──entry──▶ Header ──packet dump──▶ Dump ──other line──▶ Header ──exit──▶ Waiting
//!     │                                        ▲
//!     ├──────────────packet dump───────────────┘
//!     └──nsc2addr──▶ ConnectionInfo ──normal exit──▶ Waiting
//! ```
//!
//! A packet is emitted once its category block closes, when a new dump or
//! category block starts, or at end of input, provided a hex dump was seen.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use super::line::{self, TraceLine};
use super::scanner::LineScanner;
use crate::constants::{trace_marker, OperationKind};
use crate::error::Result;
use crate::packet::Packet;

/// Packet under construction
#[derive(Debug)]
struct PendingPacket {
    kind: OperationKind,
    line: usize,
    pid: Option<u32>,
    client: String,
    timestamp: String,
    socket: Option<u32>,
    dumped: bool,
}

impl PendingPacket {
    fn new(kind: OperationKind, line: usize) -> Self {
        Self {
            kind,
            line,
            pid: None,
            client: String::new(),
            timestamp: String::new(),
            socket: None,
            dumped: false,
        }
    }
}

#[derive(Debug)]
enum State {
    Waiting,
    Header(PendingPacket),
    Dump(PendingPacket),
    ConnectionInfo,
    Done,
}

/// Reconstructs packets from an Oracle Net trace
///
/// Iterates over `Result<Packet>`; only read failures produce an error, after
/// which the iterator is exhausted.
pub struct TraceParser<R> {
    scanner: LineScanner<R>,
    state: State,
    /// Client program per process id, learned from connection descriptions
    clients: HashMap<u32, String>,
    /// Octets of the dump in progress
    payload: Vec<u8>,
    cancel: Option<Arc<AtomicBool>>,
}

impl TraceParser<BufReader<File>> {
    /// Open a trace file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), &path.to_string_lossy()))
    }
}

impl<R: BufRead> TraceParser<R> {
    /// Create a parser over a reader
    ///
    /// Only the last path component of `source_name` is kept.
    pub fn new(reader: R, source_name: &str) -> Self {
        Self {
            scanner: LineScanner::new(reader, line::base_name(source_name)),
            state: State::Waiting,
            clients: HashMap::new(),
            payload: Vec::with_capacity(4096),
            cancel: None,
        }
    }

    /// Stop producing packets once `flag` is raised
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Name of the trace being parsed
    pub fn source_name(&self) -> &str {
        self.scanner.source_name()
    }

    /// Client program names learned so far
    pub fn clients(&self) -> &HashMap<u32, String> {
        &self.clients
    }

    /// Read up to the next reconstructed packet
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            if self.is_cancelled() {
                self.state = State::Done;
            }
            if matches!(self.state, State::Done) {
                return Ok(None);
            }

            let more = match self.scanner.advance() {
                Ok(more) => more,
                Err(e) => {
                    self.state = State::Done;
                    return Err(e);
                }
            };

            if !more {
                let pending = match std::mem::replace(&mut self.state, State::Done) {
                    State::Header(pending) | State::Dump(pending) => Some(pending),
                    _ => None,
                };
                return Ok(pending.and_then(|p| self.finish(p)));
            }

            if let Some(packet) = self.step() {
                return Ok(Some(packet));
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Feed the current line to the state machine
    fn step(&mut self) -> Option<Packet> {
        let line_number = self.scanner.line_number();
        let state = std::mem::replace(&mut self.state, State::Waiting);

        let (next, emitted) = match state {
            State::Waiting => (self.on_waiting(line_number), None),
            State::Header(pending) => self.on_header(pending, line_number),
            State::Dump(pending) => self.on_dump(pending),
            State::ConnectionInfo => (self.on_connection_info(), None),
            State::Done => (State::Done, None),
        };

        self.state = next;
        emitted
    }

    fn on_waiting(&mut self, line_number: usize) -> State {
        let current = self.scanner.current_line();
        let fields = TraceLine::parse(current);

        if let Some(kind) = fields.operation() {
            if fields.is_packet_dump() {
                return self.start_dump(PendingPacket::new(kind, line_number), line_number);
            }
            if fields.is_entry() {
                let mut pending = PendingPacket::new(kind, line_number);
                pending.socket = line::find_socket(current);
                return State::Header(pending);
            }
            return State::Waiting;
        }

        if fields.is_connection_info() {
            let owned = current.to_vec();
            self.record_client(&owned);
            return State::ConnectionInfo;
        }
        State::Waiting
    }

    fn on_header(
        &mut self,
        mut pending: PendingPacket,
        line_number: usize,
    ) -> (State, Option<Packet>) {
        let current = self.scanner.current_line();
        let fields = TraceLine::parse(current);

        if pending.socket.is_none() {
            pending.socket = line::find_socket(current);
        }

        let Some(kind) = fields.operation() else {
            return (State::Header(pending), None);
        };

        if fields.is_packet_dump() {
            let emitted = if pending.dumped {
                let done = std::mem::replace(&mut pending, PendingPacket::new(kind, line_number));
                self.finish(done)
            } else {
                pending.kind = kind;
                pending.line = line_number;
                None
            };
            return (self.start_dump(pending, line_number), emitted);
        }

        if kind == pending.kind && fields.is_exit() {
            return (State::Waiting, self.finish(pending));
        }

        if kind != pending.kind && fields.is_entry() {
            let mut next = PendingPacket::new(kind, line_number);
            next.socket = line::find_socket(current);
            return (State::Header(next), self.finish(pending));
        }

        (State::Header(pending), None)
    }

    fn start_dump(&mut self, mut pending: PendingPacket, line_number: usize) -> State {
        self.payload.clear();
        pending.line = line_number;
        pending.dumped = true;
        State::Dump(pending)
    }

    fn on_dump(&mut self, mut pending: PendingPacket) -> (State, Option<Packet>) {
        let current = self.scanner.current_line();
        let fields = TraceLine::parse(current);

        if !line::is_dump_row(current) || fields.operation() != Some(pending.kind) {
            self.scanner.push_back();
            return (State::Header(pending), None);
        }

        if pending.pid.is_none() {
            if let Some(pid) = fields.pid {
                pending.pid = Some(pid);
                if let Some(client) = self.clients.get(&pid) {
                    pending.client = client.clone();
                }
            }
        }
        if pending.timestamp.is_empty() {
            if let Some(ts) = fields.timestamp {
                pending.timestamp = String::from_utf8_lossy(ts).into_owned();
            }
        }
        fields.decode_octets(&mut self.payload);

        (State::Dump(pending), None)
    }

    fn on_connection_info(&mut self) -> State {
        let current = self.scanner.current_line().to_vec();
        let fields = TraceLine::parse(&current);

        if fields.is_connection_info() && fields.message.starts_with(trace_marker::NORMAL_EXIT) {
            return State::Waiting;
        }
        self.record_client(&current);
        State::ConnectionInfo
    }

    fn record_client(&mut self, current: &[u8]) {
        let fields = TraceLine::parse(current);
        if let (Some(pid), Some(program)) = (fields.pid, line::find_program(current)) {
            tracing::debug!(
                source = self.scanner.source_name(),
                pid = pid,
                program = program.as_str(),
                "Client program recorded"
            );
            self.clients.insert(pid, program);
        }
    }

    /// Turn a pending packet into a packet, if it saw a dump
    fn finish(&mut self, pending: PendingPacket) -> Option<Packet> {
        if !pending.dumped {
            return None;
        }

        let payload = Bytes::copy_from_slice(&self.payload);
        self.payload.clear();

        tracing::trace!(
            source = self.scanner.source_name(),
            line = pending.line,
            kind = %pending.kind,
            len = payload.len(),
            "Packet reconstructed"
        );

        Some(Packet {
            source_name: self.scanner.source_name().to_string(),
            line: pending.line,
            kind: pending.kind,
            pid: pending.pid,
            client: pending.client,
            timestamp: pending.timestamp,
            socket: pending.socket,
            payload,
        })
    }
}

impl<R: BufRead> Iterator for TraceParser<R> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

impl<R: BufRead> std::iter::FusedIterator for TraceParser<R> {}
