//! SQL statement extraction
//!
//! [`QueryParser`] sits on top of a [`TraceParser`] and keeps only the
//! client packets that decode as execute calls. Packets that don't decode are
//! skipped: traces hold many other TTC calls and truncated captures, so a
//! decoding failure only costs that packet.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::constants::OperationKind;
use crate::error::{Error, Result};
use crate::packet::Packet;
use crate::statement::Query;
use crate::trace::TraceParser;

/// Extracts SQL statements from an Oracle Net trace
///
/// Iterates over `Result<Query>`. Only read failures on the trace are
/// reported as errors.
pub struct QueryParser<R> {
    packets: TraceParser<R>,
    await_response: bool,
    /// Client packet met while waiting for a response
    held: Option<Packet>,
    /// Read failure met while waiting for a response, reported on the next call
    deferred: Option<Error>,
}

impl QueryParser<BufReader<File>> {
    /// Open a trace file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_packets(TraceParser::open(path)?))
    }
}

impl<R: BufRead> QueryParser<R> {
    /// Create a parser over a reader
    pub fn new(reader: R, source_name: &str) -> Self {
        Self::from_packets(TraceParser::new(reader, source_name))
    }

    /// Extract statements from an existing packet parser
    pub fn from_packets(packets: TraceParser<R>) -> Self {
        Self {
            packets,
            await_response: false,
            held: None,
            deferred: None,
        }
    }

    /// Attach the next server packet to each statement
    pub fn await_response(mut self, enabled: bool) -> Self {
        self.await_response = enabled;
        self
    }

    /// Stop producing statements once `flag` is raised
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.packets = self.packets.with_cancel_flag(flag);
        self
    }

    /// Name of the trace being parsed
    pub fn source_name(&self) -> &str {
        self.packets.source_name()
    }

    /// Read up to the next statement
    pub fn next_query(&mut self) -> Result<Option<Query>> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }

        loop {
            let packet = match self.held.take() {
                Some(packet) => packet,
                None => match self.packets.next_packet()? {
                    Some(packet) => packet,
                    None => return Ok(None),
                },
            };

            if packet.kind != OperationKind::BasicSend {
                continue;
            }

            let line = packet.line;
            match Query::from_packet(packet) {
                Ok(mut query) => {
                    if self.await_response {
                        query.response = self.wait_response();
                    }
                    return Ok(Some(query));
                }
                Err(e @ (Error::PacketTooShort { .. } | Error::UnexpectedMarker { .. })) => {
                    tracing::trace!(
                        source = self.packets.source_name(),
                        line = line,
                        reason = %e,
                        "Packet is not an execute call"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        source = self.packets.source_name(),
                        line = line,
                        reason = %e,
                        "Execute call skipped"
                    );
                }
            }
        }
    }

    /// Find the server packet answering the statement just parsed
    ///
    /// A client send met first means no response was traced; it is held for
    /// the next call.
    fn wait_response(&mut self) -> Option<Packet> {
        loop {
            match self.packets.next_packet() {
                Ok(Some(packet)) => match packet.kind {
                    OperationKind::BasicReceive => return Some(packet),
                    OperationKind::BasicSend => {
                        self.held = Some(packet);
                        return None;
                    }
                    _ => {}
                },
                Ok(None) => return None,
                Err(e) => {
                    self.deferred = Some(e);
                    return None;
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for QueryParser<R> {
    type Item = Result<Query>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_query().transpose()
    }
}

impl<R: BufRead> std::iter::FusedIterator for QueryParser<R> {}
