//! Scan and presentation options
//!
//! ```rust
//! use oracle_trc::Config;
//!
//! let config = Config::new()
//!     .timestamp_format("DD-MON-YYYY HH:MI:SS:FF3".parse().unwrap())
//!     .after_text("26-FEB-2019 11:52:00:000")
//!     .unwrap()
//!     .date_order(true);
//! assert!(config.after.is_some());
//! ```

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::packet::Packet;
use crate::timestamp::TimestampFormat;

/// Options shared by the packet and statement commands
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Mask of the timestamps written in the traces
    pub timestamp_format: TimestampFormat,
    /// Only keep records strictly after this time
    pub after: Option<NaiveDateTime>,
    /// Sort output by timestamp instead of printing as parsed
    pub date_order: bool,
    /// Pair each statement with the server packet answering it
    pub await_response: bool,
}

impl Config {
    /// Create a configuration with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trace timestamp mask
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set the lower time bound
    pub fn after(mut self, after: NaiveDateTime) -> Self {
        self.after = Some(after);
        self
    }

    /// Set the lower time bound from text written with the timestamp mask
    pub fn after_text(self, text: &str) -> Result<Self> {
        let after = self.timestamp_format.parse(text)?;
        Ok(self.after(after))
    }

    /// Enable sorting by timestamp
    pub fn date_order(mut self, enabled: bool) -> Self {
        self.date_order = enabled;
        self
    }

    /// Enable response pairing
    pub fn await_response(mut self, enabled: bool) -> Self {
        self.await_response = enabled;
        self
    }

    /// Parse a packet timestamp, `None` if it is missing or malformed
    pub fn packet_time(&self, packet: &Packet) -> Option<NaiveDateTime> {
        if packet.timestamp.is_empty() {
            return None;
        }
        packet.parsed_timestamp(&self.timestamp_format).ok()
    }

    /// Check a packet against the `after` bound
    ///
    /// The bound itself is excluded. Packets whose time can't be determined
    /// are kept.
    pub fn accepts(&self, packet: &Packet) -> bool {
        match (self.after, self.packet_time(packet)) {
            (Some(after), Some(time)) => time > after,
            _ => true,
        }
    }
}
