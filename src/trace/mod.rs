//! Oracle Net trace file reading
//!
//! Client traces (`TRACE_LEVEL_CLIENT=16`) interleave diagnostic text with hex
//! dumps of every packet sent or received:
//!
//! ```text
//! (3224) [01-MAR-2019 17:27:32:320] nsbasic_bsd: packet dump
//! (3224) [01-MAR-2019 17:27:32:320] nsbasic_bsd: 00 5D 00 00 06 00 00 00  |.]......|
//! (3224) [01-MAR-2019 17:27:32:320] nsbasic_bsd: 00 00 11 69 4A 01 01 01  |...iJ...|
//! (3224) [01-MAR-2019 17:27:32:321] nsbasic_bsd: exit (0)
//! ```
//!
//! [`TraceParser`] turns such a file into a sequence of [`Packet`](crate::Packet)s.

mod line;
mod parser;
mod scanner;

pub use line::{base_name, TraceLine};
pub use parser::TraceParser;
pub use scanner::LineScanner;
