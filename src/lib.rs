#![warn(missing_docs)]
//! # oracle-trc
//!
//! Recover TNS packets, SQL statements and bind values from Oracle Net client
//! trace files.
//!
//! With `TRACE_LEVEL_CLIENT=16` the Oracle client writes a hex dump of every
//! packet it sends or receives, scattered between diagnostic lines. This crate
//! reassembles those dumps into packets and decodes the execute calls they
//! carry, without any Oracle client library.
//!
//! ## Features
//!
//! - **Packet reconstruction** - payload, process id, client program,
//!   timestamp and socket for every dumped packet
//! - **SQL extraction** - statement text and bind values, with NUMBER and
//!   DATE values decoded
//! - **Streaming** - synchronous iterators, or async streams built on Tokio
//!   that read the trace only as fast as results are consumed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oracle_trc::QueryParser;
//!
//! fn main() -> oracle_trc::Result<()> {
//!     for query in QueryParser::open("cli_7980.trc")? {
//!         let query = query?;
//!         println!("{}", query.text);
//!         for param in &query.parameters {
//!             println!("  {} = {}", param.data_type, param.render());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Async Streams
//!
//! ```rust,no_run
//! use oracle_trc::PacketStream;
//!
//! # async fn example() -> oracle_trc::Result<()> {
//! let mut packets = PacketStream::open("cli_7980.trc").await?;
//! while let Some(packet) = packets.next_packet().await? {
//!     println!("{}", packet);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Packets that don't decode as execute calls are skipped and logged with
//! `tracing` at `trace` or `debug` level. Only read failures on the trace are
//! returned as errors, and they end the stream.
//!
//! ## Rendered Types
//!
//! | Oracle Type | Rendering |
//! |-------------|-----------|
//! | CHAR, VARCHAR2, LONG | text |
//! | NUMBER | shortest decimal |
//! | DATE, TIMESTAMP, TIMESTAMP WITH TIME ZONE | RFC 3339 |
//! | NULL | `(null)` |
//! | other | `(TYPE_NAME)` |

pub mod buffer;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod packet;
pub mod queries;
pub mod statement;
pub mod stream;
pub mod timestamp;
pub mod trace;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use constants::{BindDirection, DataType, OperationKind, OracleType, PacketType};
pub use error::{Error, Result};
pub use packet::{DataHeader, Packet, PacketHeader};
pub use queries::QueryParser;
pub use statement::{ParameterInfo, Query};
pub use stream::{PacketStream, QueryStream};
pub use timestamp::TimestampFormat;
pub use trace::TraceParser;
