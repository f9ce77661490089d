//! Async delivery of packets and statements
//!
//! Parsing is blocking file work, so each stream runs its parser on a
//! `spawn_blocking` worker and receives results over a channel holding a
//! single item: the trace is read only as fast as results are consumed.
//!
//! Dropping a stream closes its channel, which stops the worker at its next
//! send. [`PacketStream::close`] and [`QueryStream::close`] additionally
//! raise a flag the parser checks between lines.
//!
//! ```rust,no_run
//! use oracle_trc::QueryStream;
//!
//! # async fn example() -> oracle_trc::Result<()> {
//! let mut queries = QueryStream::open("cli_3224.trc", false).await?;
//! while let Some(query) = queries.next().await? {
//!     println!("{}", query);
//! }
//! # Ok(())
//! # }
//! ```

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::packet::Packet;
use crate::queries::QueryParser;
use crate::statement::Query;
use crate::trace::TraceParser;

/// Receiving end of a background parser
struct Producer<T> {
    rx: mpsc::Receiver<Result<T>>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl<T: Send + 'static> Producer<T> {
    /// Run `items` on a blocking worker
    ///
    /// The worker stops after the first error, when the iterator ends, or when
    /// the receiver is gone.
    fn spawn<I>(items: I, cancel: Arc<AtomicBool>) -> Self
    where
        I: Iterator<Item = Result<T>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let worker = tokio::task::spawn_blocking(move || {
            for item in items {
                let failed = item.is_err();
                if tx.blocking_send(item).is_err() {
                    tracing::trace!("Receiver closed, stopping parser");
                    break;
                }
                if failed {
                    break;
                }
            }
        });

        Self {
            rx,
            cancel,
            worker: Some(worker),
            finished: false,
        }
    }

    async fn next(&mut self) -> Result<Option<T>> {
        if self.finished {
            return Ok(None);
        }

        match self.rx.recv().await {
            Some(Ok(item)) => Ok(Some(item)),
            Some(Err(e)) => {
                self.finished = true;
                Err(e)
            }
            None => {
                self.finished = true;
                if let Some(worker) = self.worker.take() {
                    worker
                        .await
                        .map_err(|e| Error::Internal(format!("parser worker failed: {}", e)))?;
                }
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.rx.close();
        self.finished = true;
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Open a trace file without blocking the runtime
async fn open_trace(path: &Path) -> Result<BufReader<std::fs::File>> {
    let file = tokio::fs::File::open(path).await?;
    Ok(BufReader::new(file.into_std().await))
}

/// Packets of one trace, delivered asynchronously
pub struct PacketStream {
    inner: Producer<Packet>,
}

impl PacketStream {
    /// Open a trace file and start parsing it
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_trace(path).await?;
        Ok(Self::new(TraceParser::new(reader, &path.to_string_lossy())))
    }

    /// Start a packet parser in the background
    pub fn new<R>(parser: TraceParser<R>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let parser = parser.with_cancel_flag(cancel.clone());
        Self {
            inner: Producer::spawn(parser, cancel),
        }
    }

    /// Wait for the next packet
    ///
    /// `Ok(None)` marks the end of the trace; the stream stays at end
    /// afterwards. A read failure is returned once and also ends the stream.
    pub async fn next_packet(&mut self) -> Result<Option<Packet>> {
        self.inner.next().await
    }

    /// Stop parsing; later calls return `Ok(None)`
    pub fn close(&mut self) {
        self.inner.close();
    }
}

/// Statements of one trace, delivered asynchronously
pub struct QueryStream {
    inner: Producer<Query>,
}

impl QueryStream {
    /// Open a trace file and start extracting statements
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(path: impl AsRef<Path>, await_response: bool) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_trace(path).await?;
        let parser =
            QueryParser::new(reader, &path.to_string_lossy()).await_response(await_response);
        Ok(Self::new(parser))
    }

    /// Start a statement parser in the background
    pub fn new<R>(parser: QueryParser<R>) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let parser = parser.with_cancel_flag(cancel.clone());
        Self {
            inner: Producer::spawn(parser, cancel),
        }
    }

    /// Wait for the next statement
    ///
    /// `Ok(None)` marks the end of the trace; the stream stays at end
    /// afterwards.
    pub async fn next(&mut self) -> Result<Option<Query>> {
        self.inner.next().await
    }

    /// Stop parsing; later calls return `Ok(None)`
    pub fn close(&mut self) {
        self.inner.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TRACE: &str = "\
(9) [12-FEB-2019 17:25:10:804] nsprecv: packet dump
(9) [12-FEB-2019 17:25:10:804] nsprecv: 00 08 00 00 0B 00 00 00  |........|
(9) [12-FEB-2019 17:25:10:804] nsprecv: normal exit
(9) [12-FEB-2019 17:25:10:900] nspsend: packet dump
(9) [12-FEB-2019 17:25:10:900] nspsend: 00 08 00 00 0B 00 00 01  |........|
(9) [12-FEB-2019 17:25:10:900] nspsend: normal exit
";

    fn stream() -> PacketStream {
        PacketStream::new(TraceParser::new(Cursor::new(TRACE.as_bytes().to_vec()), "t"))
    }

    #[tokio::test]
    async fn test_packets_in_order_then_end() {
        let mut packets = stream();
        let first = packets.next_packet().await.unwrap().unwrap();
        assert_eq!(first.line, 1);
        let second = packets.next_packet().await.unwrap().unwrap();
        assert_eq!(second.line, 4);
        assert!(packets.next_packet().await.unwrap().is_none());
        assert!(packets.next_packet().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_ends_stream() {
        let mut packets = stream();
        assert!(packets.next_packet().await.unwrap().is_some());
        packets.close();
        assert!(packets.next_packet().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_drop_without_draining() {
        let packets = stream();
        drop(packets);
    }
}
