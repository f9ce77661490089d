//! Buffer abstractions for TNS payload decoding
//!
//! This module provides the read cursor used to walk binary TTC data
//! reconstructed from trace hex dumps.

mod read;

pub use read::ReadBuffer;
