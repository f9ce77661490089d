//! Oracle data type decoding
//!
//! This module provides functions for decoding Oracle's wire format for the
//! bind value types that can be rendered as text.

mod date;
mod number;

pub use date::{decode_date, format_date};
pub use number::{decode_packed_decimal, format_number};
