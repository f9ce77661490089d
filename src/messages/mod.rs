//! TTC messages carried in client packets
//!
//! Only the client execute call is decoded: its header, SQL text, bind
//! descriptors and bind values.

mod bind;
mod execute;
mod field;

pub use bind::{parse_bind_descriptor, parse_bind_values, BindField, BIND_DESCRIPTOR_LAYOUT};
pub use execute::{ExecuteField, ExecuteRequest, EXECUTE_HEADER_LAYOUT};
pub use field::{read_field, FieldEncoding, FieldValue};
