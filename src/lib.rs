//! Avrow is a Rust implementation of schema parsing, in-memory value
//! validation, binary encoding/decoding and schema resolution from the
//! [Apache Avro specification](https://avro.apache.org/docs/current/spec.html),
//! excluding the object container file format and RPC.
//!
//! ## Using the library
//!
//! Add avrow to your `Cargo.toml`:
//!```toml
//! [dependencies]
//! avrow = "0.2.1"
//!```
//! ## A hello world example of writing and reading a single value
//!
//!```rust
//! use avrow::{DatumReader, DatumWriter, Schema};
//! use std::str::FromStr;
//!
//! fn main() -> Result<(), avrow::AvroError> {
//!     // Parse a schema.
//!     let schema = Schema::from_str(r##""long""##)?;
//!
//!     // Validate and encode a value against it.
//!     let writer = DatumWriter::new(&schema);
//!     let bytes = writer.write(42i64)?;
//!
//!     // Decode it back.
//!     let reader = DatumReader::new(&schema);
//!     let value = reader.read(&bytes)?;
//!     assert_eq!(value, avrow::Value::Long(42));
//!
//!     Ok(())
//! }
//!```
//!
//! To decode data written under a different but compatible schema, build a
//! [`DatumReader`] with [`DatumReader::with_reader_schema`] and the crate
//! applies the Avro schema resolution rules (promotion, field projection,
//! default synthesis, enum translation) as it decodes.

#![doc(
    html_favicon_url = "https://raw.githubusercontent.com/creativcoder/avrow/main/assets/avrow_logo.png"
)]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/creativcoder/avrow/main/assets/avrow_logo.png"
)]
#![deny(missing_docs)]
#![recursion_limit = "1024"]
#![deny(unused_must_use)]
#![deny(rust_2018_idioms)]
#![deny(warnings)]

mod codec;
pub mod config;
mod cursor;
mod error;
mod reader;
mod schema;
mod serde_avro;
mod validate;
mod value;
mod writer;

pub use config::{DecodeOptions, EncodeOptions, LogicalType, LogicalTypes};
pub use cursor::{pack_long_bytes, unpack_long_bytes, Cursor};
pub use error::{AvroError, AvroResult};
pub use reader::{from_value, DatumReader};
pub use schema::Schema;
pub use serde_avro::to_value;
pub use value::{Record, Value};
pub use writer::DatumWriter;
