//! # NetGore Value Protocol
//!
//! Bit-packed, nested value documents used for both file persistence and entity
//! property replication.
//!
//! ## Layers
//!
//! ### 1. Bit stream ([`bit_stream`])
//! A growable, seekable buffer addressed in bits.
//!
//! ### 2. Node writer ([`writer`])
//! Writes named primitive values and length-prefixed nodes. Node lengths are
//! backpatched when the node closes, so any node can later be skipped without
//! parsing its body.
//!
//! ### 3. Node reader ([`reader`])
//! Reads values back in the order they were written. Each node can be opened as
//! a sub-reader that owns exactly the node's bits.
//!
//! ## Usage Example
//!
//! ```rust
//! use netgore_core::EnumIoMode;
//! use netgore_protocol::{ValueReader, ValueWriter};
//!
//! let bytes = ValueWriter::build(EnumIoMode::Value, |w| {
//!     w.write_start_node("Character")?;
//!     w.write_string("Name", "Hero")?;
//!     w.write_i32("Score", 42)?;
//!     w.write_end_node("Character")
//! })
//! .unwrap();
//!
//! let mut reader = ValueReader::from_bytes(&bytes, EnumIoMode::Value);
//! let mut character = reader.read_node("Character").unwrap();
//! assert_eq!(character.read_string("Name").unwrap(), "Hero");
//! assert_eq!(character.read_i32("Score").unwrap(), 42);
//! ```
//!
//! Names passed to reads and writes are not encoded. Documents carry no type
//! information, so versioning belongs to the application (e.g. a leading
//! version number).

pub mod bit_stream;
pub mod enum_value;
pub mod error;
pub mod reader;
pub mod values;
pub mod writer;

pub use bit_stream::BitStream;
pub use enum_value::EnumValue;
pub use error::{ErrorKind, ProtocolError, Result};
pub use reader::ValueReader;
pub use writer::{ValueWriter, MAX_STRING_LENGTH, NODE_LENGTH_BITS};
