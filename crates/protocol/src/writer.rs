//! Node writer
//!
//! [`ValueWriter`] writes an ordered, nested sequence of named primitive values
//! into a [`BitStream`]. Names are accepted by every call but are not encoded;
//! the binary form relies on the reader making the same calls in the same order.
//!
//! # Node format
//! ```text
//! [u32 body length in bits][body]
//! ```
//! The length prefix is written as zero when the node opens and backpatched when
//! the node closes, so the writer needs to seek back into what it already wrote.

use crate::bit_stream::{check_bit_count, BitStream};
use crate::enum_value::EnumValue;
use crate::error::{ProtocolError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use netgore_core::EnumIoMode;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace, warn};

/// Width of a node length prefix
pub const NODE_LENGTH_BITS: u32 = 32;

/// Longest string (in UTF-8 bytes) the 16-bit length prefix can describe
pub const MAX_STRING_LENGTH: usize = u16::MAX as usize;

/// Name of the count value at the start of a collection node
pub(crate) const COUNT_NAME: &str = "Count";

/// Name of the `index`th item of a collection node
pub(crate) fn item_name(index: usize) -> String {
    format!("Item{}", index)
}

#[derive(Debug)]
struct OpenNode {
    name: String,
    /// Bit offset of the reserved length prefix
    offset: usize,
}

#[derive(Debug)]
enum Destination {
    Memory,
    File {
        path: PathBuf,
        temp_dir: Option<PathBuf>,
    },
}

/// Writes values and nodes into a bit stream
#[derive(Debug)]
pub struct ValueWriter {
    stream: BitStream,
    nodes: Vec<OpenNode>,
    enum_mode: EnumIoMode,
    destination: Destination,
    finished: bool,
}

impl ValueWriter {
    /// Create a writer over a fresh in-memory stream
    pub fn new(enum_mode: EnumIoMode) -> Self {
        Self::from_stream(BitStream::new(), enum_mode)
    }

    /// Create a writer that continues at the current position of `stream`
    pub fn from_stream(stream: BitStream, enum_mode: EnumIoMode) -> Self {
        Self {
            stream,
            nodes: Vec::new(),
            enum_mode,
            destination: Destination::Memory,
            finished: false,
        }
    }

    /// Create a writer whose output is published to `path`
    ///
    /// Everything is buffered in memory. [`finish`](Self::finish) writes the
    /// buffer to a temporary file next to `path` and then renames it over
    /// `path`, so nobody ever observes a partially written destination.
    pub fn create_file<P: AsRef<Path>>(path: P, enum_mode: EnumIoMode) -> Self {
        let mut writer = Self::new(enum_mode);
        writer.destination = Destination::File {
            path: path.as_ref().to_path_buf(),
            temp_dir: None,
        };
        writer
    }

    /// Stage the temporary file in `dir` instead of next to the destination
    ///
    /// `dir` must be on the same filesystem as the destination for the final
    /// rename to succeed. Has no effect on in-memory writers.
    pub fn with_temp_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        if let Destination::File { temp_dir, .. } = &mut self.destination {
            *temp_dir = Some(dir.as_ref().to_path_buf());
        }
        self
    }

    /// Run `write` against a fresh writer and return the finished bytes
    pub fn build<F>(enum_mode: EnumIoMode, write: F) -> Result<Bytes>
    where
        F: FnOnce(&mut ValueWriter) -> Result<()>,
    {
        let mut writer = Self::new(enum_mode);
        write(&mut writer)?;
        writer.finish()
    }

    pub fn enum_mode(&self) -> EnumIoMode {
        self.enum_mode
    }

    /// Current write position in bits
    pub fn position(&self) -> usize {
        self.stream.position()
    }

    /// Number of nodes opened and not yet closed
    pub fn open_node_count(&self) -> usize {
        self.nodes.len()
    }

    // ===== Primitives =====

    pub fn write_bool(&mut self, _name: &str, value: bool) -> Result<()> {
        self.stream.write_bit(value);
        Ok(())
    }

    pub fn write_u8(&mut self, _name: &str, value: u8) -> Result<()> {
        self.stream.write_bits(value as u64, 8)
    }

    pub fn write_i8(&mut self, _name: &str, value: i8) -> Result<()> {
        self.stream.write_signed_bits(value as i64, 8)
    }

    pub fn write_u16(&mut self, _name: &str, value: u16) -> Result<()> {
        self.stream.write_bits(value as u64, 16)
    }

    pub fn write_i16(&mut self, _name: &str, value: i16) -> Result<()> {
        self.stream.write_signed_bits(value as i64, 16)
    }

    pub fn write_u32(&mut self, _name: &str, value: u32) -> Result<()> {
        self.stream.write_bits(value as u64, 32)
    }

    pub fn write_i32(&mut self, _name: &str, value: i32) -> Result<()> {
        self.stream.write_signed_bits(value as i64, 32)
    }

    pub fn write_u64(&mut self, _name: &str, value: u64) -> Result<()> {
        self.stream.write_bits(value, 64)
    }

    pub fn write_i64(&mut self, _name: &str, value: i64) -> Result<()> {
        self.stream.write_signed_bits(value, 64)
    }

    /// Floats are written as their raw IEEE 754 bits, NaN payloads included
    pub fn write_f32(&mut self, _name: &str, value: f32) -> Result<()> {
        self.stream.write_bits(value.to_bits() as u64, 32)
    }

    pub fn write_f64(&mut self, _name: &str, value: f64) -> Result<()> {
        self.stream.write_bits(value.to_bits(), 64)
    }

    /// Write a string as a u16 byte length followed by its UTF-8 bytes
    pub fn write_string(&mut self, _name: &str, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > MAX_STRING_LENGTH {
            return Err(ProtocolError::StringTooLong {
                len: bytes.len(),
                max: MAX_STRING_LENGTH,
            });
        }
        self.stream.write_bits(bytes.len() as u64, 16)?;
        self.stream.write_bytes(bytes);
        Ok(())
    }

    /// Write an unsigned value using only `bits` bits (1-32)
    pub fn write_uint_bits(&mut self, _name: &str, value: u32, bits: u32) -> Result<()> {
        check_bit_count(bits, 32)?;
        if bits < 32 && value >> bits != 0 {
            return Err(ProtocolError::ValueOutOfRange {
                value: value as i128,
                bits,
            });
        }
        self.stream.write_bits(value as u64, bits)
    }

    /// Write a signed value using only `bits` bits (1-32), two's complement
    pub fn write_int_bits(&mut self, _name: &str, value: i32, bits: u32) -> Result<()> {
        check_bit_count(bits, 32)?;
        let min = -(1i64 << (bits - 1));
        let max = (1i64 << (bits - 1)) - 1;
        if (value as i64) < min || (value as i64) > max {
            return Err(ProtocolError::ValueOutOfRange {
                value: value as i128,
                bits,
            });
        }
        self.stream.write_signed_bits(value as i64, bits)
    }

    // ===== Enums =====

    /// Write an enum the way this writer's [`EnumIoMode`] says
    pub fn write_enum<E: EnumValue>(&mut self, name: &str, value: E) -> Result<()> {
        match self.enum_mode {
            EnumIoMode::Value => self.write_enum_value(name, value),
            EnumIoMode::Name => self.write_enum_name(name, value),
        }
    }

    /// Write an enum as its underlying value regardless of mode
    pub fn write_enum_value<E: EnumValue>(&mut self, name: &str, value: E) -> Result<()> {
        self.write_i32(name, value.to_value())
    }

    /// Write an enum as its name regardless of mode
    pub fn write_enum_name<E: EnumValue>(&mut self, name: &str, value: E) -> Result<()> {
        self.write_string(name, value.name())
    }

    // ===== Nodes =====

    /// Open a node, reserving its length prefix
    pub fn write_start_node(&mut self, name: &str) -> Result<()> {
        let offset = self.stream.position();
        self.stream.write_bits(0, NODE_LENGTH_BITS)?;
        trace!(node = name, offset, "Opened node");
        self.nodes.push(OpenNode {
            name: name.to_string(),
            offset,
        });
        Ok(())
    }

    /// Close the most recently opened node and backpatch its length
    pub fn write_end_node(&mut self, name: &str) -> Result<()> {
        let node = self.nodes.pop().ok_or_else(|| ProtocolError::NoOpenNode {
            name: name.to_string(),
        })?;

        let end = self.stream.position();
        let body_bits = end - node.offset - NODE_LENGTH_BITS as usize;
        let prefix = u32::try_from(body_bits).map_err(|_| ProtocolError::NodeTooLarge {
            name: node.name.clone(),
            bits: body_bits,
        })?;

        self.stream.seek(node.offset)?;
        self.stream.write_bits(prefix as u64, NODE_LENGTH_BITS)?;
        self.stream.seek(end)?;

        trace!(node = %node.name, body_bits, "Closed node");
        Ok(())
    }

    /// Write a node holding a count followed by one unnamed value per item
    pub fn write_many<T, F>(&mut self, name: &str, items: &[T], mut write_item: F) -> Result<()>
    where
        F: FnMut(&mut ValueWriter, &str, &T) -> Result<()>,
    {
        self.write_start_node(name)?;
        self.write_count(items.len())?;
        for (index, item) in items.iter().enumerate() {
            write_item(self, &item_name(index), item)?;
        }
        self.write_end_node(name)
    }

    /// Write a node holding a count followed by one child node per item
    pub fn write_many_nodes<T, F>(
        &mut self,
        name: &str,
        items: &[T],
        mut write_item: F,
    ) -> Result<()>
    where
        F: FnMut(&mut ValueWriter, &T) -> Result<()>,
    {
        self.write_start_node(name)?;
        self.write_count(items.len())?;
        for (index, item) in items.iter().enumerate() {
            let item_name = item_name(index);
            self.write_start_node(&item_name)?;
            write_item(self, item)?;
            self.write_end_node(&item_name)?;
        }
        self.write_end_node(name)
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u32::try_from(count).map_err(|_| ProtocolError::ValueOutOfRange {
            value: count as i128,
            bits: 32,
        })?;
        self.write_u32(COUNT_NAME, count)
    }

    // ===== Finishing =====

    /// Finish the document and return its bytes
    ///
    /// File writers publish to their destination here. Fails if any node is
    /// still open, in which case nothing is published.
    pub fn finish(mut self) -> Result<Bytes> {
        Ok(self.complete()?.into_bytes())
    }

    /// Finish the document and return it as standard base64 text
    pub fn finish_base64(self) -> Result<String> {
        let bytes = self.finish()?;
        Ok(STANDARD.encode(&bytes))
    }

    /// Finish the document and return the underlying stream with its exact bit length
    ///
    /// The stream is rewound to the start, ready for [`ValueReader::new`].
    ///
    /// [`ValueReader::new`]: crate::ValueReader::new
    pub fn into_stream(mut self) -> Result<BitStream> {
        let mut stream = self.complete()?;
        stream.seek(0)?;
        Ok(stream)
    }

    fn complete(&mut self) -> Result<BitStream> {
        self.finished = true;

        if let Some(innermost) = self.nodes.last() {
            return Err(ProtocolError::UnclosedNodes {
                count: self.nodes.len(),
                innermost: innermost.name.clone(),
            });
        }

        let stream = std::mem::take(&mut self.stream);
        if let Destination::File { path, temp_dir } = &self.destination {
            publish_file(path, temp_dir.as_deref(), &stream.to_bytes())?;
        }
        Ok(stream)
    }
}

impl Drop for ValueWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        if let Destination::File { path, temp_dir } = &self.destination {
            if !self.nodes.is_empty() {
                error!(
                    path = %path.display(),
                    open_nodes = self.nodes.len(),
                    "Value writer dropped with open nodes, file not written"
                );
                return;
            }

            warn!(path = %path.display(), "Value writer dropped without finish(), publishing");
            if let Err(e) = publish_file(path, temp_dir.as_deref(), &self.stream.to_bytes()) {
                error!(path = %path.display(), "Failed to publish value file: {}", e);
            }
        }
    }
}

/// Write `bytes` to a temporary file, then rename it over `path`
fn publish_file(path: &Path, temp_dir: Option<&Path>, bytes: &[u8]) -> Result<()> {
    let dir = match temp_dir {
        Some(dir) => dir.to_path_buf(),
        None => path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| ProtocolError::Io(e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "Published value file");
    Ok(())
}
