//! Node reader
//!
//! [`ValueReader`] mirrors [`ValueWriter`](crate::ValueWriter). Values carry no
//! type tags, so a document can only be read back with the same sequence of
//! calls that wrote it. Nodes give the format its structure: every node can be
//! skipped in one step or opened as a bounded sub-reader that owns exactly the
//! node's bits.

use crate::bit_stream::{check_bit_count, BitStream};
use crate::enum_value::EnumValue;
use crate::error::{ProtocolError, Result};
use crate::writer::{item_name, COUNT_NAME, NODE_LENGTH_BITS};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use netgore_core::EnumIoMode;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads values and nodes from a bit stream
#[derive(Debug, Clone)]
pub struct ValueReader {
    stream: BitStream,
    enum_mode: EnumIoMode,

    /// Set when this reader was carved out of a node
    node_name: Option<String>,
}

impl ValueReader {
    /// Create a reader over a stream, starting at its current position
    pub fn new(stream: BitStream, enum_mode: EnumIoMode) -> Self {
        Self {
            stream,
            enum_mode,
            node_name: None,
        }
    }

    /// Create a reader over raw bytes
    pub fn from_bytes(bytes: &[u8], enum_mode: EnumIoMode) -> Self {
        Self::new(BitStream::from_bytes(bytes), enum_mode)
    }

    /// Read the whole file into memory and create a reader over it
    pub fn open_file<P: AsRef<Path>>(path: P, enum_mode: EnumIoMode) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Loaded value file");
        Ok(Self::from_bytes(&bytes, enum_mode))
    }

    /// Create a reader over base64 text produced by `ValueWriter::finish_base64`
    pub fn from_base64(text: &str, enum_mode: EnumIoMode) -> Result<Self> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|e| ProtocolError::InvalidData(format!("Invalid base64: {}", e)))?;
        Ok(Self::from_bytes(&bytes, enum_mode))
    }

    pub fn enum_mode(&self) -> EnumIoMode {
        self.enum_mode
    }

    /// Current read position in bits
    pub fn position(&self) -> usize {
        self.stream.position()
    }

    /// Total bits this reader can see
    pub fn bit_len(&self) -> usize {
        self.stream.bit_len()
    }

    pub fn remaining_bits(&self) -> usize {
        self.stream.remaining_bits()
    }

    /// Whether this reader is bounded to a single node
    pub fn is_node(&self) -> bool {
        self.node_name.is_some()
    }

    /// Name of the node this reader was created for, if any
    pub fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref()
    }

    /// Give back the underlying stream
    pub fn into_stream(self) -> BitStream {
        self.stream
    }

    // ===== Primitives =====

    pub fn read_bool(&mut self, _name: &str) -> Result<bool> {
        let result = self.stream.read_bit();
        self.bounded(result)
    }

    pub fn read_u8(&mut self, _name: &str) -> Result<u8> {
        Ok(self.read_unsigned(8)? as u8)
    }

    pub fn read_i8(&mut self, _name: &str) -> Result<i8> {
        Ok(self.read_signed(8)? as i8)
    }

    pub fn read_u16(&mut self, _name: &str) -> Result<u16> {
        Ok(self.read_unsigned(16)? as u16)
    }

    pub fn read_i16(&mut self, _name: &str) -> Result<i16> {
        Ok(self.read_signed(16)? as i16)
    }

    pub fn read_u32(&mut self, _name: &str) -> Result<u32> {
        Ok(self.read_unsigned(32)? as u32)
    }

    pub fn read_i32(&mut self, _name: &str) -> Result<i32> {
        Ok(self.read_signed(32)? as i32)
    }

    pub fn read_u64(&mut self, _name: &str) -> Result<u64> {
        self.read_unsigned(64)
    }

    pub fn read_i64(&mut self, _name: &str) -> Result<i64> {
        self.read_signed(64)
    }

    pub fn read_f32(&mut self, _name: &str) -> Result<f32> {
        Ok(f32::from_bits(self.read_unsigned(32)? as u32))
    }

    pub fn read_f64(&mut self, _name: &str) -> Result<f64> {
        Ok(f64::from_bits(self.read_unsigned(64)?))
    }

    pub fn read_string(&mut self, _name: &str) -> Result<String> {
        let len = self.read_unsigned(16)? as usize;
        let result = self.stream.read_bytes(len);
        let bytes = self.bounded(result)?;
        String::from_utf8(bytes)
            .map_err(|e| ProtocolError::InvalidData(format!("Invalid UTF-8: {}", e)))
    }

    /// Read an unsigned value written with `bits` bits (1-32)
    pub fn read_uint_bits(&mut self, _name: &str, bits: u32) -> Result<u32> {
        check_bit_count(bits, 32)?;
        Ok(self.read_unsigned(bits)? as u32)
    }

    /// Read a signed value written with `bits` bits (1-32)
    pub fn read_int_bits(&mut self, _name: &str, bits: u32) -> Result<i32> {
        check_bit_count(bits, 32)?;
        Ok(self.read_signed(bits)? as i32)
    }

    // ===== Enums =====

    /// Read an enum the way this reader's [`EnumIoMode`] says
    pub fn read_enum<E: EnumValue>(&mut self, name: &str) -> Result<E> {
        match self.enum_mode {
            EnumIoMode::Value => self.read_enum_value(name),
            EnumIoMode::Name => self.read_enum_name(name),
        }
    }

    /// Read an enum written as its underlying value
    pub fn read_enum_value<E: EnumValue>(&mut self, name: &str) -> Result<E> {
        let value = self.read_i32(name)?;
        E::from_value(value).ok_or_else(|| {
            ProtocolError::InvalidData(format!(
                "Unknown value {} for enum {}",
                value,
                std::any::type_name::<E>()
            ))
        })
    }

    /// Read an enum written as its name
    pub fn read_enum_name<E: EnumValue>(&mut self, name: &str) -> Result<E> {
        let symbol = self.read_string(name)?;
        E::from_name(&symbol).ok_or_else(|| {
            ProtocolError::InvalidData(format!(
                "Unknown name '{}' for enum {}",
                symbol,
                std::any::type_name::<E>()
            ))
        })
    }

    // ===== Nodes =====

    /// Open the next node as a sub-reader bounded to its declared length
    ///
    /// The sub-reader inherits this reader's enum mode. This reader moves past
    /// the whole node whether or not the sub-reader is consumed.
    pub fn read_node(&mut self, name: &str) -> Result<ValueReader> {
        let len = self.read_node_length()?;
        let start = self.stream.position();
        let body = self.stream.slice(start, len)?;
        self.stream.seek(start + len)?;

        Ok(ValueReader {
            stream: body,
            enum_mode: self.enum_mode,
            node_name: Some(name.to_string()),
        })
    }

    /// Open `count` consecutive nodes
    pub fn read_nodes(&mut self, name: &str, count: usize) -> Result<Vec<ValueReader>> {
        let mut nodes = Vec::with_capacity(count.min(self.remaining_bits() / 32));
        for _ in 0..count {
            nodes.push(self.read_node(name)?);
        }
        Ok(nodes)
    }

    /// Jump past the next node without looking at its body
    ///
    /// Returns the body length in bits.
    pub fn skip_node(&mut self, _name: &str) -> Result<usize> {
        let len = self.read_node_length()?;
        let remaining = self.stream.remaining_bits();
        if len > remaining {
            return Err(ProtocolError::NotEnoughBits {
                requested: len,
                remaining,
            });
        }
        self.stream.seek(self.stream.position() + len)?;
        Ok(len)
    }

    /// Read a collection node written by `ValueWriter::write_many`
    pub fn read_many<T, F>(&mut self, name: &str, mut read_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut ValueReader, &str) -> Result<T>,
    {
        let mut node = self.read_node(name)?;
        let count = node.read_u32(COUNT_NAME)? as usize;

        // Every item takes at least one bit, so a corrupt count can't force a huge allocation
        let mut items = Vec::with_capacity(count.min(node.remaining_bits()));
        for index in 0..count {
            items.push(read_item(&mut node, &item_name(index))?);
        }
        Ok(items)
    }

    /// Read a collection node written by `ValueWriter::write_many_nodes`
    pub fn read_many_nodes<T, F>(&mut self, name: &str, mut read_item: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut ValueReader) -> Result<T>,
    {
        let mut node = self.read_node(name)?;
        let count = node.read_u32(COUNT_NAME)? as usize;

        let mut items = Vec::with_capacity(count.min(node.remaining_bits() / 32));
        for index in 0..count {
            let mut item = node.read_node(&item_name(index))?;
            items.push(read_item(&mut item)?);
        }
        Ok(items)
    }

    fn read_node_length(&mut self) -> Result<usize> {
        Ok(self.read_unsigned(NODE_LENGTH_BITS)? as usize)
    }

    fn read_unsigned(&mut self, bits: u32) -> Result<u64> {
        let result = self.stream.read_bits(bits);
        self.bounded(result)
    }

    fn read_signed(&mut self, bits: u32) -> Result<i64> {
        let result = self.stream.read_signed_bits(bits);
        self.bounded(result)
    }

    /// Inside a node, running out of bits means reading past the node's end
    fn bounded<T>(&self, result: Result<T>) -> Result<T> {
        match result {
            Err(ProtocolError::NotEnoughBits {
                requested,
                remaining,
            }) if self.is_node() => Err(ProtocolError::NodeOverrun {
                requested,
                remaining,
            }),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enum_value::tests::Facing;
    use crate::{ErrorKind, ValueWriter, MAX_STRING_LENGTH};
    use tempfile::TempDir;

    fn reader_for(writer: ValueWriter) -> ValueReader {
        let mode = writer.enum_mode();
        ValueReader::new(writer.into_stream().unwrap(), mode)
    }

    #[test]
    fn test_integer_boundaries_roundtrip() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        for v in [0u8, 1, u8::MAX] {
            writer.write_u8("u8", v).unwrap();
        }
        for v in [0i8, -1, i8::MIN, i8::MAX] {
            writer.write_i8("i8", v).unwrap();
        }
        for v in [0u16, u16::MAX] {
            writer.write_u16("u16", v).unwrap();
        }
        for v in [0i16, -1, i16::MIN, i16::MAX] {
            writer.write_i16("i16", v).unwrap();
        }
        for v in [0u32, u32::MAX] {
            writer.write_u32("u32", v).unwrap();
        }
        for v in [0i32, -1, i32::MIN, i32::MAX] {
            writer.write_i32("i32", v).unwrap();
        }
        for v in [0u64, u64::MAX] {
            writer.write_u64("u64", v).unwrap();
        }
        for v in [0i64, -1, i64::MIN, i64::MAX] {
            writer.write_i64("i64", v).unwrap();
        }
        writer.write_bool("t", true).unwrap();
        writer.write_bool("f", false).unwrap();

        let mut reader = reader_for(writer);
        for v in [0u8, 1, u8::MAX] {
            assert_eq!(reader.read_u8("u8").unwrap(), v);
        }
        for v in [0i8, -1, i8::MIN, i8::MAX] {
            assert_eq!(reader.read_i8("i8").unwrap(), v);
        }
        for v in [0u16, u16::MAX] {
            assert_eq!(reader.read_u16("u16").unwrap(), v);
        }
        for v in [0i16, -1, i16::MIN, i16::MAX] {
            assert_eq!(reader.read_i16("i16").unwrap(), v);
        }
        for v in [0u32, u32::MAX] {
            assert_eq!(reader.read_u32("u32").unwrap(), v);
        }
        for v in [0i32, -1, i32::MIN, i32::MAX] {
            assert_eq!(reader.read_i32("i32").unwrap(), v);
        }
        for v in [0u64, u64::MAX] {
            assert_eq!(reader.read_u64("u64").unwrap(), v);
        }
        for v in [0i64, -1, i64::MIN, i64::MAX] {
            assert_eq!(reader.read_i64("i64").unwrap(), v);
        }
        assert!(reader.read_bool("t").unwrap());
        assert!(!reader.read_bool("f").unwrap());
        assert_eq!(reader.remaining_bits(), 0);
    }

    #[test]
    fn test_floats_bitwise_roundtrip() {
        let f32s = [0.0f32, -0.0, 1.5, f32::MIN, f32::MAX, f32::NAN, f32::INFINITY, f32::NEG_INFINITY];
        let f64s = [0.0f64, -0.0, f64::MIN_POSITIVE, f64::NAN, f64::INFINITY, f64::NEG_INFINITY];
        let odd_nan = f32::from_bits(0x7FC0_1234);

        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_bool("misalign", true).unwrap();
        for v in f32s {
            writer.write_f32("f32", v).unwrap();
        }
        writer.write_f32("nan", odd_nan).unwrap();
        for v in f64s {
            writer.write_f64("f64", v).unwrap();
        }

        let mut reader = reader_for(writer);
        reader.read_bool("misalign").unwrap();
        for v in f32s {
            assert_eq!(reader.read_f32("f32").unwrap().to_bits(), v.to_bits());
        }
        assert_eq!(reader.read_f32("nan").unwrap().to_bits(), 0x7FC0_1234);
        for v in f64s {
            assert_eq!(reader.read_f64("f64").unwrap().to_bits(), v.to_bits());
        }
    }

    #[test]
    fn test_strings_roundtrip() {
        let longest = "z".repeat(MAX_STRING_LENGTH);
        let values = ["", "Hero", "héros ✓", longest.as_str()];

        let mut writer = ValueWriter::new(EnumIoMode::Value);
        for v in values {
            writer.write_bool("pad", false).unwrap();
            writer.write_string("s", v).unwrap();
        }

        let mut reader = reader_for(writer);
        for v in values {
            reader.read_bool("pad").unwrap();
            assert_eq!(reader.read_string("s").unwrap(), v);
        }
    }

    #[test]
    fn test_limited_bits_roundtrip() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_uint_bits("a", 5, 3).unwrap();
        writer.write_int_bits("b", -2, 2).unwrap();
        writer.write_uint_bits("c", u32::MAX, 32).unwrap();
        writer.write_int_bits("d", i32::MIN, 32).unwrap();

        let mut reader = reader_for(writer);
        assert_eq!(reader.read_uint_bits("a", 3).unwrap(), 5);
        assert_eq!(reader.read_int_bits("b", 2).unwrap(), -2);
        assert_eq!(reader.read_uint_bits("c", 32).unwrap(), u32::MAX);
        assert_eq!(reader.read_int_bits("d", 32).unwrap(), i32::MIN);
        assert_eq!(reader.bit_len(), 3 + 2 + 32 + 32);
    }

    #[test]
    fn test_node_isolation_skip() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_start_node("A").unwrap();
        writer.write_start_node("B").unwrap();
        for i in 0..3 {
            writer.write_i32("Value", i).unwrap();
        }
        writer.write_end_node("B").unwrap();
        writer.write_end_node("A").unwrap();
        writer.write_u8("Marker", 0x5A).unwrap();

        let mut reader = reader_for(writer);
        let body = reader.skip_node("A").unwrap();
        assert_eq!(body, 32 + 3 * 32);
        assert_eq!(reader.position(), 32 + body);
        assert_eq!(reader.read_u8("Marker").unwrap(), 0x5A);
    }

    #[test]
    fn test_nested_node_read() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_start_node("A").unwrap();
        writer.write_string("Title", "outer").unwrap();
        writer.write_start_node("B").unwrap();
        writer.write_i32("X", -5).unwrap();
        writer.write_end_node("B").unwrap();
        writer.write_bool("Tail", true).unwrap();
        writer.write_end_node("A").unwrap();
        writer.write_u16("After", 77).unwrap();

        let mut reader = reader_for(writer);
        let mut a = reader.read_node("A").unwrap();
        assert!(a.is_node());
        assert_eq!(a.read_string("Title").unwrap(), "outer");
        let mut b = a.read_node("B").unwrap();
        assert_eq!(b.read_i32("X").unwrap(), -5);
        assert_eq!(b.remaining_bits(), 0);
        assert!(a.read_bool("Tail").unwrap());
        assert_eq!(a.remaining_bits(), 0);
        assert_eq!(reader.read_u16("After").unwrap(), 77);
    }

    #[test]
    fn test_unread_node_is_skipped_by_parent() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_start_node("Ignored").unwrap();
        writer.write_u64("Big", 123).unwrap();
        writer.write_end_node("Ignored").unwrap();
        writer.write_i16("Next", -9).unwrap();

        let mut reader = reader_for(writer);
        let _ignored = reader.read_node("Ignored").unwrap();
        assert_eq!(reader.read_i16("Next").unwrap(), -9);
    }

    #[test]
    fn test_read_past_node_end_is_structural() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_start_node("Small").unwrap();
        writer.write_u8("Only", 1).unwrap();
        writer.write_end_node("Small").unwrap();
        writer.write_u32("Outside", 99).unwrap();

        let mut reader = reader_for(writer);
        let mut node = reader.read_node("Small").unwrap();
        node.read_u8("Only").unwrap();
        let err = node.read_u32("Outside").unwrap_err();
        assert!(matches!(err, ProtocolError::NodeOverrun { requested: 32, remaining: 0 }));
        assert_eq!(err.kind(), ErrorKind::Structural);

        // The parent still sees the value after the node
        assert_eq!(reader.read_u32("Outside").unwrap(), 99);
    }

    #[test]
    fn test_order_mismatch_is_detectable() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_i32("Score", 42).unwrap();
        writer.write_string("Name", "Hero").unwrap();
        writer.write_bool("Alive", true).unwrap();

        let mut reader = reader_for(writer);
        assert_eq!(reader.read_i32("Score").unwrap(), 42);
        let alive = reader.read_bool("Alive");
        let name = reader.read_string("Name");

        let clean = matches!((&alive, &name), (Ok(true), Ok(n)) if n == "Hero")
            && reader.remaining_bits() == 0;
        assert!(!clean, "mismatched read order must not look correct");
        assert!(name.is_err() || reader.remaining_bits() != 0);
    }

    #[test]
    fn test_truncated_input_is_corruption() {
        let bytes = ValueWriter::build(EnumIoMode::Value, |w| {
            w.write_start_node("Node")?;
            w.write_u64("Value", 1)?;
            w.write_end_node("Node")
        })
        .unwrap();

        let truncated = &bytes[..bytes.len() - 2];
        let mut reader = ValueReader::from_bytes(truncated, EnumIoMode::Value);
        let err = reader.read_node("Node").unwrap_err();
        assert!(matches!(err, ProtocolError::NotEnoughBits { requested: 64, .. }));
        assert!(err.is_corruption());

        let mut reader = ValueReader::from_bytes(&[0x00], EnumIoMode::Value);
        assert!(reader.read_u16("Short").unwrap_err().is_corruption());
    }

    #[test]
    fn test_invalid_utf8_is_corruption() {
        let mut stream = BitStream::new();
        stream.write_bits(2, 16).unwrap();
        stream.write_bytes(&[0xC3, 0x28]);
        stream.seek(0).unwrap();

        let mut reader = ValueReader::new(stream, EnumIoMode::Value);
        let err = reader.read_string("Bad").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidData(_)));
    }

    #[test]
    fn test_enum_modes() {
        for mode in [EnumIoMode::Value, EnumIoMode::Name] {
            let mut writer = ValueWriter::new(mode);
            writer.write_enum("Facing", Facing::West).unwrap();
            writer.write_enum_value("Raw", Facing::South).unwrap();
            writer.write_enum_name("Named", Facing::East).unwrap();

            let mut reader = reader_for(writer);
            assert_eq!(reader.read_enum::<Facing>("Facing").unwrap(), Facing::West);
            assert_eq!(reader.read_enum_value::<Facing>("Raw").unwrap(), Facing::South);
            assert_eq!(reader.read_enum_name::<Facing>("Named").unwrap(), Facing::East);
        }
    }

    #[test]
    fn test_enum_mode_inherited_by_nodes() {
        let mut writer = ValueWriter::new(EnumIoMode::Name);
        writer.write_start_node("Outer").unwrap();
        writer.write_start_node("Inner").unwrap();
        writer.write_enum("Facing", Facing::North).unwrap();
        writer.write_end_node("Inner").unwrap();
        writer.write_end_node("Outer").unwrap();

        let mut reader = reader_for(writer);
        let mut inner = reader.read_node("Outer").unwrap().read_node("Inner").unwrap();
        assert_eq!(inner.enum_mode(), EnumIoMode::Name);
        // Name encoding: u16 length + "North"
        assert_eq!(inner.bit_len(), 16 + 5 * 8);
        assert_eq!(inner.read_enum::<Facing>("Facing").unwrap(), Facing::North);
    }

    #[test]
    fn test_unknown_enum_is_corruption() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_i32("Facing", 42).unwrap();
        writer.write_string("Facing", "Up").unwrap();

        let mut reader = reader_for(writer);
        assert!(reader.read_enum_value::<Facing>("Facing").unwrap_err().is_corruption());
        assert!(reader.read_enum_name::<Facing>("Facing").unwrap_err().is_corruption());
    }

    #[test]
    fn test_many_roundtrip() {
        let values = vec![3i32, -1, 0, i32::MAX];

        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer
            .write_many("Values", &values, |w, name, v| w.write_i32(name, *v))
            .unwrap();
        writer.write_many::<i32, _>("Empty", &[], |w, name, v| w.write_i32(name, *v)).unwrap();

        let mut reader = reader_for(writer);
        let read = reader.read_many("Values", |r, name| r.read_i32(name)).unwrap();
        assert_eq!(read, values);
        let empty = reader.read_many("Empty", |r, name| r.read_i32(name)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_many_nodes_roundtrip() {
        let items = vec![("sword".to_string(), 3u16), ("shield".to_string(), 1)];

        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer
            .write_many_nodes("Items", &items, |w, (name, amount)| {
                w.write_string("Name", name)?;
                w.write_u16("Amount", *amount)
            })
            .unwrap();

        let mut reader = reader_for(writer);
        let read = reader
            .read_many_nodes("Items", |r| Ok((r.read_string("Name")?, r.read_u16("Amount")?)))
            .unwrap();
        assert_eq!(read, items);
    }

    #[test]
    fn test_read_nodes() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        for i in 0..3u8 {
            writer.write_start_node("Entry").unwrap();
            writer.write_u8("Id", i).unwrap();
            writer.write_end_node("Entry").unwrap();
        }

        let mut reader = reader_for(writer);
        let nodes = reader.read_nodes("Entry", 3).unwrap();
        let ids: Vec<u8> = nodes
            .into_iter()
            .map(|mut n| n.read_u8("Id").unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(reader.remaining_bits(), 0);
    }

    #[test]
    fn test_base64_roundtrip() {
        let mut writer = ValueWriter::new(EnumIoMode::Value);
        writer.write_string("Name", "Hero").unwrap();
        writer.write_i32("Score", 42).unwrap();
        let text = writer.finish_base64().unwrap();

        let mut reader = ValueReader::from_base64(&text, EnumIoMode::Value).unwrap();
        assert_eq!(reader.read_string("Name").unwrap(), "Hero");
        assert_eq!(reader.read_i32("Score").unwrap(), 42);

        assert!(ValueReader::from_base64("not base64!", EnumIoMode::Value).is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entity.bin");

        let mut writer = ValueWriter::create_file(&path, EnumIoMode::Name);
        writer.write_start_node("Entity").unwrap();
        writer.write_enum("Facing", Facing::East).unwrap();
        writer.write_f32("Speed", 2.5).unwrap();
        writer.write_end_node("Entity").unwrap();
        writer.finish().unwrap();

        let mut reader = ValueReader::open_file(&path, EnumIoMode::Name).unwrap();
        let mut entity = reader.read_node("Entity").unwrap();
        assert_eq!(entity.read_enum::<Facing>("Facing").unwrap(), Facing::East);
        assert_eq!(entity.read_f32("Speed").unwrap(), 2.5);
        // Only byte padding is left
        assert!(reader.remaining_bits() < 8);
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ValueReader::open_file(temp_dir.path().join("missing.bin"), EnumIoMode::Value)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
