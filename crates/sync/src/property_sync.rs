//! # Property Synchronizers
//!
//! A [`PropertySync`] ties one field of one target instance to its typed
//! synchronizer and remembers the last value sent, so unchanged fields can be
//! left out of updates. The target itself is passed into every call and is
//! never stored.
//!
//! A field is dirty until its first successful write, and again whenever the
//! live value stops matching the last value sent:
//!
//! ```text
//!   never sent ──write_value──▶ clean ──(value changes)──▶ dirty
//!                                 ▲                          │
//!                                 └────────write_value───────┘
//! ```
//!
//! # Delta format
//!
//! [`PropertySyncSet::write_changed`] writes only dirty fields:
//!
//! ```text
//! ( bool(true)  uint_bits(index, index_bits)  value )*  bool(false)
//! ```
//!
//! where `index` is the field's position in the set and `index_bits` is the
//! number of bits needed for the largest index.

use std::fmt;
use std::sync::Arc;

use netgore_protocol::{ProtocolError, ValueReader, ValueWriter};
use tracing::trace;

use crate::error::Result;
use crate::field::{Getter, Setter};
use crate::value_sync::ValueSync;

const MORE_NAME: &str = "HasMore";
const INDEX_NAME: &str = "Index";

/// Type-erased half of a [`PropertySync`]
pub(crate) trait ErasedSync<O>: Send {
    fn has_value_changed(&self, target: &O) -> bool;

    fn write_value(
        &mut self,
        name: &str,
        target: &O,
        writer: &mut ValueWriter,
    ) -> netgore_protocol::Result<()>;

    fn read_value(
        &self,
        name: &str,
        target: &mut O,
        reader: &mut ValueReader,
    ) -> netgore_protocol::Result<()>;

    fn mark_dirty(&mut self);
}

pub(crate) struct TypedPropertySync<O, T> {
    get: Getter<O, T>,
    set: Setter<O, T>,
    sync: Arc<dyn ValueSync<Value = T>>,
    last_sent: Option<T>,
}

impl<O, T> TypedPropertySync<O, T> {
    pub(crate) fn new(get: Getter<O, T>, set: Setter<O, T>, sync: Arc<dyn ValueSync<Value = T>>) -> Self {
        Self {
            get,
            set,
            sync,
            last_sent: None,
        }
    }
}

impl<O, T> ErasedSync<O> for TypedPropertySync<O, T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn has_value_changed(&self, target: &O) -> bool {
        match &self.last_sent {
            Some(last) => !self.sync.same(&(self.get)(target), last),
            None => true,
        }
    }

    fn write_value(
        &mut self,
        name: &str,
        target: &O,
        writer: &mut ValueWriter,
    ) -> netgore_protocol::Result<()> {
        let value = (self.get)(target);
        self.sync.write(name, writer, &value)?;
        self.last_sent = Some(value);
        Ok(())
    }

    fn read_value(
        &self,
        name: &str,
        target: &mut O,
        reader: &mut ValueReader,
    ) -> netgore_protocol::Result<()> {
        let value = self.sync.read(name, reader)?;
        (self.set)(target, value);
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.last_sent = None;
    }
}

/// Synchronizer for one field of one target instance
pub struct PropertySync<O> {
    name: &'static str,
    wire_name: &'static str,
    skip_network_sync: bool,
    inner: Box<dyn ErasedSync<O>>,
}

impl<O> PropertySync<O> {
    pub(crate) fn new(
        name: &'static str,
        wire_name: &'static str,
        skip_network_sync: bool,
        inner: Box<dyn ErasedSync<O>>,
    ) -> Self {
        Self {
            name,
            wire_name,
            skip_network_sync,
            inner,
        }
    }

    /// Declared field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name the value is written under
    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    pub fn skip_network_sync(&self) -> bool {
        self.skip_network_sync
    }

    /// True if the value was never sent or differs from the last value sent
    pub fn has_value_changed(&self, target: &O) -> bool {
        self.inner.has_value_changed(target)
    }

    /// Write the live value and remember it as the last value sent
    ///
    /// The field stays dirty if the write fails.
    pub fn write_value(&mut self, target: &O, writer: &mut ValueWriter) -> Result<()> {
        self.inner.write_value(self.wire_name, target, writer)?;
        Ok(())
    }

    /// Read a value and push it into the target. The last value sent is not
    /// touched.
    pub fn read_value(&self, target: &mut O, reader: &mut ValueReader) -> Result<()> {
        self.inner.read_value(self.wire_name, target, reader)?;
        Ok(())
    }

    /// Forget the last value sent so the next change check reports dirty
    pub fn mark_dirty(&mut self) {
        self.inner.mark_dirty();
    }
}

impl<O> fmt::Debug for PropertySync<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySync")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("skip_network_sync", &self.skip_network_sync)
            .finish()
    }
}

/// Which fields a delta may include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncScope {
    /// Every dirty field
    #[default]
    All,
    /// Dirty fields not marked `skip_network_sync`
    Network,
}

impl SyncScope {
    fn includes<O>(self, sync: &PropertySync<O>) -> bool {
        match self {
            SyncScope::All => true,
            SyncScope::Network => !sync.skip_network_sync,
        }
    }
}

/// All synchronizers of one target instance, ordered by declared field name
pub struct PropertySyncSet<O> {
    syncs: Vec<PropertySync<O>>,
}

impl<O> PropertySyncSet<O> {
    pub(crate) fn new(syncs: Vec<PropertySync<O>>) -> Self {
        Self { syncs }
    }

    pub fn len(&self) -> usize {
        self.syncs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syncs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertySync<O>> {
        self.syncs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, PropertySync<O>> {
        self.syncs.iter_mut()
    }

    /// Look up a synchronizer by wire name
    pub fn get(&self, wire_name: &str) -> Option<&PropertySync<O>> {
        self.syncs.iter().find(|s| s.wire_name == wire_name)
    }

    pub fn get_mut(&mut self, wire_name: &str) -> Option<&mut PropertySync<O>> {
        self.syncs.iter_mut().find(|s| s.wire_name == wire_name)
    }

    /// True if any field is dirty
    pub fn has_changes(&self, target: &O) -> bool {
        self.syncs.iter().any(|s| s.has_value_changed(target))
    }

    /// Dirty fields, in set order
    pub fn changed<'a>(&'a self, target: &'a O) -> impl Iterator<Item = &'a PropertySync<O>> + 'a {
        self.syncs.iter().filter(move |s| s.has_value_changed(target))
    }

    pub fn mark_all_dirty(&mut self) {
        for sync in &mut self.syncs {
            sync.mark_dirty();
        }
    }

    /// Write every field in order
    pub fn write_all(&mut self, target: &O, writer: &mut ValueWriter) -> Result<()> {
        for sync in &mut self.syncs {
            sync.write_value(target, writer)?;
        }
        Ok(())
    }

    /// Read every field in order
    pub fn read_all(&self, target: &mut O, reader: &mut ValueReader) -> Result<()> {
        for sync in &self.syncs {
            sync.read_value(target, reader)?;
        }
        Ok(())
    }

    /// Write the dirty fields in the delta format. Returns how many were written.
    pub fn write_changed(
        &mut self,
        target: &O,
        writer: &mut ValueWriter,
        scope: SyncScope,
    ) -> Result<usize> {
        let bits = self.index_bits();
        let mut written = 0;

        for (index, sync) in self.syncs.iter_mut().enumerate() {
            if !scope.includes(sync) || !sync.has_value_changed(target) {
                continue;
            }
            let index = u32::try_from(index).map_err(|_| ProtocolError::ValueOutOfRange {
                value: index as i128,
                bits,
            })?;
            writer.write_bool(MORE_NAME, true)?;
            writer.write_uint_bits(INDEX_NAME, index, bits)?;
            sync.write_value(target, writer)?;
            written += 1;
        }
        writer.write_bool(MORE_NAME, false)?;

        trace!(written, total = self.syncs.len(), "Wrote property delta");
        Ok(written)
    }

    /// Read a delta written by [`write_changed`](Self::write_changed).
    /// Returns how many fields were read.
    pub fn read_changed(&self, target: &mut O, reader: &mut ValueReader) -> Result<usize> {
        let bits = self.index_bits();
        let mut read = 0;

        while reader.read_bool(MORE_NAME)? {
            let index = reader.read_uint_bits(INDEX_NAME, bits)? as usize;
            let sync = self.syncs.get(index).ok_or_else(|| {
                ProtocolError::InvalidData(format!(
                    "Property index {} out of range ({} properties)",
                    index,
                    self.syncs.len()
                ))
            })?;
            sync.read_value(target, reader)?;
            read += 1;
        }

        trace!(read, total = self.syncs.len(), "Read property delta");
        Ok(read)
    }

    /// Bits used for a field index in the delta format (at least 1)
    pub fn index_bits(&self) -> u32 {
        let largest = self.syncs.len().max(2) - 1;
        usize::BITS - largest.leading_zeros()
    }
}

impl<O> fmt::Debug for PropertySyncSet<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.syncs.iter()).finish()
    }
}

impl<'a, O> IntoIterator for &'a PropertySyncSet<O> {
    type Item = &'a PropertySync<O>;
    type IntoIter = std::slice::Iter<'a, PropertySync<O>>;

    fn into_iter(self) -> Self::IntoIter {
        self.syncs.iter()
    }
}
