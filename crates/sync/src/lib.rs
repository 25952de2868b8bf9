//! # NetGore Property Sync
//!
//! Dirty-tracking property synchronization on top of the node reader/writer.
//!
//! - [`ValueSync`] adapts one value type to the reader/writer
//! - [`SyncTarget`] describes the synced fields of a type
//! - [`SyncRegistry`] maps value types to handlers and caches resolved fields
//! - [`PropertySyncSet`] holds one instance's synchronizers and writes full
//!   snapshots or deltas of the fields that changed

pub mod error;
pub mod field;
pub mod property_sync;
pub mod registry;
pub mod value_sync;

pub use error::{Result, SyncError};
pub use field::{SyncField, SyncTarget};
pub use property_sync::{PropertySync, PropertySyncSet, SyncScope};
pub use registry::{
    get_synchronizers_for, initialize_default_registry, initialize_registry, registry,
    SyncRegistry, SyncRegistryBuilder,
};
pub use value_sync::{
    BoolSync, ByteSync, ColorSync, DoubleSync, EnumSync, FloatSync, GrhIndexSync, IntSync,
    LongSync, MapIndexSync, SByteSync, ShortSync, StringSync, UIntSync, ULongSync, UShortSync,
    ValueSync, Vector2Sync,
};
