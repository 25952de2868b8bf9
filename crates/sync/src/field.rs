//! # Sync Field Descriptions
//!
//! A type opts into property sync by implementing [`SyncTarget`] and listing
//! its synced fields. Each [`SyncField`] names the field, optionally renames it
//! on the wire, and supplies the accessor pair used to read the live value and
//! to push a received value back in.
//!
//! ```
//! use netgore_sync::{SyncField, SyncTarget};
//!
//! struct Player {
//!     score: i32,
//!     alive: bool,
//! }
//!
//! impl SyncTarget for Player {
//!     fn describe_sync_fields() -> Vec<SyncField<Self>> {
//!         vec![
//!             SyncField::new("score", |p: &Player| p.score, |p: &mut Player, v| p.score = v)
//!                 .with_wire_name("Score"),
//!             SyncField::new("alive", |p: &Player| p.alive, |p: &mut Player, v| p.alive = v),
//!         ]
//!     }
//! }
//! ```

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use crate::property_sync::{ErasedSync, TypedPropertySync};
use crate::value_sync::ValueSync;

/// Live value accessor
pub(crate) type Getter<O, T> = Arc<dyn Fn(&O) -> T + Send + Sync>;
/// Received value sink
pub(crate) type Setter<O, T> = Arc<dyn Fn(&mut O, T) + Send + Sync>;

/// A type whose fields take part in property sync
pub trait SyncTarget: Sized + 'static {
    /// Describe every synced field. Called once per registry.
    fn describe_sync_fields() -> Vec<SyncField<Self>>;
}

/// One synced field of a target type
pub struct SyncField<O> {
    name: &'static str,
    wire_name: Option<&'static str>,
    skip_network_sync: bool,
    accessors: Box<dyn FieldAccessors<O>>,
}

impl<O: 'static> SyncField<O> {
    /// Field with both a getter and a setter
    pub fn new<T, G, S>(name: &'static str, get: G, set: S) -> Self
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        G: Fn(&O) -> T + Send + Sync + 'static,
        S: Fn(&mut O, T) + Send + Sync + 'static,
    {
        Self::from_accessors::<T>(name, Some(Arc::new(get)), Some(Arc::new(set)))
    }

    /// Field that can be read but never written back
    ///
    /// Resolving a target with such a field fails, since received values
    /// would have nowhere to go.
    pub fn getter_only<T, G>(name: &'static str, get: G) -> Self
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        G: Fn(&O) -> T + Send + Sync + 'static,
    {
        Self::from_accessors::<T>(name, Some(Arc::new(get)), None)
    }

    /// Field that can be written but not read
    pub fn setter_only<T, S>(name: &'static str, set: S) -> Self
    where
        T: Clone + PartialEq + Send + Sync + 'static,
        S: Fn(&mut O, T) + Send + Sync + 'static,
    {
        Self::from_accessors::<T>(name, None, Some(Arc::new(set)))
    }

    fn from_accessors<T>(
        name: &'static str,
        get: Option<Getter<O, T>>,
        set: Option<Setter<O, T>>,
    ) -> Self
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        Self {
            name,
            wire_name: None,
            skip_network_sync: false,
            accessors: Box::new(TypedAccessors { get, set }),
        }
    }

    /// Use a custom name on the wire instead of the declared name
    pub fn with_wire_name(mut self, wire_name: &'static str) -> Self {
        self.wire_name = Some(wire_name);
        self
    }

    /// Keep the field out of network deltas that ask to skip such fields
    pub fn skip_network_sync(mut self) -> Self {
        self.skip_network_sync = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Custom wire name if one was given, otherwise the declared name
    pub fn wire_name(&self) -> &'static str {
        self.wire_name.unwrap_or(self.name)
    }

    pub fn skips_network_sync(&self) -> bool {
        self.skip_network_sync
    }

    pub fn value_type_id(&self) -> TypeId {
        self.accessors.value_type_id()
    }

    pub fn value_type_name(&self) -> &'static str {
        self.accessors.value_type_name()
    }

    pub fn has_getter(&self) -> bool {
        self.accessors.has_getter()
    }

    pub fn has_setter(&self) -> bool {
        self.accessors.has_setter()
    }

    /// Bind to a registered handler, or `None` if the handler is for another
    /// value type or an accessor is missing
    pub(crate) fn bind(&self, handler: &(dyn Any + Send + Sync)) -> Option<Box<dyn SyncFactory<O>>> {
        self.accessors.bind(handler)
    }
}

impl<O> std::fmt::Debug for SyncField<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncField")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("skip_network_sync", &self.skip_network_sync)
            .finish()
    }
}

/// Creates a fresh per-instance synchronizer for one resolved field
pub(crate) trait SyncFactory<O>: Send + Sync {
    fn create(&self) -> Box<dyn ErasedSync<O>>;
}

trait FieldAccessors<O>: Send + Sync {
    fn value_type_id(&self) -> TypeId;
    fn value_type_name(&self) -> &'static str;
    fn has_getter(&self) -> bool;
    fn has_setter(&self) -> bool;
    fn bind(&self, handler: &(dyn Any + Send + Sync)) -> Option<Box<dyn SyncFactory<O>>>;
}

struct TypedAccessors<O, T> {
    get: Option<Getter<O, T>>,
    set: Option<Setter<O, T>>,
}

impl<O, T> FieldAccessors<O> for TypedAccessors<O, T>
where
    O: 'static,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn value_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn has_getter(&self) -> bool {
        self.get.is_some()
    }

    fn has_setter(&self) -> bool {
        self.set.is_some()
    }

    fn bind(&self, handler: &(dyn Any + Send + Sync)) -> Option<Box<dyn SyncFactory<O>>> {
        let sync = handler.downcast_ref::<Arc<dyn ValueSync<Value = T>>>()?;
        Some(Box::new(TypedFactory {
            get: self.get.clone()?,
            set: self.set.clone()?,
            sync: Arc::clone(sync),
        }))
    }
}

struct TypedFactory<O, T> {
    get: Getter<O, T>,
    set: Setter<O, T>,
    sync: Arc<dyn ValueSync<Value = T>>,
}

impl<O, T> SyncFactory<O> for TypedFactory<O, T>
where
    O: 'static,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn create(&self) -> Box<dyn ErasedSync<O>> {
        Box::new(TypedPropertySync::new(
            Arc::clone(&self.get),
            Arc::clone(&self.set),
            Arc::clone(&self.sync),
        ))
    }
}
