//! # Sync Registry
//!
//! The registry maps value types to their [`ValueSync`] handler and caches the
//! resolved field list of every [`SyncTarget`] type it has seen.
//!
//! Handlers are registered explicitly when the registry is built. Registering
//! two handlers for the same value type is a configuration error. The
//! process-wide registry is set once with [`initialize_registry`] (or
//! [`initialize_default_registry`]) and read with [`registry`].
//!
//! Field lists are resolved on first request for a target type, sorted by
//! declared field name and cached for the life of the registry. Resolution
//! runs under the cache's entry lock so concurrent first requests resolve
//! once.

use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use netgore_protocol::EnumValue;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::field::{SyncFactory, SyncTarget};
use crate::property_sync::{PropertySync, PropertySyncSet};
use crate::value_sync::*;

static GLOBAL_REGISTRY: OnceLock<SyncRegistry> = OnceLock::new();

/// Registered handler for one value type
struct HandlerEntry {
    sync_name: &'static str,
    /// `Arc<dyn ValueSync<Value = T>>` for the entry's value type
    handler: Box<dyn Any + Send + Sync>,
}

/// Resolved field of a target type, shared by every synchronizer set of
/// that type
struct ResolvedField<O> {
    name: &'static str,
    wire_name: &'static str,
    skip_network_sync: bool,
    factory: Box<dyn SyncFactory<O>>,
}

struct TargetFields<O> {
    fields: Vec<ResolvedField<O>>,
}

/// Builder for a [`SyncRegistry`]
#[derive(Default)]
pub struct SyncRegistryBuilder {
    handlers: HashMap<TypeId, HandlerEntry>,
}

impl SyncRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with a handler for every built-in value type
    pub fn with_defaults() -> Result<Self> {
        Self::new()
            .register(BoolSync)?
            .register(ByteSync)?
            .register(SByteSync)?
            .register(ShortSync)?
            .register(UShortSync)?
            .register(IntSync)?
            .register(UIntSync)?
            .register(LongSync)?
            .register(ULongSync)?
            .register(FloatSync)?
            .register(DoubleSync)?
            .register(StringSync)?
            .register(Vector2Sync)?
            .register(ColorSync)?
            .register(GrhIndexSync)?
            .register(MapIndexSync)
    }

    /// Register the handler for `S::Value`
    pub fn register<S: ValueSync>(mut self, sync: S) -> Result<Self> {
        let key = TypeId::of::<S::Value>();
        if let Some(existing) = self.handlers.get(&key) {
            return Err(SyncError::DuplicateHandler {
                value_type: type_name::<S::Value>(),
                existing: existing.sync_name,
                duplicate: type_name::<S>(),
            });
        }

        let handler: Arc<dyn ValueSync<Value = S::Value>> = Arc::new(sync);
        self.handlers.insert(
            key,
            HandlerEntry {
                sync_name: type_name::<S>(),
                handler: Box::new(handler),
            },
        );
        Ok(self)
    }

    /// Register an [`EnumSync`] for `E`
    pub fn register_enum<E>(self) -> Result<Self>
    where
        E: EnumValue + PartialEq + Send + Sync,
    {
        self.register(EnumSync::<E>::new())
    }

    pub fn build(self) -> SyncRegistry {
        debug!(handlers = self.handlers.len(), "Built sync registry");
        SyncRegistry {
            handlers: self.handlers,
            targets: DashMap::new(),
        }
    }
}

impl fmt::Debug for SyncRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRegistryBuilder")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Value type handlers plus the per-target field cache
pub struct SyncRegistry {
    handlers: HashMap<TypeId, HandlerEntry>,
    targets: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl SyncRegistry {
    pub fn builder() -> SyncRegistryBuilder {
        SyncRegistryBuilder::new()
    }

    /// Registry with every built-in handler
    pub fn with_defaults() -> Result<Self> {
        Ok(SyncRegistryBuilder::with_defaults()?.build())
    }

    /// Whether a handler is registered for `T`
    pub fn handles<T: 'static>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<T>())
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of target types resolved so far
    pub fn cached_target_count(&self) -> usize {
        self.targets.len()
    }

    /// Fresh synchronizers for one instance of `O`, ordered by declared
    /// field name
    pub fn synchronizers_for<O: SyncTarget>(&self) -> Result<PropertySyncSet<O>> {
        let target = self.target_fields::<O>()?;
        let syncs = target
            .fields
            .iter()
            .map(|field| {
                PropertySync::new(
                    field.name,
                    field.wire_name,
                    field.skip_network_sync,
                    field.factory.create(),
                )
            })
            .collect();
        Ok(PropertySyncSet::new(syncs))
    }

    /// Wire names of `O`'s synced fields in sync order
    pub fn wire_names_for<O: SyncTarget>(&self) -> Result<Vec<&'static str>> {
        let target = self.target_fields::<O>()?;
        Ok(target.fields.iter().map(|f| f.wire_name).collect())
    }

    fn target_fields<O: SyncTarget>(&self) -> Result<Arc<TargetFields<O>>> {
        let key = TypeId::of::<O>();
        let cached = match self.targets.get(&key) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                let entry = self.targets.entry(key).or_try_insert_with(|| {
                    self.resolve::<O>()
                        .map(|fields| Arc::new(fields) as Arc<dyn Any + Send + Sync>)
                })?;
                Arc::clone(entry.value())
            }
        };
        cached
            .downcast::<TargetFields<O>>()
            .map_err(|_| SyncError::CacheTypeMismatch(type_name::<O>()))
    }

    fn resolve<O: SyncTarget>(&self) -> Result<TargetFields<O>> {
        let target = type_name::<O>();
        let described = O::describe_sync_fields();
        let mut names = HashSet::with_capacity(described.len());
        let mut wire_names = HashSet::with_capacity(described.len());
        let mut fields = Vec::with_capacity(described.len());

        for field in described {
            let missing = if !field.has_getter() {
                Some("getter")
            } else if !field.has_setter() {
                Some("setter")
            } else {
                None
            };
            if let Some(missing) = missing {
                return Err(SyncError::MissingAccessor {
                    target,
                    field: field.name(),
                    missing,
                });
            }

            if !names.insert(field.name()) {
                return Err(SyncError::DuplicateField {
                    target,
                    field: field.name(),
                });
            }
            if !wire_names.insert(field.wire_name()) {
                return Err(SyncError::DuplicateWireName {
                    target,
                    wire_name: field.wire_name(),
                });
            }

            let unhandled = || SyncError::UnhandledType {
                target,
                field: field.name(),
                value_type: field.value_type_name(),
            };
            let entry = self
                .handlers
                .get(&field.value_type_id())
                .ok_or_else(unhandled)?;
            let factory = field.bind(&*entry.handler).ok_or_else(unhandled)?;

            fields.push(ResolvedField {
                name: field.name(),
                wire_name: field.wire_name(),
                skip_network_sync: field.skips_network_sync(),
                factory,
            });
        }

        fields.sort_by(|a, b| a.name.cmp(b.name));
        debug!(target_type = target, fields = fields.len(), "Resolved sync fields");
        Ok(TargetFields { fields })
    }
}

impl fmt::Debug for SyncRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRegistry")
            .field("handlers", &self.handlers.len())
            .field("targets", &self.targets.len())
            .finish()
    }
}

/// Install the process-wide registry. Fails if one is already installed.
pub fn initialize_registry(registry: SyncRegistry) -> Result<&'static SyncRegistry> {
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| SyncError::AlreadyInitialized)?;
    self::registry()
}

/// Install a process-wide registry with every built-in handler
pub fn initialize_default_registry() -> Result<&'static SyncRegistry> {
    if GLOBAL_REGISTRY.get().is_some() {
        return Err(SyncError::AlreadyInitialized);
    }
    initialize_registry(SyncRegistry::with_defaults()?)
}

/// The process-wide registry
pub fn registry() -> Result<&'static SyncRegistry> {
    GLOBAL_REGISTRY.get().ok_or(SyncError::NotInitialized)
}

/// Synchronizers for `O` from the process-wide registry
pub fn get_synchronizers_for<O: SyncTarget>() -> Result<PropertySyncSet<O>> {
    registry()?.synchronizers_for::<O>()
}
