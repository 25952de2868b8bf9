//! Core type definitions

use serde::{Deserialize, Serialize};

/// How enum values are encoded by value readers and writers
///
/// The mode is fixed when a reader or writer is created and is inherited by
/// every node reader or writer derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnumIoMode {
    /// Write the underlying integer value
    #[default]
    Value,
    /// Write the symbolic name as a string
    Name,
}

impl EnumIoMode {
    pub fn from_use_names(use_names: bool) -> Self {
        if use_names {
            Self::Name
        } else {
            Self::Value
        }
    }

    pub fn uses_names(&self) -> bool {
        matches!(self, Self::Name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Name => "name",
        }
    }
}

/// Index of a graphic (Grh) definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GrhIndex(pub u32);

impl GrhIndex {
    /// Grh indices at or above this value are never assigned
    pub const INVALID: GrhIndex = GrhIndex(u32::MAX);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn is_invalid(&self) -> bool {
        *self == Self::INVALID
    }
}

impl From<u32> for GrhIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// Index of a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct MapIndex(pub u16);

impl MapIndex {
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl From<u16> for MapIndex {
    fn from(index: u16) -> Self {
        Self(index)
    }
}
