//! NetGore Core - Fundamental types shared by the serialization and sync crates

mod error;
mod types;
mod values;

pub use error::*;
pub use types::*;
pub use values::*;
