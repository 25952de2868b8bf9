//! Error types for the value protocol

use netgore_core::NetGoreError;

/// Broad classification of a [`ProtocolError`]
///
/// Corruption can come from untrusted input and is recoverable by the caller.
/// Structural errors are programming mistakes in the code driving a reader or
/// writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Corruption,
    Structural,
    Io,
}

/// Protocol-level error types
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Not enough bits left in the stream to satisfy a read
    #[error("Corrupt data: requested {requested} bits but only {remaining} remain")]
    NotEnoughBits { requested: usize, remaining: usize },

    /// Bits were present but do not decode to a valid value
    #[error("Corrupt data: {0}")]
    InvalidData(String),

    /// `write_end_node` was called with no open node
    #[error("Cannot end node '{name}': no node is open")]
    NoOpenNode { name: String },

    /// A writer was finished while nodes were still open
    #[error("{count} node(s) still open, innermost '{innermost}'")]
    UnclosedNodes { count: usize, innermost: String },

    /// A read inside a node went past the node's declared length
    #[error("Read of {requested} bits overruns node (only {remaining} bits left in node)")]
    NodeOverrun { requested: usize, remaining: usize },

    /// A node body does not fit in the 32-bit length prefix
    #[error("Node '{name}' body of {bits} bits exceeds the length prefix")]
    NodeTooLarge { name: String, bits: usize },

    /// A string is longer than the 16-bit length prefix allows
    #[error("String of {len} bytes exceeds the maximum of {max}")]
    StringTooLong { len: usize, max: usize },

    /// Seek target lies beyond the end of the stream
    #[error("Cannot seek to bit {position}: stream holds {len} bits")]
    SeekOutOfRange { position: usize, len: usize },

    /// Bit count outside the range supported by the operation
    #[error("Invalid bit count {bits} (expected 1..={max})")]
    InvalidBitCount { bits: u32, max: u32 },

    /// Value does not fit in the requested number of bits
    #[error("Value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: i128, bits: u32 },

    /// File read or write failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::NotEnoughBits { .. } | ProtocolError::InvalidData(_) => {
                ErrorKind::Corruption
            }
            ProtocolError::NoOpenNode { .. }
            | ProtocolError::UnclosedNodes { .. }
            | ProtocolError::NodeOverrun { .. }
            | ProtocolError::NodeTooLarge { .. }
            | ProtocolError::StringTooLong { .. }
            | ProtocolError::SeekOutOfRange { .. }
            | ProtocolError::InvalidBitCount { .. }
            | ProtocolError::ValueOutOfRange { .. } => ErrorKind::Structural,
            ProtocolError::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_corruption(&self) -> bool {
        self.kind() == ErrorKind::Corruption
    }
}

impl From<ProtocolError> for NetGoreError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) => NetGoreError::Io(e),
            other if other.is_corruption() => NetGoreError::CorruptData(other.to_string()),
            other => NetGoreError::Structural(other.to_string()),
        }
    }
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
