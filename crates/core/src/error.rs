//! Core error types for NetGore

#[derive(thiserror::Error, Debug)]
pub enum NetGoreError {
    /// Data read from a stream or file was truncated or malformed
    #[error("Corrupt data: {0}")]
    CorruptData(String),

    /// A reader or writer was driven in a way its format forbids
    #[error("Structural error: {0}")]
    Structural(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, NetGoreError>;
