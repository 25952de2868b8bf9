//! Property sync errors

use netgore_core::NetGoreError;
use netgore_protocol::ProtocolError;
use thiserror::Error;

/// Property sync errors
///
/// Everything except [`SyncError::Protocol`] is a configuration error: the
/// registry or a target type was set up wrong and nothing should be synced
/// until that is fixed.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Value type {value_type} already handled by {existing}, cannot register {duplicate}")]
    DuplicateHandler {
        value_type: &'static str,
        existing: &'static str,
        duplicate: &'static str,
    },

    #[error("{target}: more than one field resolves to wire name '{wire_name}'")]
    DuplicateWireName {
        target: &'static str,
        wire_name: &'static str,
    },

    #[error("{target}: field '{field}' is declared more than once")]
    DuplicateField {
        target: &'static str,
        field: &'static str,
    },

    #[error("{target}: field '{field}' has no {missing}")]
    MissingAccessor {
        target: &'static str,
        field: &'static str,
        missing: &'static str,
    },

    #[error("{target}: no synchronizer registered for type {value_type} of field '{field}'")]
    UnhandledType {
        target: &'static str,
        field: &'static str,
        value_type: &'static str,
    },

    #[error("Sync registry has not been initialized")]
    NotInitialized,

    #[error("Sync registry is already initialized")]
    AlreadyInitialized,

    #[error("Cached sync fields for {0} have an unexpected type")]
    CacheTypeMismatch(&'static str),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl SyncError {
    /// Whether this error comes from registry or target setup
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SyncError::Protocol(_))
    }
}

impl From<SyncError> for NetGoreError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Protocol(e) => e.into(),
            other => NetGoreError::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
