//! Error types for the bus layer

use thiserror::Error;

/// Errors that can occur while talking to the PulseAudio bus
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BusError {
    /// A remote method call failed
    #[error("Bus call {member} failed: {message}")]
    Call {
        /// Fully qualified member that was called
        member: String,
        /// Error text returned by the server or transport
        message: String,
    },

    /// A value did not have the type the caller asked for
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Signature of the requested type
        expected: String,
        /// Signature of the value actually received
        found: String,
    },

    /// The string is not a valid D-Bus object path
    #[error("Invalid object path: {0:?}")]
    InvalidPath(String),

    /// The property name is not in `interface.member` notation
    #[error("Invalid property {0:?}")]
    InvalidProperty(String),

    /// The property does not exist on the object
    #[error("Unknown property {property} on {path}")]
    UnknownProperty {
        /// Object path that was queried
        path: String,
        /// Fully qualified property name
        property: String,
    },

    /// The connection to the server is gone
    #[error("Bus connection closed")]
    Disconnected,

    /// An out-of-band server command failed
    #[error("Command failed: {0}")]
    Command(String),
}

/// Result type for bus operations
pub type Result<T> = std::result::Result<T, BusError>;
