//! Error types for the pulse-hooks crate.

use pulse_bus::BusError;

/// A signal body did not match what its event expects.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    /// Wrong number of arguments
    #[error("{event}: expected {expected} arguments, found {found}")]
    Arity {
        /// Event name
        event: String,
        /// Number of arguments the adapter expects
        expected: usize,
        /// Number of arguments received
        found: usize,
    },

    /// Body signature differs from the registered descriptor
    #[error("{event}: expected signature {expected}, found {found}")]
    Signature {
        /// Event name
        event: String,
        /// Signature from the capability descriptor
        expected: String,
        /// Signature of the received body
        found: String,
    },

    /// One argument could not be converted
    #[error("{event}: argument {index}: {source}")]
    Argument {
        /// Event name
        event: String,
        /// Zero-based argument position
        index: usize,
        /// Conversion failure
        #[source]
        source: BusError,
    },
}
