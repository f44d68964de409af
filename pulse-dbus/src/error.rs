use pulse_bus::BusError;
use thiserror::Error;

/// Errors that can occur in the PulseAudio client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Remote subscription for a newly needed event failed
    #[error("Failed to subscribe to {event}: {source}")]
    Subscribe {
        event: String,
        #[source]
        source: BusError,
    },

    /// Remote unsubscription for a released event failed
    #[error("Failed to unsubscribe from {event}: {source}")]
    Unsubscribe {
        event: String,
        #[source]
        source: BusError,
    },

    /// A dispatch loop is already draining this client's feed
    #[error("Client is already listening")]
    AlreadyListening,

    /// Dispatch worker thread could not be started
    #[error("Failed to spawn dispatch worker: {0}")]
    Worker(#[source] std::io::Error),

    /// Bus transport error
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Event name a subscribe or unsubscribe failure refers to.
    pub fn event(&self) -> Option<&str> {
        match self {
            ClientError::Subscribe { event, .. } | ClientError::Unsubscribe { event, .. } => {
                Some(event)
            }
            _ => None,
        }
    }
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Interface name is empty or not a dotted D-Bus name
    #[error("Invalid interface name: {0:?}")]
    Interface(String),

    /// Feed capacity must allow at least one buffered signal
    #[error("Feed capacity must be greater than 0")]
    ZeroFeedCapacity,

    /// Environment override could not be parsed
    #[error("Invalid environment variable {name}: {value:?}")]
    InvalidEnv { name: String, value: String },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
