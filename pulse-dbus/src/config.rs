//! Configuration for the PulseAudio client
//!
//! Controls which interface the client talks to, how many signals the bus
//! may buffer ahead of the dispatch loop, and which objects remote
//! subscriptions are scoped to.

use pulse_bus::ObjectPath;

use crate::error::ConfigError;

/// Interface of the PulseAudio core object
pub const CORE_INTERFACE: &str = "org.PulseAudio.Core1";

/// Path of the PulseAudio core object
pub const CORE_PATH: &str = "/org/pulseaudio/core1";

/// Environment variable overriding [`ClientConfig::interface`]
pub const INTERFACE_ENV: &str = "PULSE_DBUS_INTERFACE";

/// Environment variable overriding [`ClientConfig::feed_capacity`]
pub const FEED_CAPACITY_ENV: &str = "PULSE_FEED_CAPACITY";

/// Configuration for the [`Client`](crate::Client)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Interface prefix of every signal name
    /// Default: `org.PulseAudio.Core1`
    pub interface: String,

    /// Object exposing the core properties
    /// Default: `/org/pulseaudio/core1`
    pub core_path: ObjectPath,

    /// Signals the bus may buffer before the dispatch loop drains them
    /// Default: 10
    pub feed_capacity: usize,

    /// Objects remote subscriptions are restricted to; empty means all
    /// Default: empty
    pub signal_paths: Vec<ObjectPath>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            interface: CORE_INTERFACE.to_string(),
            core_path: core_path(),
            feed_capacity: 10,
            signal_paths: Vec::new(),
        }
    }
}

fn core_path() -> ObjectPath {
    ObjectPath::new(CORE_PATH).unwrap_or_else(|_| ObjectPath::root())
}

impl ClientConfig {
    /// Create a new ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ClientConfig whose subscriptions only cover `paths`
    pub fn scoped(paths: impl IntoIterator<Item = ObjectPath>) -> Self {
        Self {
            signal_paths: paths.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Create a ClientConfig for busy servers with many streams
    pub fn high_volume() -> Self {
        Self {
            feed_capacity: 1000,
            ..Default::default()
        }
    }

    /// Default configuration with overrides from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(interface) = lookup(INTERFACE_ENV) {
            config.interface = interface;
        }

        if let Some(capacity) = lookup(FEED_CAPACITY_ENV) {
            config.feed_capacity = capacity
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: FEED_CAPACITY_ENV.to_string(),
                    value: capacity.clone(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_interface = !self.interface.is_empty()
            && self.interface.contains('.')
            && self.interface.split('.').all(|element| {
                !element.is_empty()
                    && !element.starts_with(|c: char| c.is_ascii_digit())
                    && element.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            });
        if !valid_interface {
            return Err(ConfigError::Interface(self.interface.clone()));
        }

        if self.feed_capacity == 0 {
            return Err(ConfigError::ZeroFeedCapacity);
        }

        Ok(())
    }

    /// Full signal name of a bare event, e.g. `org.PulseAudio.Core1.NewSink`
    pub fn signal_name(&self, event: &str) -> String {
        format!("{}.{}", self.interface, event)
    }

    /// Interface of objects of `kind`, e.g. `org.PulseAudio.Core1.Device`
    pub fn object_interface(&self, kind: &str) -> String {
        format!("{}.{}", self.interface, kind)
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    pub fn with_core_path(mut self, path: ObjectPath) -> Self {
        self.core_path = path;
        self
    }

    pub fn with_feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }

    pub fn with_signal_paths(mut self, paths: impl IntoIterator<Item = ObjectPath>) -> Self {
        self.signal_paths = paths.into_iter().collect();
        self
    }
}
