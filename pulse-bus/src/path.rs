//! D-Bus object paths.

use std::fmt;
use std::str::FromStr;

use crate::error::BusError;

/// A validated D-Bus object path such as `/org/pulseaudio/core1/sink0`.
///
/// Paths start with `/`, have no trailing `/` (except the root path itself)
/// and every element is a non-empty run of `[A-Za-z0-9_]`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Create a new object path, validating its syntax.
    pub fn new(path: impl Into<String>) -> Result<Self, BusError> {
        let path = path.into();
        if is_valid(&path) {
            Ok(Self(path))
        } else {
            Err(BusError::InvalidPath(path))
        }
    }

    /// The root object path `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last element of the path, or `None` for the root path.
    ///
    /// PulseAudio names its objects by index, e.g. `sink0` or `playback_stream3`.
    pub fn basename(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Create a child path by appending one element.
    pub fn join(&self, element: &str) -> Result<Self, BusError> {
        if self.0 == "/" {
            Self::new(format!("/{}", element))
        } else {
            Self::new(format!("{}/{}", self.0, element))
        }
    }
}

fn is_valid(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|element| {
        !element.is_empty()
            && element
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    })
}

impl FromStr for ObjectPath {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ObjectPath {
    type Error = BusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = BusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
