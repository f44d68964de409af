//! Typed property access on server objects.

use std::collections::HashMap;

use crate::error::{BusError, Result};
use crate::path::ObjectPath;
use crate::transport::PropertyBus;
use crate::value::{FromValue, Value};

/// A server object bound to one interface, with typed property getters.
///
/// There are far too many properties to give each its own method, so the
/// getter is chosen by the type of the property:
///
/// ```rust,ignore
/// let sinks = client.core().list_path("Sinks")?;
/// let device = client.device(sinks[0].clone());
/// let muted = device.bool("Mute")?;
/// device.set("Mute", !muted)?;
/// ```
#[derive(Debug, Clone)]
pub struct PropertyObject<B> {
    bus: B,
    interface: String,
    path: ObjectPath,
}

impl<B: PropertyBus> PropertyObject<B> {
    /// Bind `interface` on the object at `path`.
    pub fn new(bus: B, interface: impl Into<String>, path: ObjectPath) -> Self {
        Self {
            bus,
            interface: interface.into(),
            path,
        }
    }

    /// Interface the properties are read from.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Path of the object.
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// Query a property and return the raw value.
    pub fn get(&self, property: &str) -> Result<Value> {
        tracing::trace!("get {}.{} on {}", self.interface, property, self.path);
        self.bus.get_property(&self.path, &self.interface, property)
    }

    /// Query a property and convert it to `T`.
    pub fn get_value<T: FromValue>(&self, property: &str) -> Result<T> {
        self.get(property)?.get()
    }

    /// Update a property (only those marked read-write on the server).
    pub fn set(&self, property: &str, value: impl Into<Value>) -> Result<()> {
        tracing::trace!("set {}.{} on {}", self.interface, property, self.path);
        self.bus
            .set_property(&self.path, &self.interface, property, value.into())
    }

    /// Update a property given in `interface.member` notation.
    pub fn set_qualified(&self, qualified: &str, value: impl Into<Value>) -> Result<()> {
        let (interface, property) = split_property(qualified)?;
        self.bus
            .set_property(&self.path, interface, property, value.into())
    }

    /// Query a boolean property.
    pub fn bool(&self, property: &str) -> Result<bool> {
        self.get_value(property)
    }

    /// Query a `u32` property.
    pub fn uint32(&self, property: &str) -> Result<u32> {
        self.get_value(property)
    }

    /// Query a `u64` property.
    pub fn uint64(&self, property: &str) -> Result<u64> {
        self.get_value(property)
    }

    /// Query a string property.
    pub fn string(&self, property: &str) -> Result<String> {
        self.get_value(property)
    }

    /// Query an object path property.
    pub fn object_path(&self, property: &str) -> Result<ObjectPath> {
        self.get_value(property)
    }

    /// Query a `u32` list property, e.g. `Volume` or `Channels`.
    pub fn list_uint32(&self, property: &str) -> Result<Vec<u32>> {
        self.get_value(property)
    }

    /// Query a string list property.
    pub fn list_string(&self, property: &str) -> Result<Vec<String>> {
        self.get_value(property)
    }

    /// Query an object path list property, e.g. `Sinks`.
    pub fn list_path(&self, property: &str) -> Result<Vec<ObjectPath>> {
        self.get_value(property)
    }

    /// Query a property list (`a{say}`) as strings.
    ///
    /// The server sends values as NUL-terminated byte strings; the terminator
    /// is removed and empty values are skipped.
    pub fn map_string(&self, property: &str) -> Result<HashMap<String, String>> {
        let raw: HashMap<String, Vec<u8>> = self.get_value(property)?;
        Ok(raw
            .into_iter()
            .filter(|(_, bytes)| !bytes.is_empty())
            .map(|(key, bytes)| {
                let trimmed = bytes.strip_suffix(&[0u8]).unwrap_or(bytes.as_slice());
                (key, String::from_utf8_lossy(trimmed).into_owned())
            })
            .collect())
    }
}

/// Split a property given in `interface.member` notation.
pub fn split_property(qualified: &str) -> Result<(&str, &str)> {
    match qualified.rsplit_once('.') {
        Some((interface, member)) if !interface.is_empty() && !member.is_empty() => {
            Ok((interface, member))
        }
        _ => Err(BusError::InvalidProperty(qualified.to_string())),
    }
}
