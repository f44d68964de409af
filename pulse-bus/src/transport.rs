//! Transport seams.
//!
//! The bus connection itself (address lookup, authentication, marshaling) lives
//! behind these traits. The core only needs to turn server-side signal
//! delivery on and off, read a feed of raw signals, and read or write
//! properties.

use crossbeam::channel::Receiver;

use crate::error::Result;
use crate::path::ObjectPath;
use crate::signal::RawSignal;
use crate::value::Value;

/// Receiving end of the inbound signal feed.
pub type SignalFeed = Receiver<RawSignal>;

/// Remote signal subscription on the server's core object.
pub trait SignalBus: Send + Sync {
    /// Ask the server to emit `signal` (fully qualified).
    ///
    /// An empty `paths` slice means signals from every object.
    fn listen_for_signal(&self, signal: &str, paths: &[ObjectPath]) -> Result<()>;

    /// Ask the server to stop emitting `signal` (fully qualified).
    fn stop_listening_for_signal(&self, signal: &str) -> Result<()>;

    /// Open the inbound signal feed with room for `capacity` queued signals.
    fn signal_feed(&self, capacity: usize) -> Result<SignalFeed>;
}

/// Property access through `org.freedesktop.DBus.Properties`.
pub trait PropertyBus: Send + Sync {
    /// Read `interface.property` on the object at `path`.
    fn get_property(&self, path: &ObjectPath, interface: &str, property: &str) -> Result<Value>;

    /// Write `interface.property` on the object at `path`.
    fn set_property(
        &self,
        path: &ObjectPath,
        interface: &str,
        property: &str,
        value: Value,
    ) -> Result<()>;
}

impl<T: SignalBus + ?Sized> SignalBus for std::sync::Arc<T> {
    fn listen_for_signal(&self, signal: &str, paths: &[ObjectPath]) -> Result<()> {
        (**self).listen_for_signal(signal, paths)
    }

    fn stop_listening_for_signal(&self, signal: &str) -> Result<()> {
        (**self).stop_listening_for_signal(signal)
    }

    fn signal_feed(&self, capacity: usize) -> Result<SignalFeed> {
        (**self).signal_feed(capacity)
    }
}

impl<T: PropertyBus + ?Sized> PropertyBus for std::sync::Arc<T> {
    fn get_property(&self, path: &ObjectPath, interface: &str, property: &str) -> Result<Value> {
        (**self).get_property(path, interface, property)
    }

    fn set_property(
        &self,
        path: &ObjectPath,
        interface: &str,
        property: &str,
        value: Value,
    ) -> Result<()> {
        (**self).set_property(path, interface, property, value)
    }
}
