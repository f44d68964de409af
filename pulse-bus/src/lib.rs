//! Bus layer for pulse-dbus
//!
//! This crate holds everything the signal-routing core needs from the
//! PulseAudio D-Bus connection without owning the connection itself:
//!
//! - [`Value`], [`ValueKind`] and [`FromValue`]: the dynamically typed values
//!   found in signal bodies and property replies
//! - [`ObjectPath`]: validated object paths
//! - [`RawSignal`]: one inbound signal as the transport delivers it
//! - [`SignalBus`] and [`PropertyBus`]: the transport seams
//! - [`PropertyObject`]: typed property getters on a server object
//! - [`MemoryBus`]: an in-process transport for tests and demos
//! - [`module`]: `pactl` helpers for the server's D-Bus module

mod error;
pub mod memory;
pub mod module;
mod object;
mod path;
mod signal;
mod transport;
mod value;

pub use error::{BusError, Result};
pub use memory::{BusCall, MemoryBus};
pub use object::{split_property, PropertyObject};
pub use path::ObjectPath;
pub use signal::RawSignal;
pub use transport::{PropertyBus, SignalBus, SignalFeed};
pub use value::{FromValue, Value, ValueKind};
