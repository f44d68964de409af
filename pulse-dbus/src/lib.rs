//! # pulse-dbus
//!
//! Typed listeners for PulseAudio's D-Bus interface.
//!
//! PulseAudio exposes its state changes as flat, namespaced D-Bus signals
//! (`org.PulseAudio.Core1.NewSink`, `org.PulseAudio.Core1.Device.VolumeUpdated`,
//! ...). This crate lets an application implement only the small callback
//! traits it cares about, registers those listeners, subscribes to each
//! signal once on the server and routes every inbound signal to exactly the
//! listeners able to handle it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pulse_dbus::prelude::*;
//!
//! struct Printer;
//!
//! impl OnNewSink for Printer {
//!     fn new_sink(&self, sink: &ObjectPath) {
//!         println!("sink added: {}", sink);
//!     }
//! }
//!
//! impl_listener!(Printer: OnNewSink);
//!
//! pulse_dbus::logging::init_logging_from_env()?;
//! let client = Client::new(bus, ClientConfig::from_env()?)?;
//! let registration = client.register(Arc::new(Printer));
//! assert!(registration.is_complete());
//! client.listen()?;
//! ```
//!
//! ## Crates
//!
//! - `pulse-bus`: values, object paths and the transport traits
//! - `pulse-hooks`: capability traits, the hooker and the dispatcher
//! - `pulse-dbus` (this crate): the client, configuration and logging

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
mod worker;

pub use client::{Client, Registration, Unregistration};
pub use config::ClientConfig;
pub use error::{ClientError, ConfigError, Result};
pub use worker::LoopExit;

pub use pulse_bus as bus;
pub use pulse_bus::module;
pub use pulse_hooks as hooks;
pub use pulse_hooks::impl_listener;

/// Everything needed to write and register listeners
pub mod prelude {
    pub use crate::client::{Client, Registration, Unregistration};
    pub use crate::config::ClientConfig;
    pub use crate::error::{ClientError, ConfigError};
    pub use crate::worker::LoopExit;
    pub use pulse_bus::{
        FromValue, MemoryBus, ObjectPath, PropertyBus, PropertyObject, RawSignal, SignalBus,
        Value, ValueKind,
    };
    pub use pulse_hooks::{
        impl_listener, Adapter, CapabilityDescriptor, DeviceState, Listener, ListenerId,
        OnDeviceActivePortUpdated, OnDeviceMuteUpdated, OnDeviceStateUpdated,
        OnDeviceVolumeUpdated, OnFallbackSinkUnset, OnFallbackSinkUpdated, OnNewPlaybackStream,
        OnNewSink, OnNewSource, OnPlaybackStreamRemoved, OnRawSignal, OnSinkRemoved,
        OnSourceRemoved, OnStreamMuteUpdated, OnStreamVolumeUpdated,
    };
}
