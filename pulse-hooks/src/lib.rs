//! Capability-based hooks for PulseAudio D-Bus signals
//!
//! Listener types implement one small trait per server event they care about
//! ([`OnNewSink`], [`OnDeviceVolumeUpdated`], ...) and declare them with
//! [`impl_listener!`]. A [`Hooker`] matches each registered listener against
//! the capability registry, tracks which events need a remote subscription,
//! and fans decoded [`Payload`]s out to the right listeners. The
//! [`Dispatcher`] sits in front of it and turns raw bus signals into hooker
//! calls.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pulse_bus::{ObjectPath, Value};
//! use pulse_hooks::{impl_listener, Hooker, OnNewSink};
//!
//! struct Printer;
//!
//! impl OnNewSink for Printer {
//!     fn new_sink(&self, sink: &ObjectPath) {
//!         println!("new sink {}", sink);
//!     }
//! }
//!
//! impl_listener!(Printer: OnNewSink);
//!
//! let hooker = Hooker::with_builtin_catalog();
//! let registration = hooker.register(Arc::new(Printer));
//! assert_eq!(registration.subscribe, vec!["NewSink"]);
//!
//! let sink = ObjectPath::new("/org/pulseaudio/core1/sink0").unwrap();
//! let core = ObjectPath::new("/org/pulseaudio/core1").unwrap();
//! assert_eq!(hooker.call("NewSink", &core, &[Value::Path(sink)]), Ok(true));
//! ```

pub mod adapter;
pub mod capability;
pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod hooker;
pub mod payload;

pub use adapter::Adapter;
pub use capability::{
    Capability, CapabilityDescriptor, DeviceState, Listener, OnDeviceActivePortUpdated,
    OnDeviceMuteUpdated, OnDeviceStateUpdated, OnDeviceVolumeUpdated, OnFallbackSinkUnset,
    OnFallbackSinkUpdated, OnNewPlaybackStream, OnNewSink, OnNewSource, OnPlaybackStreamRemoved,
    OnRawSignal, OnSinkRemoved, OnSourceRemoved, OnStreamMuteUpdated, OnStreamVolumeUpdated,
};
pub use catalog::CatalogEntry;
pub use dispatcher::{DispatchOutcome, DispatchStats, Dispatcher, UnknownSignalHook};
pub use error::PayloadError;
pub use hooker::{Hooker, ListenerId, Registration};
pub use payload::{Envelope, Payload};
