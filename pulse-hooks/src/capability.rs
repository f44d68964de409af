//! Capability traits and the closed set of capability tags.
//!
//! Each server event has a single-method trait. A listener implements only the
//! traits it cares about and declares them through [`Listener`], usually with
//! [`impl_listener!`](crate::impl_listener). Registration then checks each
//! event's [`Capability`] against what the listener declared.

use pulse_bus::{ObjectPath, Value, ValueKind};

/// State of a sink or source as reported by `Device.StateUpdated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Running,
    Idle,
    Suspended,
    /// Value outside the documented enumeration
    Unknown(u32),
}

impl From<u32> for DeviceState {
    fn from(value: u32) -> Self {
        match value {
            0 => DeviceState::Running,
            1 => DeviceState::Idle,
            2 => DeviceState::Suspended,
            other => DeviceState::Unknown(other),
        }
    }
}

/// Called when the fallback sink changes.
pub trait OnFallbackSinkUpdated {
    fn fallback_sink_updated(&self, sink: &ObjectPath);
}

/// Called when no sink is selected as fallback anymore.
pub trait OnFallbackSinkUnset {
    fn fallback_sink_unset(&self);
}

/// Called when a sink is added.
pub trait OnNewSink {
    fn new_sink(&self, sink: &ObjectPath);
}

/// Called when a sink is removed.
pub trait OnSinkRemoved {
    fn sink_removed(&self, sink: &ObjectPath);
}

/// Called when a source is added.
pub trait OnNewSource {
    fn new_source(&self, source: &ObjectPath);
}

/// Called when a source is removed.
pub trait OnSourceRemoved {
    fn source_removed(&self, source: &ObjectPath);
}

/// Called when a playback stream is added.
pub trait OnNewPlaybackStream {
    fn new_playback_stream(&self, stream: &ObjectPath);
}

/// Called when a playback stream is removed.
pub trait OnPlaybackStreamRemoved {
    fn playback_stream_removed(&self, stream: &ObjectPath);
}

/// Called when the volume of a device changes, one value per channel.
pub trait OnDeviceVolumeUpdated {
    fn device_volume_updated(&self, device: &ObjectPath, volume: &[u32]);
}

/// Called when a device is muted or unmuted.
pub trait OnDeviceMuteUpdated {
    fn device_mute_updated(&self, device: &ObjectPath, muted: bool);
}

/// Called when a device changes state (running, idle, suspended).
pub trait OnDeviceStateUpdated {
    fn device_state_updated(&self, device: &ObjectPath, state: DeviceState);
}

/// Called when the active port of a device changes, e.g. headphones plugged in.
pub trait OnDeviceActivePortUpdated {
    fn device_active_port_updated(&self, device: &ObjectPath, port: &ObjectPath);
}

/// Called when the volume of a stream changes, one value per channel.
pub trait OnStreamVolumeUpdated {
    fn stream_volume_updated(&self, stream: &ObjectPath, volume: &[u32]);
}

/// Called when a stream is muted or unmuted.
pub trait OnStreamMuteUpdated {
    fn stream_mute_updated(&self, stream: &ObjectPath, muted: bool);
}

/// Untyped delivery for events registered with [`Adapter::raw`](crate::Adapter::raw).
pub trait OnRawSignal {
    /// Whether this listener wants `event`. Defaults to every raw event.
    fn wants(&self, event: &str) -> bool {
        let _ = event;
        true
    }

    fn raw_signal(&self, event: &str, path: &ObjectPath, body: &[Value]);
}

/// An object that can be registered for server events.
///
/// Every accessor defaults to `None`; a listener overrides the ones matching
/// the capability traits it implements. [`impl_listener!`](crate::impl_listener)
/// writes those overrides.
pub trait Listener: Send + Sync + 'static {
    fn as_fallback_sink_updated(&self) -> Option<&dyn OnFallbackSinkUpdated> {
        None
    }
    fn as_fallback_sink_unset(&self) -> Option<&dyn OnFallbackSinkUnset> {
        None
    }
    fn as_new_sink(&self) -> Option<&dyn OnNewSink> {
        None
    }
    fn as_sink_removed(&self) -> Option<&dyn OnSinkRemoved> {
        None
    }
    fn as_new_source(&self) -> Option<&dyn OnNewSource> {
        None
    }
    fn as_source_removed(&self) -> Option<&dyn OnSourceRemoved> {
        None
    }
    fn as_new_playback_stream(&self) -> Option<&dyn OnNewPlaybackStream> {
        None
    }
    fn as_playback_stream_removed(&self) -> Option<&dyn OnPlaybackStreamRemoved> {
        None
    }
    fn as_device_volume_updated(&self) -> Option<&dyn OnDeviceVolumeUpdated> {
        None
    }
    fn as_device_mute_updated(&self) -> Option<&dyn OnDeviceMuteUpdated> {
        None
    }
    fn as_device_state_updated(&self) -> Option<&dyn OnDeviceStateUpdated> {
        None
    }
    fn as_device_active_port_updated(&self) -> Option<&dyn OnDeviceActivePortUpdated> {
        None
    }
    fn as_stream_volume_updated(&self) -> Option<&dyn OnStreamVolumeUpdated> {
        None
    }
    fn as_stream_mute_updated(&self) -> Option<&dyn OnStreamMuteUpdated> {
        None
    }
    fn as_raw_signal(&self) -> Option<&dyn OnRawSignal> {
        None
    }
}

/// Tag identifying one capability trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    FallbackSinkUpdated,
    FallbackSinkUnset,
    NewSink,
    SinkRemoved,
    NewSource,
    SourceRemoved,
    NewPlaybackStream,
    PlaybackStreamRemoved,
    DeviceVolumeUpdated,
    DeviceMuteUpdated,
    DeviceStateUpdated,
    DeviceActivePortUpdated,
    StreamVolumeUpdated,
    StreamMuteUpdated,
    Raw,
}

impl Capability {
    /// Whether `listener` declares this capability for `event`.
    pub fn declared_by(&self, event: &str, listener: &dyn Listener) -> bool {
        match self {
            Capability::FallbackSinkUpdated => listener.as_fallback_sink_updated().is_some(),
            Capability::FallbackSinkUnset => listener.as_fallback_sink_unset().is_some(),
            Capability::NewSink => listener.as_new_sink().is_some(),
            Capability::SinkRemoved => listener.as_sink_removed().is_some(),
            Capability::NewSource => listener.as_new_source().is_some(),
            Capability::SourceRemoved => listener.as_source_removed().is_some(),
            Capability::NewPlaybackStream => listener.as_new_playback_stream().is_some(),
            Capability::PlaybackStreamRemoved => listener.as_playback_stream_removed().is_some(),
            Capability::DeviceVolumeUpdated => listener.as_device_volume_updated().is_some(),
            Capability::DeviceMuteUpdated => listener.as_device_mute_updated().is_some(),
            Capability::DeviceStateUpdated => listener.as_device_state_updated().is_some(),
            Capability::DeviceActivePortUpdated => {
                listener.as_device_active_port_updated().is_some()
            }
            Capability::StreamVolumeUpdated => listener.as_stream_volume_updated().is_some(),
            Capability::StreamMuteUpdated => listener.as_stream_mute_updated().is_some(),
            Capability::Raw => listener
                .as_raw_signal()
                .map_or(false, |raw| raw.wants(event)),
        }
    }
}

/// What a listener must declare to receive one event, and the payload shape
/// the event carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    /// Capability the listener must declare
    pub capability: Capability,
    /// Expected body signature; `None` accepts any body
    pub signature: Option<Vec<ValueKind>>,
}

impl CapabilityDescriptor {
    /// Descriptor for a typed event with the given body signature.
    pub fn new(capability: Capability, signature: Vec<ValueKind>) -> Self {
        Self {
            capability,
            signature: Some(signature),
        }
    }

    /// Descriptor for an untyped event delivered through [`OnRawSignal`].
    pub fn raw() -> Self {
        Self {
            capability: Capability::Raw,
            signature: None,
        }
    }

    /// Whether `listener` is eligible for `event` under this descriptor.
    pub fn accepts(&self, event: &str, listener: &dyn Listener) -> bool {
        self.capability.declared_by(event, listener)
    }

    /// Signature as a D-Bus struct string, e.g. `(au)`.
    pub fn signature_string(&self) -> Option<String> {
        self.signature.as_ref().map(|kinds| {
            let inner: String = kinds.iter().map(ValueKind::signature).collect();
            format!("({})", inner)
        })
    }
}

/// Implement [`Listener`] for a type by naming the capability traits it implements.
///
/// ```rust,ignore
/// struct Mixer;
///
/// impl OnDeviceVolumeUpdated for Mixer {
///     fn device_volume_updated(&self, device: &ObjectPath, volume: &[u32]) {
///         println!("{} -> {:?}", device, volume);
///     }
/// }
///
/// impl_listener!(Mixer: OnDeviceVolumeUpdated);
/// ```
///
/// Naming a trait the type does not implement is a compile error.
#[macro_export]
macro_rules! impl_listener {
    ($ty:ty : $($capability:ident),+ $(,)?) => {
        impl $crate::Listener for $ty {
            $( $crate::__listener_accessor!($capability); )+
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __listener_accessor {
    (OnFallbackSinkUpdated) => {
        fn as_fallback_sink_updated(&self) -> Option<&dyn $crate::OnFallbackSinkUpdated> {
            Some(self)
        }
    };
    (OnFallbackSinkUnset) => {
        fn as_fallback_sink_unset(&self) -> Option<&dyn $crate::OnFallbackSinkUnset> {
            Some(self)
        }
    };
    (OnNewSink) => {
        fn as_new_sink(&self) -> Option<&dyn $crate::OnNewSink> {
            Some(self)
        }
    };
    (OnSinkRemoved) => {
        fn as_sink_removed(&self) -> Option<&dyn $crate::OnSinkRemoved> {
            Some(self)
        }
    };
    (OnNewSource) => {
        fn as_new_source(&self) -> Option<&dyn $crate::OnNewSource> {
            Some(self)
        }
    };
    (OnSourceRemoved) => {
        fn as_source_removed(&self) -> Option<&dyn $crate::OnSourceRemoved> {
            Some(self)
        }
    };
    (OnNewPlaybackStream) => {
        fn as_new_playback_stream(&self) -> Option<&dyn $crate::OnNewPlaybackStream> {
            Some(self)
        }
    };
    (OnPlaybackStreamRemoved) => {
        fn as_playback_stream_removed(&self) -> Option<&dyn $crate::OnPlaybackStreamRemoved> {
            Some(self)
        }
    };
    (OnDeviceVolumeUpdated) => {
        fn as_device_volume_updated(&self) -> Option<&dyn $crate::OnDeviceVolumeUpdated> {
            Some(self)
        }
    };
    (OnDeviceMuteUpdated) => {
        fn as_device_mute_updated(&self) -> Option<&dyn $crate::OnDeviceMuteUpdated> {
            Some(self)
        }
    };
    (OnDeviceStateUpdated) => {
        fn as_device_state_updated(&self) -> Option<&dyn $crate::OnDeviceStateUpdated> {
            Some(self)
        }
    };
    (OnDeviceActivePortUpdated) => {
        fn as_device_active_port_updated(
            &self,
        ) -> Option<&dyn $crate::OnDeviceActivePortUpdated> {
            Some(self)
        }
    };
    (OnStreamVolumeUpdated) => {
        fn as_stream_volume_updated(&self) -> Option<&dyn $crate::OnStreamVolumeUpdated> {
            Some(self)
        }
    };
    (OnStreamMuteUpdated) => {
        fn as_stream_mute_updated(&self) -> Option<&dyn $crate::OnStreamMuteUpdated> {
            Some(self)
        }
    };
    (OnRawSignal) => {
        fn as_raw_signal(&self) -> Option<&dyn $crate::OnRawSignal> {
            Some(self)
        }
    };
}
