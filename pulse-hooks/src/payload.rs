//! Typed signal payloads and their delivery to listeners.

use pulse_bus::{ObjectPath, Value};

use crate::capability::{Capability, DeviceState, Listener};

/// Decoded body of one signal, one variant per event.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    FallbackSinkUpdated(ObjectPath),
    FallbackSinkUnset,
    NewSink(ObjectPath),
    SinkRemoved(ObjectPath),
    NewSource(ObjectPath),
    SourceRemoved(ObjectPath),
    NewPlaybackStream(ObjectPath),
    PlaybackStreamRemoved(ObjectPath),
    DeviceVolumeUpdated(Vec<u32>),
    DeviceMuteUpdated(bool),
    DeviceStateUpdated(DeviceState),
    DeviceActivePortUpdated(ObjectPath),
    StreamVolumeUpdated(Vec<u32>),
    StreamMuteUpdated(bool),
    /// Untyped body of an event routed through [`OnRawSignal`](crate::OnRawSignal)
    Raw { event: String, body: Vec<Value> },
}

impl Payload {
    /// Capability a listener needs to receive this payload.
    pub fn capability(&self) -> Capability {
        match self {
            Payload::FallbackSinkUpdated(_) => Capability::FallbackSinkUpdated,
            Payload::FallbackSinkUnset => Capability::FallbackSinkUnset,
            Payload::NewSink(_) => Capability::NewSink,
            Payload::SinkRemoved(_) => Capability::SinkRemoved,
            Payload::NewSource(_) => Capability::NewSource,
            Payload::SourceRemoved(_) => Capability::SourceRemoved,
            Payload::NewPlaybackStream(_) => Capability::NewPlaybackStream,
            Payload::PlaybackStreamRemoved(_) => Capability::PlaybackStreamRemoved,
            Payload::DeviceVolumeUpdated(_) => Capability::DeviceVolumeUpdated,
            Payload::DeviceMuteUpdated(_) => Capability::DeviceMuteUpdated,
            Payload::DeviceStateUpdated(_) => Capability::DeviceStateUpdated,
            Payload::DeviceActivePortUpdated(_) => Capability::DeviceActivePortUpdated,
            Payload::StreamVolumeUpdated(_) => Capability::StreamVolumeUpdated,
            Payload::StreamMuteUpdated(_) => Capability::StreamMuteUpdated,
            Payload::Raw { .. } => Capability::Raw,
        }
    }
}

/// One dispatch-ready signal: the emitting object and the decoded payload.
///
/// Built once per inbound signal and handed to every matched listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Object that emitted the signal
    pub path: ObjectPath,
    /// Decoded body
    pub payload: Payload,
}

impl Envelope {
    /// Create a new envelope.
    pub fn new(path: ObjectPath, payload: Payload) -> Self {
        Self { path, payload }
    }

    /// Invoke the matching method on `listener`.
    ///
    /// Returns `false` when the listener does not implement the capability the
    /// payload needs (the descriptor and adapter for the event disagree).
    pub fn deliver_to(&self, listener: &dyn Listener) -> bool {
        let path = &self.path;
        match &self.payload {
            Payload::FallbackSinkUpdated(sink) => listener
                .as_fallback_sink_updated()
                .map(|l| l.fallback_sink_updated(sink))
                .is_some(),
            Payload::FallbackSinkUnset => listener
                .as_fallback_sink_unset()
                .map(|l| l.fallback_sink_unset())
                .is_some(),
            Payload::NewSink(sink) => listener.as_new_sink().map(|l| l.new_sink(sink)).is_some(),
            Payload::SinkRemoved(sink) => listener
                .as_sink_removed()
                .map(|l| l.sink_removed(sink))
                .is_some(),
            Payload::NewSource(source) => listener
                .as_new_source()
                .map(|l| l.new_source(source))
                .is_some(),
            Payload::SourceRemoved(source) => listener
                .as_source_removed()
                .map(|l| l.source_removed(source))
                .is_some(),
            Payload::NewPlaybackStream(stream) => listener
                .as_new_playback_stream()
                .map(|l| l.new_playback_stream(stream))
                .is_some(),
            Payload::PlaybackStreamRemoved(stream) => listener
                .as_playback_stream_removed()
                .map(|l| l.playback_stream_removed(stream))
                .is_some(),
            Payload::DeviceVolumeUpdated(volume) => listener
                .as_device_volume_updated()
                .map(|l| l.device_volume_updated(path, volume))
                .is_some(),
            Payload::DeviceMuteUpdated(muted) => listener
                .as_device_mute_updated()
                .map(|l| l.device_mute_updated(path, *muted))
                .is_some(),
            Payload::DeviceStateUpdated(state) => listener
                .as_device_state_updated()
                .map(|l| l.device_state_updated(path, *state))
                .is_some(),
            Payload::DeviceActivePortUpdated(port) => listener
                .as_device_active_port_updated()
                .map(|l| l.device_active_port_updated(path, port))
                .is_some(),
            Payload::StreamVolumeUpdated(volume) => listener
                .as_stream_volume_updated()
                .map(|l| l.stream_volume_updated(path, volume))
                .is_some(),
            Payload::StreamMuteUpdated(muted) => listener
                .as_stream_mute_updated()
                .map(|l| l.stream_mute_updated(path, *muted))
                .is_some(),
            Payload::Raw { event, body } => listener
                .as_raw_signal()
                .map(|l| l.raw_signal(event, path, body))
                .is_some(),
        }
    }
}
