//! The built-in PulseAudio event catalog.
//!
//! One row per event of the `org.PulseAudio.Core1` interface family: the bare
//! event name, what a listener must declare, the body signature and the
//! adapter decoding it. Callers get fresh values each time and may extend or
//! override them through the [`Hooker`](crate::Hooker) before registering
//! listeners.

use pulse_bus::{ObjectPath, ValueKind};

use crate::adapter::Adapter;
use crate::capability::{Capability, CapabilityDescriptor, DeviceState};
use crate::payload::Payload;

/// One event of the catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Bare event name, e.g. `Device.VolumeUpdated`
    pub name: &'static str,
    /// Capability and body signature
    pub descriptor: CapabilityDescriptor,
    /// Decoder for the body
    pub adapter: Adapter,
}

fn entry(
    name: &'static str,
    capability: Capability,
    signature: Vec<ValueKind>,
    adapter: Adapter,
) -> CatalogEntry {
    CatalogEntry {
        name,
        descriptor: CapabilityDescriptor::new(capability, signature),
        adapter,
    }
}

fn path_event(
    name: &'static str,
    capability: Capability,
    wrap: fn(ObjectPath) -> Payload,
) -> CatalogEntry {
    entry(name, capability, vec![ValueKind::Path], Adapter::single(wrap))
}

/// Every built-in event.
pub fn builtin() -> Vec<CatalogEntry> {
    let volume = || vec![ValueKind::array(ValueKind::Uint32)];

    vec![
        path_event(
            "FallbackSinkUpdated",
            Capability::FallbackSinkUpdated,
            Payload::FallbackSinkUpdated,
        ),
        entry(
            "FallbackSinkUnset",
            Capability::FallbackSinkUnset,
            vec![],
            Adapter::unit(Payload::FallbackSinkUnset),
        ),
        path_event("NewSink", Capability::NewSink, Payload::NewSink),
        path_event("SinkRemoved", Capability::SinkRemoved, Payload::SinkRemoved),
        path_event("NewSource", Capability::NewSource, Payload::NewSource),
        path_event("SourceRemoved", Capability::SourceRemoved, Payload::SourceRemoved),
        path_event(
            "NewPlaybackStream",
            Capability::NewPlaybackStream,
            Payload::NewPlaybackStream,
        ),
        path_event(
            "PlaybackStreamRemoved",
            Capability::PlaybackStreamRemoved,
            Payload::PlaybackStreamRemoved,
        ),
        entry(
            "Device.VolumeUpdated",
            Capability::DeviceVolumeUpdated,
            volume(),
            Adapter::single(Payload::DeviceVolumeUpdated),
        ),
        entry(
            "Device.MuteUpdated",
            Capability::DeviceMuteUpdated,
            vec![ValueKind::Bool],
            Adapter::single(Payload::DeviceMuteUpdated),
        ),
        entry(
            "Device.StateUpdated",
            Capability::DeviceStateUpdated,
            vec![ValueKind::Uint32],
            Adapter::single(|state: u32| Payload::DeviceStateUpdated(DeviceState::from(state))),
        ),
        path_event(
            "Device.ActivePortUpdated",
            Capability::DeviceActivePortUpdated,
            Payload::DeviceActivePortUpdated,
        ),
        entry(
            "Stream.VolumeUpdated",
            Capability::StreamVolumeUpdated,
            volume(),
            Adapter::single(Payload::StreamVolumeUpdated),
        ),
        entry(
            "Stream.MuteUpdated",
            Capability::StreamMuteUpdated,
            vec![ValueKind::Bool],
            Adapter::single(Payload::StreamMuteUpdated),
        ),
    ]
}

/// Capability registry half of the built-in catalog.
pub fn builtin_capabilities() -> Vec<(String, CapabilityDescriptor)> {
    builtin()
        .into_iter()
        .map(|e| (e.name.to_string(), e.descriptor))
        .collect()
}

/// Invocation table half of the built-in catalog.
pub fn builtin_adapters() -> Vec<(String, Adapter)> {
    builtin()
        .into_iter()
        .map(|e| (e.name.to_string(), e.adapter))
        .collect()
}
