//! Register a few listeners against the in-memory bus and watch them fire.
//!
//! Run with `PULSE_LOG_MODE=development` to see subscription changes and
//! unknown signals in the log.

use std::sync::Arc;

use pulse_dbus::hooks::{Adapter, CapabilityDescriptor, Hooker};
use pulse_dbus::prelude::*;

struct SinkTracker;

impl OnNewSink for SinkTracker {
    fn new_sink(&self, sink: &ObjectPath) {
        println!("+ sink {}", sink);
    }
}

impl OnSinkRemoved for SinkTracker {
    fn sink_removed(&self, sink: &ObjectPath) {
        println!("- sink {}", sink);
    }
}

impl OnFallbackSinkUpdated for SinkTracker {
    fn fallback_sink_updated(&self, sink: &ObjectPath) {
        println!("* fallback sink {}", sink);
    }
}

impl_listener!(SinkTracker: OnNewSink, OnSinkRemoved, OnFallbackSinkUpdated);

struct VolumeMeter;

impl OnDeviceVolumeUpdated for VolumeMeter {
    fn device_volume_updated(&self, device: &ObjectPath, volume: &[u32]) {
        let percent: Vec<u32> = volume.iter().map(|v| v * 100 / 65536).collect();
        println!("  {} volume {:?}%", device.basename().unwrap_or("?"), percent);
    }
}

impl OnDeviceMuteUpdated for VolumeMeter {
    fn device_mute_updated(&self, device: &ObjectPath, muted: bool) {
        let state = if muted { "muted" } else { "unmuted" };
        println!("  {} {}", device.basename().unwrap_or("?"), state);
    }
}

impl_listener!(VolumeMeter: OnDeviceVolumeUpdated, OnDeviceMuteUpdated);

struct PropertyWatcher;

impl OnRawSignal for PropertyWatcher {
    fn raw_signal(&self, event: &str, path: &ObjectPath, body: &[Value]) {
        println!("  {} on {} ({} args)", event, path, body.len());
    }
}

impl_listener!(PropertyWatcher: OnRawSignal);

fn path(p: &str) -> Result<ObjectPath, Box<dyn std::error::Error>> {
    Ok(ObjectPath::new(p)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pulse_dbus::logging::init_logging_from_env()?;

    let config = ClientConfig::from_env()?;
    let hooker = Hooker::with_builtin_catalog();
    hooker.add_capability("Device.PropertyListUpdated", CapabilityDescriptor::raw());
    hooker.add_adapter("Device.PropertyListUpdated", Adapter::raw());

    let client = Client::with_hooker(MemoryBus::new(), config, hooker)?;
    client.set_on_unknown_signal(|signal| println!("? {}", signal.name));

    for listener in [
        Arc::new(SinkTracker) as Arc<dyn Listener>,
        Arc::new(VolumeMeter) as Arc<dyn Listener>,
        Arc::new(PropertyWatcher) as Arc<dyn Listener>,
    ] {
        let registration = client.register(listener);
        println!("{} subscribed to {:?}", registration.id, registration.subscribed);
        for error in &registration.errors {
            eprintln!("subscription failed: {}", error);
        }
    }

    let bus = Arc::clone(client.bus());
    let worker = client.spawn_listener()?;

    let core = client.config().core_path.clone();
    let sink = path("/org/pulseaudio/core1/sink0")?;
    let name = |event: &str| client.config().signal_name(event);

    bus.emit(RawSignal::new(name("NewSink"), core.clone(), vec![Value::Path(sink.clone())]));
    bus.emit(RawSignal::new(
        name("FallbackSinkUpdated"),
        core.clone(),
        vec![Value::Path(sink.clone())],
    ));
    bus.emit(RawSignal::new(
        name("Device.VolumeUpdated"),
        sink.clone(),
        vec![Value::from(vec![32768u32, 49152])],
    ));
    bus.emit(RawSignal::new(name("Device.MuteUpdated"), sink.clone(), vec![Value::Bool(true)]));
    bus.emit(RawSignal::new(
        name("Device.PropertyListUpdated"),
        sink.clone(),
        vec![Value::from(std::collections::HashMap::<String, Vec<u8>>::new())],
    ));
    bus.emit(RawSignal::new(name("SinkRemoved"), core, vec![Value::Path(sink)]));
    bus.inject(RawSignal::new(
        "org.freedesktop.DBus.NameLost",
        path("/org/freedesktop/DBus")?,
        vec![],
    ));

    bus.close();
    let exit = worker.join().map_err(|_| "dispatch worker panicked")?;

    let stats = client.stats();
    println!(
        "{:?}: {} delivered, {} unknown, {} malformed",
        exit, stats.delivered, stats.unknown, stats.malformed
    );
    Ok(())
}
