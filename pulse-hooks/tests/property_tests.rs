//! Property-based tests for hooker registration and fan-out

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use pulse_bus::{ObjectPath, Value};
use pulse_hooks::{
    Capability, Hooker, Listener, ListenerId, OnDeviceVolumeUpdated, OnNewSink, OnNewSource,
    OnSinkRemoved, OnSourceRemoved,
};

// ============================================================================
// Test Helpers
// ============================================================================

const EVENTS: [(&str, Capability); 5] = [
    ("NewSink", Capability::NewSink),
    ("SinkRemoved", Capability::SinkRemoved),
    ("NewSource", Capability::NewSource),
    ("SourceRemoved", Capability::SourceRemoved),
    ("Device.VolumeUpdated", Capability::DeviceVolumeUpdated),
];

#[derive(Debug, Clone, PartialEq)]
struct Delivery {
    listener: usize,
    event: &'static str,
    path: String,
    volume: Vec<u32>,
}

type Log = Arc<Mutex<Vec<Delivery>>>;

/// Listener whose capabilities are chosen at runtime.
struct Probe {
    tag: usize,
    mask: [bool; 5],
    log: Log,
}

impl Probe {
    fn new(tag: usize, mask: [bool; 5], log: &Log) -> Arc<Self> {
        Arc::new(Self {
            tag,
            mask,
            log: log.clone(),
        })
    }

    fn has(&self, index: usize) -> bool {
        self.mask[index]
    }

    fn record(&self, event: &'static str, path: &ObjectPath, volume: &[u32]) {
        self.log.lock().push(Delivery {
            listener: self.tag,
            event,
            path: path.to_string(),
            volume: volume.to_vec(),
        });
    }
}

impl OnNewSink for Probe {
    fn new_sink(&self, sink: &ObjectPath) {
        self.record("NewSink", sink, &[]);
    }
}

impl OnSinkRemoved for Probe {
    fn sink_removed(&self, sink: &ObjectPath) {
        self.record("SinkRemoved", sink, &[]);
    }
}

impl OnNewSource for Probe {
    fn new_source(&self, source: &ObjectPath) {
        self.record("NewSource", source, &[]);
    }
}

impl OnSourceRemoved for Probe {
    fn source_removed(&self, source: &ObjectPath) {
        self.record("SourceRemoved", source, &[]);
    }
}

impl OnDeviceVolumeUpdated for Probe {
    fn device_volume_updated(&self, device: &ObjectPath, volume: &[u32]) {
        self.record("Device.VolumeUpdated", device, volume);
    }
}

impl Listener for Probe {
    fn as_new_sink(&self) -> Option<&dyn OnNewSink> {
        self.has(0).then_some(self as &dyn OnNewSink)
    }
    fn as_sink_removed(&self) -> Option<&dyn OnSinkRemoved> {
        self.has(1).then_some(self as &dyn OnSinkRemoved)
    }
    fn as_new_source(&self) -> Option<&dyn OnNewSource> {
        self.has(2).then_some(self as &dyn OnNewSource)
    }
    fn as_source_removed(&self) -> Option<&dyn OnSourceRemoved> {
        self.has(3).then_some(self as &dyn OnSourceRemoved)
    }
    fn as_device_volume_updated(&self) -> Option<&dyn OnDeviceVolumeUpdated> {
        self.has(4).then_some(self as &dyn OnDeviceVolumeUpdated)
    }
}

/// Names whose mask bit is set, in the hooker's sorted order.
fn names_of(mask: &[bool; 5], pick: impl Fn(usize) -> bool) -> Vec<String> {
    let mut names: Vec<String> = EVENTS
        .iter()
        .enumerate()
        .filter(|(i, _)| mask[*i] && pick(*i))
        .map(|(_, (name, _))| name.to_string())
        .collect();
    names.sort();
    names
}

fn core() -> ObjectPath {
    ObjectPath::new("/org/pulseaudio/core1").unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Register([bool; 5]),
    Unregister(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<[bool; 5]>().prop_map(Op::Register),
        any::<usize>().prop_map(Op::Unregister),
    ]
}

// ============================================================================
// Property 1: Registration follows declared capabilities
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Registering appends exactly to the declared events and reports exactly
    /// the events that gained their first listener.
    #[test]
    fn prop_register_follows_capabilities(
        masks in prop::collection::vec(any::<[bool; 5]>(), 1..12),
    ) {
        let hooker = Hooker::with_builtin_catalog();
        let log = Log::default();
        let mut counts = [0usize; 5];

        for (tag, mask) in masks.iter().enumerate() {
            let expected = names_of(mask, |i| counts[i] == 0);
            let registration = hooker.register(Probe::new(tag, *mask, &log));
            prop_assert_eq!(registration.subscribe, expected);

            for (i, (name, _)) in EVENTS.iter().enumerate() {
                if mask[i] {
                    counts[i] += 1;
                }
                prop_assert_eq!(hooker.listener_count(name), counts[i]);
            }
        }
    }
}

// ============================================================================
// Property 2 and 5: Unregistration and its idempotence
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Unregistering removes one occurrence per event, reports exactly the
    /// events that became empty, and is a no-op for absent handles.
    #[test]
    fn prop_unregister_mirrors_register(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let hooker = Hooker::with_builtin_catalog();
        let log = Log::default();
        let mut issued: Vec<ListenerId> = Vec::new();
        let mut live: HashMap<ListenerId, [bool; 5]> = HashMap::new();
        let mut counts = [0usize; 5];

        for op in ops {
            match op {
                Op::Register(mask) => {
                    let registration = hooker.register(Probe::new(issued.len(), mask, &log));
                    for (i, on) in mask.iter().enumerate() {
                        if *on {
                            counts[i] += 1;
                        }
                    }
                    issued.push(registration.id);
                    live.insert(registration.id, mask);
                }
                Op::Unregister(pick) => {
                    if issued.is_empty() {
                        continue;
                    }
                    let id = issued[pick % issued.len()];
                    let released = hooker.unregister(id);
                    match live.remove(&id) {
                        Some(mask) => {
                            let expected = names_of(&mask, |i| counts[i] == 1);
                            for (i, on) in mask.iter().enumerate() {
                                if *on {
                                    counts[i] -= 1;
                                }
                            }
                            prop_assert_eq!(released, expected);
                        }
                        None => prop_assert!(released.is_empty()),
                    }
                }
            }

            for (i, (name, _)) in EVENTS.iter().enumerate() {
                prop_assert_eq!(hooker.listener_count(name), counts[i]);
            }
        }
    }
}

// ============================================================================
// Property 3: Call distinguishes unknown from unsubscribed
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// `call` is false only for names without an adapter, whatever the
    /// subscription table holds.
    #[test]
    fn prop_call_reports_known_names(
        masks in prop::collection::vec(any::<[bool; 5]>(), 0..4),
        name in prop_oneof![
            Just("NewSink".to_string()),
            Just("Device.VolumeUpdated".to_string()),
            "[A-Z][a-z]{2,8}(\\.[A-Z][a-z]{2,8})?",
        ],
    ) {
        let hooker = Hooker::new();
        hooker.add_catalog(
            pulse_hooks::catalog::builtin()
                .into_iter()
                .filter(|entry| EVENTS.iter().any(|(n, _)| *n == entry.name)),
        );
        let log = Log::default();
        for (tag, mask) in masks.iter().enumerate() {
            hooker.register(Probe::new(tag, *mask, &log));
        }

        let known = EVENTS.iter().any(|(n, _)| *n == name);
        let body = if name == "Device.VolumeUpdated" {
            vec![Value::from(vec![1u32, 2])]
        } else {
            vec![Value::Path(core())]
        };
        prop_assert_eq!(hooker.call(&name, &core(), &body), Ok(known));
    }
}

// ============================================================================
// Property 4: N messages to K listeners give N x K deliveries
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every listener receives every message with that message's own values.
    #[test]
    fn prop_fan_out_is_complete(
        listeners in 0usize..6,
        volumes in prop::collection::vec(prop::collection::vec(any::<u32>(), 1..3), 0..8),
    ) {
        let hooker = Hooker::with_builtin_catalog();
        let log = Log::default();
        for tag in 0..listeners {
            hooker.register(Probe::new(tag, [false, false, false, false, true], &log));
        }

        let sink = ObjectPath::new("/org/pulseaudio/core1/sink0").unwrap();
        for volume in &volumes {
            let delivered =
                hooker.call("Device.VolumeUpdated", &sink, &[Value::from(volume.clone())]);
            prop_assert_eq!(delivered, Ok(true));
        }

        let log = log.lock();
        prop_assert_eq!(log.len(), volumes.len() * listeners);
        for (n, volume) in volumes.iter().enumerate() {
            for tag in 0..listeners {
                let delivery = &log[n * listeners + tag];
                prop_assert_eq!(delivery.listener, tag);
                prop_assert_eq!(delivery.event, "Device.VolumeUpdated");
                prop_assert_eq!(&delivery.path, sink.as_str());
                prop_assert_eq!(&delivery.volume, volume);
            }
        }
    }
}
