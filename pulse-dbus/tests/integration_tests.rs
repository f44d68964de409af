//! End-to-end tests against the in-memory bus

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use proptest::prelude::*;
use pulse_dbus::prelude::*;
use pulse_hooks::Hooker;
use tokio::sync::mpsc;

// ============================================================================
// Test Helpers
// ============================================================================

const INTERFACE: &str = "org.PulseAudio.Core1";

fn path(p: &str) -> ObjectPath {
    ObjectPath::new(p).unwrap()
}

fn signal(event: &str, origin: &str, body: Vec<Value>) -> RawSignal {
    RawSignal::new(format!("{}.{}", INTERFACE, event), path(origin), body)
}

fn client() -> Client<MemoryBus> {
    Client::new(MemoryBus::new(), ClientConfig::default()).unwrap()
}

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    log: Log,
}

impl OnNewSink for Recorder {
    fn new_sink(&self, sink: &ObjectPath) {
        self.log.lock().push(format!("new {}", sink));
    }
}

impl OnDeviceVolumeUpdated for Recorder {
    fn device_volume_updated(&self, device: &ObjectPath, volume: &[u32]) {
        self.log.lock().push(format!("volume {} {:?}", device, volume));
    }
}

impl OnDeviceStateUpdated for Recorder {
    fn device_state_updated(&self, device: &ObjectPath, state: DeviceState) {
        self.log.lock().push(format!("state {} {:?}", device, state));
    }
}

impl_listener!(Recorder: OnNewSink, OnDeviceVolumeUpdated, OnDeviceStateUpdated);

// ============================================================================
// Dispatch loop
// ============================================================================

#[test]
fn test_spawned_listener_delivers_until_bus_closes() {
    let client = client();
    let log = Log::default();
    let registration = client.register(Arc::new(Recorder { log: log.clone() }));
    assert_eq!(
        registration.subscribed,
        vec!["Device.StateUpdated", "Device.VolumeUpdated", "NewSink"]
    );

    let handle = client.spawn_listener().unwrap();
    let bus = Arc::clone(client.bus());
    let sink = "/org/pulseaudio/core1/sink0";

    assert!(bus.emit(signal("NewSink", "/org/pulseaudio/core1", vec![Value::Path(path(sink))])));
    assert!(bus.emit(signal("Device.VolumeUpdated", sink, vec![Value::from(vec![100u32, 200])])));
    assert!(bus.emit(signal("Device.StateUpdated", sink, vec![Value::Uint32(2)])));
    // Not subscribed on the server, so never reaches the feed
    let source = Value::Path(path("/org/pulseaudio/core1/source0"));
    assert!(!bus.emit(signal("NewSource", "/org/pulseaudio/core1", vec![source])));
    bus.close();

    assert_eq!(handle.join().unwrap(), LoopExit::FeedClosed);
    assert_eq!(
        *log.lock(),
        vec![
            format!("new {}", sink),
            format!("volume {} [100, 200]", sink),
            format!("state {} Suspended", sink),
        ]
    );
    assert_eq!(client.stats().delivered, 3);
    assert!(!client.is_listening());
}

#[test]
fn test_only_one_loop_at_a_time() {
    let client = client();
    let handle = client.spawn_listener().unwrap();
    assert!(client.is_listening());
    assert!(matches!(client.listen(), Err(ClientError::AlreadyListening)));

    assert!(client.stop_listening());
    assert_eq!(handle.join().unwrap(), LoopExit::Stopped);

    let handle = client.spawn_listener().unwrap();
    let _bus = Arc::clone(client.bus());
    drop(client);
    assert_eq!(handle.join().unwrap(), LoopExit::Stopped);
}

#[test]
fn test_unknown_signals_reach_the_hook() {
    let client = client();
    let unknown = Log::default();
    let seen = unknown.clone();
    client.set_on_unknown_signal(move |signal| seen.lock().push(signal.name.clone()));

    let (tx, rx) = crossbeam::channel::bounded(4);
    tx.send(RawSignal::new("NewSink", path("/org/pulseaudio/core1"), vec![]))
        .unwrap();
    tx.send(signal("Stream.StreamEvent", "/org/pulseaudio/core1/playback_stream0", vec![]))
        .unwrap();
    drop(tx);

    assert_eq!(client.listen_on(rx).unwrap(), LoopExit::FeedClosed);
    assert_eq!(
        *unknown.lock(),
        vec![
            "NewSink".to_string(),
            "org.PulseAudio.Core1.Stream.StreamEvent".to_string()
        ]
    );
    assert_eq!(client.stats().unknown, 2);
}

#[test]
fn test_malformed_signal_does_not_stop_the_loop() {
    let client = client();
    let log = Log::default();
    let _ = client.register(Arc::new(Recorder { log: log.clone() }));

    let sink = "/org/pulseaudio/core1/sink1";
    let (tx, rx) = crossbeam::channel::bounded(4);
    tx.send(signal("Device.VolumeUpdated", sink, vec![Value::Bool(true)]))
        .unwrap();
    tx.send(signal("Device.VolumeUpdated", sink, vec![Value::from(vec![7u32])]))
        .unwrap();
    drop(tx);

    assert_eq!(client.listen_on(rx).unwrap(), LoopExit::FeedClosed);
    assert_eq!(*log.lock(), vec![format!("volume {} [7]", sink)]);
    assert_eq!(client.stats().malformed, 1);
}

/// Registers a second listener from inside a callback.
struct Chain {
    hooker: Arc<Hooker>,
    log: Log,
}

impl OnNewSink for Chain {
    fn new_sink(&self, _sink: &ObjectPath) {
        let registration = self.hooker.register(Arc::new(Recorder {
            log: self.log.clone(),
        }));
        self.log.lock().push(format!("chained {}", registration.id));
    }
}

impl_listener!(Chain: OnNewSink);

#[test]
fn test_callbacks_may_register_listeners() {
    let client = client();
    let log = Log::default();
    let _ = client.register(Arc::new(Chain {
        hooker: Arc::clone(client.hooker()),
        log: log.clone(),
    }));

    let (tx, rx) = crossbeam::channel::bounded(4);
    let sink = Value::Path(path("/org/pulseaudio/core1/sink2"));
    tx.send(signal("NewSink", "/org/pulseaudio/core1", vec![sink])).unwrap();
    drop(tx);

    assert_eq!(client.listen_on(rx).unwrap(), LoopExit::FeedClosed);
    assert_eq!(*log.lock(), vec!["chained listener-2".to_string()]);
    assert_eq!(client.hooker().listener_count("NewSink"), 2);
}

#[test]
fn test_concurrent_registration_during_dispatch() {
    let client = client();
    let handle = client.spawn_listener().unwrap();
    let bus = Arc::clone(client.bus());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..25 {
                    let registration = client.register(Arc::new(Recorder { log: Log::default() }));
                    bus.emit(signal(
                        "Device.VolumeUpdated",
                        "/org/pulseaudio/core1/sink0",
                        vec![Value::from(vec![1u32])],
                    ));
                    assert!(registration.is_complete(), "{:?}", registration.errors);
                    let unregistration = client.unregister(registration.id);
                    assert!(unregistration.is_complete(), "{:?}", unregistration.errors);
                }
            });
        }
    });

    assert!(client.stop_listening());
    assert_eq!(handle.join().unwrap(), LoopExit::Stopped);
    assert!(client.hooker().hooked_events().is_empty());
    let expected: Vec<String> = client
        .hooker()
        .hooked_events()
        .iter()
        .map(|event| client.config().signal_name(event))
        .collect();
    assert_eq!(client.bus().listened_signals(), expected);
    assert_eq!(client.stats().malformed, 0);
}

/// Bus that pauses the first `StopListeningForSignal` until released.
struct PausingBus {
    inner: MemoryBus,
    pause: Mutex<Option<(crossbeam::channel::Sender<()>, crossbeam::channel::Receiver<()>)>>,
}

impl SignalBus for PausingBus {
    fn listen_for_signal(&self, signal: &str, paths: &[ObjectPath]) -> pulse_bus::Result<()> {
        self.inner.listen_for_signal(signal, paths)
    }

    fn stop_listening_for_signal(&self, signal: &str) -> pulse_bus::Result<()> {
        let pause = self.pause.lock().take();
        if let Some((reached, release)) = pause {
            reached.send(()).unwrap();
            release.recv().unwrap();
        }
        self.inner.stop_listening_for_signal(signal)
    }

    fn signal_feed(&self, capacity: usize) -> pulse_bus::Result<pulse_bus::SignalFeed> {
        self.inner.signal_feed(capacity)
    }
}

#[test]
fn test_remote_calls_follow_listener_transitions() {
    let (reached_tx, reached_rx) = crossbeam::channel::bounded(1);
    let (release_tx, release_rx) = crossbeam::channel::bounded(1);
    let bus = PausingBus {
        inner: MemoryBus::new(),
        pause: Mutex::new(Some((reached_tx, release_rx))),
    };
    let client = Client::new(bus, ClientConfig::default()).unwrap();
    let new_sink = client.config().signal_name("NewSink");

    let first = client.register(Arc::new(Recorder { log: Log::default() }));
    assert!(first.is_complete());

    let log = Log::default();
    let (unregistration, second) = std::thread::scope(|scope| {
        let leaving = scope.spawn(|| client.unregister(first.id));
        reached_rx.recv().unwrap();

        let joining = scope.spawn(|| client.register(Arc::new(Recorder { log: log.clone() })));
        std::thread::sleep(Duration::from_millis(50));
        release_tx.send(()).unwrap();

        (leaving.join().unwrap(), joining.join().unwrap())
    });

    assert!(unregistration.is_complete(), "{:?}", unregistration.errors);
    assert!(second.is_complete(), "{:?}", second.errors);
    assert_eq!(unregistration.released, second.subscribed);
    assert!(second.subscribed.contains(&"NewSink".to_string()));

    let expected: Vec<String> = client
        .hooker()
        .hooked_events()
        .iter()
        .map(|event| client.config().signal_name(event))
        .collect();
    assert_eq!(client.bus().inner.listened_signals(), expected);
    assert_eq!(client.hooker().listener_count("NewSink"), 1);
    assert!(client.bus().inner.is_listening(&new_sink));

    let sink = "/org/pulseaudio/core1/sink4";
    let feed = client.bus().inner.signal_feed(1).unwrap();
    let emitted = signal("NewSink", "/org/pulseaudio/core1", vec![Value::Path(path(sink))]);
    assert!(client.bus().inner.emit(emitted));
    client.bus().inner.close();
    assert_eq!(client.listen_on(feed).unwrap(), LoopExit::FeedClosed);
    assert_eq!(*log.lock(), vec![format!("new {}", sink)]);
}

#[tokio::test]
async fn test_listen_async_until_feed_closes() {
    let client = client();
    let log = Log::default();
    let _ = client.register(Arc::new(Recorder { log: log.clone() }));

    let (tx, rx) = mpsc::channel(8);
    let sink = "/org/pulseaudio/core1/sink3";
    tx.send(signal("Device.StateUpdated", sink, vec![Value::Uint32(0)]))
        .await
        .unwrap();
    drop(tx);

    assert_eq!(client.listen_async(rx).await.unwrap(), LoopExit::FeedClosed);
    assert_eq!(*log.lock(), vec![format!("state {} Running", sink)]);
}

#[tokio::test]
async fn test_listen_async_stops_on_request() {
    let client = Arc::new(client());
    let (_tx, rx) = mpsc::channel::<RawSignal>(8);

    let runner = Arc::clone(&client);
    let task = tokio::spawn(async move { runner.listen_async(rx).await });

    while !client.is_listening() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(client.stop_listening());
    assert_eq!(task.await.unwrap().unwrap(), LoopExit::Stopped);
}

// ============================================================================
// Remote subscriptions track the subscription table
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    RegisterRecorder,
    RegisterSinkOnly,
    Unregister(usize),
}

struct SinkOnly;

impl OnNewSink for SinkOnly {
    fn new_sink(&self, _sink: &ObjectPath) {}
}

impl_listener!(SinkOnly: OnNewSink);

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The server emits an event exactly while at least one listener needs it.
    #[test]
    fn prop_remote_subscriptions_follow_hooks(
        ops in prop::collection::vec(
            prop_oneof![
                Just(Op::RegisterRecorder),
                Just(Op::RegisterSinkOnly),
                any::<usize>().prop_map(Op::Unregister),
            ],
            1..30,
        )
    ) {
        let client = client();
        let mut ids = Vec::new();

        for op in ops {
            match op {
                Op::RegisterRecorder => {
                    let registration = client.register(Arc::new(Recorder { log: Log::default() }));
                    prop_assert!(registration.is_complete());
                    ids.push(registration.id);
                }
                Op::RegisterSinkOnly => {
                    let registration = client.register(Arc::new(SinkOnly));
                    prop_assert!(registration.is_complete());
                    ids.push(registration.id);
                }
                Op::Unregister(pick) if !ids.is_empty() => {
                    let id = ids[pick % ids.len()];
                    let unregistration = client.unregister(id);
                    prop_assert!(unregistration.is_complete());
                }
                Op::Unregister(_) => {}
            }

            let expected: Vec<String> = client
                .hooker()
                .hooked_events()
                .iter()
                .map(|event| client.config().signal_name(event))
                .collect();
            prop_assert_eq!(client.bus().listened_signals(), expected);
        }
    }
}
