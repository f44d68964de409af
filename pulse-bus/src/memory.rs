//! In-process bus.
//!
//! [`MemoryBus`] behaves like the server side of the PulseAudio core object:
//! emitted signals only reach the feed while somebody listens for them, and
//! properties live in a map. Every remote call is recorded and individual
//! signal names can be made to fail, which makes it the transport of choice
//! for tests and demos.

use std::collections::{HashMap, HashSet};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{BusError, Result};
use crate::path::ObjectPath;
use crate::signal::RawSignal;
use crate::transport::{PropertyBus, SignalBus};
use crate::value::Value;

/// A remote call observed by [`MemoryBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    /// `ListenForSignal(signal, paths)`
    Listen {
        signal: String,
        paths: Vec<ObjectPath>,
    },
    /// `StopListeningForSignal(signal)`
    StopListening { signal: String },
}

type PropertyKey = (ObjectPath, String, String);

#[derive(Default)]
struct State {
    listening: HashMap<String, Vec<ObjectPath>>,
    feeds: Vec<Sender<RawSignal>>,
    properties: HashMap<PropertyKey, Value>,
    calls: Vec<BusCall>,
    failing_listen: HashSet<String>,
    failing_stop: HashSet<String>,
}

/// In-process implementation of [`SignalBus`] and [`PropertyBus`].
#[derive(Default)]
pub struct MemoryBus {
    state: Mutex<State>,
}

impl MemoryBus {
    /// Create an empty bus with no listeners, feeds or properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ListenForSignal` fail for `signal`.
    pub fn fail_listen(&self, signal: impl Into<String>) {
        self.state.lock().failing_listen.insert(signal.into());
    }

    /// Make `StopListeningForSignal` fail for `signal`.
    pub fn fail_stop_listening(&self, signal: impl Into<String>) {
        self.state.lock().failing_stop.insert(signal.into());
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.failing_listen.clear();
        state.failing_stop.clear();
    }

    /// Whether the server currently emits `signal`.
    pub fn is_listening(&self, signal: &str) -> bool {
        self.state.lock().listening.contains_key(signal)
    }

    /// Signals currently emitted, sorted.
    pub fn listened_signals(&self) -> Vec<String> {
        let mut signals: Vec<String> = self.state.lock().listening.keys().cloned().collect();
        signals.sort();
        signals
    }

    /// Every remote call received so far, in order.
    pub fn calls(&self) -> Vec<BusCall> {
        self.state.lock().calls.clone()
    }

    /// Emit a signal the way the server would.
    ///
    /// The signal reaches the open feeds only if its name is listened for and,
    /// when the listen call named paths, its path is one of them. Returns
    /// whether it was queued on at least one feed.
    pub fn emit(&self, signal: RawSignal) -> bool {
        let feeds = {
            let state = self.state.lock();
            match state.listening.get(&signal.name) {
                Some(paths) if paths.is_empty() || paths.contains(&signal.path) => {
                    state.feeds.clone()
                }
                _ => {
                    tracing::trace!("dropping {} (not listened)", signal.name);
                    return false;
                }
            }
        };
        self.deliver(feeds, signal)
    }

    /// Queue a signal on the feeds regardless of listen state.
    pub fn inject(&self, signal: RawSignal) -> bool {
        let feeds = self.state.lock().feeds.clone();
        self.deliver(feeds, signal)
    }

    /// Number of feeds still attached to the bus.
    pub fn open_feeds(&self) -> usize {
        self.state.lock().feeds.len()
    }

    /// Drop every feed sender, ending the dispatch loops reading them.
    pub fn close(&self) {
        self.state.lock().feeds.clear();
    }

    /// Store a property value.
    pub fn put_property(
        &self,
        path: &ObjectPath,
        interface: &str,
        property: &str,
        value: impl Into<Value>,
    ) {
        self.state.lock().properties.insert(
            (path.clone(), interface.to_string(), property.to_string()),
            value.into(),
        );
    }

    fn deliver(&self, feeds: Vec<Sender<RawSignal>>, signal: RawSignal) -> bool {
        let mut delivered = false;
        let mut dead = Vec::new();
        for feed in feeds {
            // Blocks while the feed is full, like a transport with a bounded queue
            if feed.send(signal.clone()).is_ok() {
                delivered = true;
            } else {
                dead.push(feed);
            }
        }

        if !dead.is_empty() {
            self.state
                .lock()
                .feeds
                .retain(|feed| !dead.iter().any(|gone| gone.same_channel(feed)));
            tracing::trace!("pruned {} closed feed(s)", dead.len());
        }
        delivered
    }
}

impl SignalBus for MemoryBus {
    fn listen_for_signal(&self, signal: &str, paths: &[ObjectPath]) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(BusCall::Listen {
            signal: signal.to_string(),
            paths: paths.to_vec(),
        });
        if state.failing_listen.contains(signal) {
            return Err(BusError::Call {
                member: "ListenForSignal".to_string(),
                message: format!("refused to listen for {}", signal),
            });
        }
        state.listening.insert(signal.to_string(), paths.to_vec());
        Ok(())
    }

    fn stop_listening_for_signal(&self, signal: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(BusCall::StopListening {
            signal: signal.to_string(),
        });
        if state.failing_stop.contains(signal) {
            return Err(BusError::Call {
                member: "StopListeningForSignal".to_string(),
                message: format!("refused to stop listening for {}", signal),
            });
        }
        match state.listening.remove(signal) {
            Some(_) => Ok(()),
            None => Err(BusError::Call {
                member: "StopListeningForSignal".to_string(),
                message: format!("not listening for {}", signal),
            }),
        }
    }

    fn signal_feed(&self, capacity: usize) -> Result<Receiver<RawSignal>> {
        let (tx, rx) = channel::bounded(capacity);
        self.state.lock().feeds.push(tx);
        Ok(rx)
    }
}

impl PropertyBus for MemoryBus {
    fn get_property(&self, path: &ObjectPath, interface: &str, property: &str) -> Result<Value> {
        let state = self.state.lock();
        state
            .properties
            .get(&(path.clone(), interface.to_string(), property.to_string()))
            .cloned()
            .ok_or_else(|| BusError::UnknownProperty {
                path: path.to_string(),
                property: format!("{}.{}", interface, property),
            })
    }

    fn set_property(
        &self,
        path: &ObjectPath,
        interface: &str,
        property: &str,
        value: Value,
    ) -> Result<()> {
        let mut state = self.state.lock();
        match state
            .properties
            .get_mut(&(path.clone(), interface.to_string(), property.to_string()))
        {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(BusError::UnknownProperty {
                path: path.to_string(),
                property: format!("{}.{}", interface, property),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_SINK: &str = "org.PulseAudio.Core1.NewSink";

    fn core() -> ObjectPath {
        ObjectPath::new("/org/pulseaudio/core1").unwrap()
    }

    fn new_sink() -> RawSignal {
        let sink = ObjectPath::new("/org/pulseaudio/core1/sink1").unwrap();
        RawSignal::new(NEW_SINK, core(), vec![Value::Path(sink)])
    }

    #[test]
    fn test_emit_requires_listen() {
        let bus = MemoryBus::new();
        let feed = bus.signal_feed(4).unwrap();

        assert!(!bus.emit(new_sink()));
        assert!(feed.try_recv().is_err());

        bus.listen_for_signal(NEW_SINK, &[]).unwrap();
        assert!(bus.emit(new_sink()));
        assert_eq!(feed.try_recv().unwrap(), new_sink());

        bus.stop_listening_for_signal(NEW_SINK).unwrap();
        assert!(!bus.emit(new_sink()));
    }

    #[test]
    fn test_path_filter() {
        let bus = MemoryBus::new();
        let feed = bus.signal_feed(4).unwrap();
        let other = ObjectPath::new("/org/pulseaudio/core1/sink7").unwrap();

        bus.listen_for_signal(NEW_SINK, &[other]).unwrap();
        assert!(!bus.emit(new_sink()));
        assert!(feed.try_recv().is_err());
    }

    #[test]
    fn test_injected_failures_are_recorded() {
        let bus = MemoryBus::new();
        bus.fail_listen(NEW_SINK);

        assert!(bus.listen_for_signal(NEW_SINK, &[]).is_err());
        assert!(!bus.is_listening(NEW_SINK));
        assert_eq!(
            bus.calls(),
            vec![BusCall::Listen {
                signal: NEW_SINK.to_string(),
                paths: vec![],
            }]
        );

        bus.heal();
        bus.listen_for_signal(NEW_SINK, &[]).unwrap();
        assert_eq!(bus.listened_signals(), vec![NEW_SINK.to_string()]);
    }

    #[test]
    fn test_stop_listening_unknown_signal_fails() {
        let bus = MemoryBus::new();
        assert!(bus.stop_listening_for_signal(NEW_SINK).is_err());
    }

    #[test]
    fn test_dropped_feeds_are_pruned() {
        let bus = MemoryBus::new();
        bus.listen_for_signal(NEW_SINK, &[]).unwrap();
        let kept = bus.signal_feed(4).unwrap();
        drop(bus.signal_feed(4).unwrap());
        assert_eq!(bus.open_feeds(), 2);

        assert!(bus.emit(new_sink()));
        assert_eq!(bus.open_feeds(), 1);
        assert_eq!(kept.try_recv().unwrap(), new_sink());

        drop(kept);
        assert!(!bus.inject(new_sink()));
        assert_eq!(bus.open_feeds(), 0);
    }

    #[test]
    fn test_close_disconnects_feeds() {
        let bus = MemoryBus::new();
        let feed = bus.signal_feed(1).unwrap();
        bus.close();
        assert!(feed.recv().is_err());
    }
}
