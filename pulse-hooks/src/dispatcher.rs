//! Routing of raw bus signals into the [`Hooker`].
//!
//! The dispatcher strips the server's interface prefix from each signal name
//! and asks the hooker to deliver it. Signals that do not carry the prefix, or
//! whose event is not mapped, go to a replaceable unknown-signal hook.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use pulse_bus::RawSignal;
use tracing::warn;

use crate::hooker::Hooker;

/// Hook invoked with the untouched signal when nothing handles it.
pub type UnknownSignalHook = Arc<dyn Fn(&RawSignal) + Send + Sync>;

/// What happened to one dispatched signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the hooker for a mapped event
    Delivered,
    /// Routed to the unknown-signal hook
    Unknown,
    /// Mapped event whose body did not decode
    Malformed,
}

/// Counters since the dispatcher was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub unknown: u64,
    pub malformed: u64,
}

#[derive(Default)]
struct Counters {
    delivered: AtomicU64,
    unknown: AtomicU64,
    malformed: AtomicU64,
}

/// Strips the interface prefix and routes signals to a [`Hooker`].
pub struct Dispatcher {
    hooker: Arc<Hooker>,
    prefix: String,
    on_unknown: RwLock<UnknownSignalHook>,
    counters: Counters,
}

impl Dispatcher {
    /// Create a dispatcher for signals of `interface`, e.g. `org.PulseAudio.Core1`.
    pub fn new(hooker: Arc<Hooker>, interface: impl Into<String>) -> Self {
        Self {
            hooker,
            prefix: interface.into(),
            on_unknown: RwLock::new(Arc::new(log_unknown_signal)),
            counters: Counters::default(),
        }
    }

    /// Hooker the dispatcher delivers to.
    pub fn hooker(&self) -> &Arc<Hooker> {
        &self.hooker
    }

    /// Interface prefix stripped from signal names.
    pub fn interface(&self) -> &str {
        &self.prefix
    }

    /// Replace the unknown-signal hook.
    pub fn set_on_unknown_signal<F>(&self, hook: F)
    where
        F: Fn(&RawSignal) + Send + Sync + 'static,
    {
        *self.on_unknown.write() = Arc::new(hook);
    }

    /// Route one signal.
    pub fn dispatch_signal(&self, signal: &RawSignal) -> DispatchOutcome {
        let Some(event) = signal.member_of(&self.prefix) else {
            return self.unknown(signal);
        };

        match self.hooker.call(event, &signal.path, &signal.body) {
            Ok(true) => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                DispatchOutcome::Delivered
            }
            Ok(false) => self.unknown(signal),
            Err(error) => {
                warn!(
                    signal = %signal.name,
                    path = %signal.path,
                    %error,
                    "dropping malformed signal"
                );
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                DispatchOutcome::Malformed
            }
        }
    }

    /// Snapshot of the dispatch counters.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            unknown: self.counters.unknown.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
        }
    }

    fn unknown(&self, signal: &RawSignal) -> DispatchOutcome {
        self.counters.unknown.fetch_add(1, Ordering::Relaxed);
        // Clone out so the hook may replace itself.
        let hook = Arc::clone(&self.on_unknown.read());
        hook(signal);
        DispatchOutcome::Unknown
    }
}

fn log_unknown_signal(signal: &RawSignal) {
    warn!(signal = %signal.name, path = %signal.path, "unknown signal");
}
