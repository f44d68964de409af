//! Dispatch loops and their stop handles
//!
//! A client runs at most one dispatch loop at a time. Starting a loop claims
//! the client's [`SessionSlot`]; the returned [`Session`] carries the stop
//! signals and releases the slot when dropped, whichever way the loop ends.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;
use pulse_bus::{RawSignal, SignalFeed};
use pulse_hooks::Dispatcher;
use tokio::sync::{mpsc, Notify};

use crate::error::ClientError;

/// Why a dispatch loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// `stop_listening` was called
    Stopped,
    /// The feed was closed by the bus
    FeedClosed,
}

struct ActiveSession {
    generation: u64,
    // Never sent on; dropping it wakes the blocking loop.
    _stop: Sender<()>,
    notify: Arc<Notify>,
}

#[derive(Default)]
struct SlotState {
    active: Option<ActiveSession>,
    next_generation: u64,
}

/// Tracks the one dispatch loop a client may run.
#[derive(Default)]
pub(crate) struct SessionSlot {
    state: Mutex<SlotState>,
}

impl SessionSlot {
    /// Claim the slot for a new loop.
    pub(crate) fn start(self: &Arc<Self>) -> Result<Session, ClientError> {
        let mut state = self.state.lock();
        if state.active.is_some() {
            return Err(ClientError::AlreadyListening);
        }

        state.next_generation += 1;
        let generation = state.next_generation;
        let (stop_tx, stop_rx) = channel::bounded(0);
        let notify = Arc::new(Notify::new());
        state.active = Some(ActiveSession {
            generation,
            _stop: stop_tx,
            notify: Arc::clone(&notify),
        });

        tracing::debug!(generation, "dispatch session started");
        Ok(Session {
            slot: Arc::clone(self),
            generation,
            stop: stop_rx,
            notify,
        })
    }

    /// Signal the running loop to stop. Returns whether one was running.
    pub(crate) fn stop(&self) -> bool {
        let Some(active) = self.state.lock().active.take() else {
            return false;
        };
        tracing::debug!(generation = active.generation, "dispatch session stopping");
        active.notify.notify_one();
        true
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state.lock().active.is_some()
    }

    fn finish(&self, generation: u64) {
        let mut state = self.state.lock();
        if state
            .active
            .as_ref()
            .map_or(false, |active| active.generation == generation)
        {
            state.active = None;
        }
    }
}

/// Stop handles of one running loop; releases the slot on drop.
pub(crate) struct Session {
    slot: Arc<SessionSlot>,
    generation: u64,
    stop: Receiver<()>,
    notify: Arc<Notify>,
}

impl Session {
    fn stop_requested(&self) -> bool {
        matches!(self.stop.try_recv(), Err(TryRecvError::Disconnected))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.slot.finish(self.generation);
        tracing::debug!(generation = self.generation, "dispatch session ended");
    }
}

/// Drain `feed` on the current thread until it closes or the session stops.
pub(crate) fn run_blocking(
    dispatcher: &Dispatcher,
    feed: &SignalFeed,
    session: &Session,
) -> LoopExit {
    loop {
        if session.stop_requested() {
            return LoopExit::Stopped;
        }

        crossbeam::channel::select! {
            recv(feed) -> signal => match signal {
                Ok(signal) => {
                    dispatcher.dispatch_signal(&signal);
                }
                Err(_) => return LoopExit::FeedClosed,
            },
            recv(session.stop) -> _ => return LoopExit::Stopped,
        }
    }
}

/// Async counterpart of [`run_blocking`] for a tokio feed.
pub(crate) async fn run_async(
    dispatcher: &Dispatcher,
    feed: &mut mpsc::Receiver<RawSignal>,
    session: &Session,
) -> LoopExit {
    loop {
        tokio::select! {
            biased;
            _ = session.notify.notified() => return LoopExit::Stopped,
            signal = feed.recv() => match signal {
                Some(signal) => {
                    dispatcher.dispatch_signal(&signal);
                }
                None => return LoopExit::FeedClosed,
            },
        }
    }
}

/// Spawn a named thread running [`run_blocking`].
pub(crate) fn spawn_dispatch_worker(
    dispatcher: Arc<Dispatcher>,
    feed: SignalFeed,
    session: Session,
) -> Result<JoinHandle<LoopExit>, ClientError> {
    thread::Builder::new()
        .name("pulse-dispatch".to_string())
        .spawn(move || {
            tracing::info!("Dispatch worker started");
            let exit = run_blocking(&dispatcher, &feed, &session);
            tracing::info!(?exit, "Dispatch worker stopped");
            exit
        })
        .map_err(ClientError::Worker)
}
