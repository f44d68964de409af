//! Sync-first PulseAudio client
//!
//! The [`Client`] ties a bus connection to a [`Hooker`] and [`Dispatcher`]:
//! registering a listener opens a remote subscription for every event that
//! just gained its first listener, unregistering closes the ones that lost
//! their last, and the dispatch loop drains the bus feed into the hooker.

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use pulse_bus::{ObjectPath, PropertyBus, PropertyObject, RawSignal, SignalBus, SignalFeed};
use pulse_hooks::{DispatchStats, Dispatcher, Hooker, Listener, ListenerId};
use tokio::sync::mpsc;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::worker::{self, LoopExit, SessionSlot};

/// Outcome of [`Client::register`]
#[derive(Debug)]
#[must_use]
pub struct Registration {
    /// Handle to pass to [`Client::unregister`]
    pub id: ListenerId,
    /// Events that gained their first listener, sorted
    pub subscribed: Vec<String>,
    /// One error per event whose remote subscription failed
    pub errors: Vec<ClientError>,
}

impl Registration {
    /// Whether every remote subscription succeeded
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of [`Client::unregister`]
#[derive(Debug, Default)]
#[must_use]
pub struct Unregistration {
    /// Events left without listeners, sorted
    pub released: Vec<String>,
    /// One error per event whose remote unsubscription failed
    pub errors: Vec<ClientError>,
}

impl Unregistration {
    /// Whether every remote unsubscription succeeded
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Client for the PulseAudio D-Bus interface
///
/// All methods are blocking except [`Client::listen_async`]. Registration may
/// happen from any thread, including while a dispatch loop is running.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use pulse_dbus::prelude::*;
///
/// struct Mixer;
///
/// impl OnDeviceVolumeUpdated for Mixer {
///     fn device_volume_updated(&self, device: &ObjectPath, volume: &[u32]) {
///         println!("{} -> {:?}", device, volume);
///     }
/// }
///
/// impl_listener!(Mixer: OnDeviceVolumeUpdated);
///
/// let client = Client::new(bus, ClientConfig::default())?;
/// let registration = client.register(Arc::new(Mixer));
/// for error in &registration.errors {
///     eprintln!("{}", error);
/// }
///
/// // Blocks until the bus closes or `stop_listening` is called
/// client.listen()?;
/// ```
pub struct Client<B> {
    bus: Arc<B>,
    config: ClientConfig,
    hooker: Arc<Hooker>,
    dispatcher: Arc<Dispatcher>,
    session: Arc<SessionSlot>,
    // Held across a hooker transition and its remote calls
    subscription_gate: Mutex<()>,
}

impl<B> Client<B> {
    /// Create a client with the built-in event catalog.
    pub fn new(bus: B, config: ClientConfig) -> Result<Self> {
        Self::with_hooker(bus, config, Hooker::with_builtin_catalog())
    }

    /// Create a client around a prepared hooker, e.g. one with extra raw events.
    pub fn with_hooker(bus: B, config: ClientConfig, hooker: Hooker) -> Result<Self> {
        config.validate()?;

        let hooker = Arc::new(hooker);
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&hooker), config.interface.clone()));

        Ok(Self {
            bus: Arc::new(bus),
            config,
            hooker,
            dispatcher,
            session: Arc::new(SessionSlot::default()),
            subscription_gate: Mutex::new(()),
        })
    }

    /// Bus this client talks to
    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    /// Client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Hooker holding the capability registry and subscriptions
    ///
    /// Extend the catalog through it before registering listeners.
    pub fn hooker(&self) -> &Arc<Hooker> {
        &self.hooker
    }

    /// Dispatcher fed by the dispatch loop
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Replace the hook called for signals nobody handles.
    pub fn set_on_unknown_signal<F>(&self, hook: F)
    where
        F: Fn(&RawSignal) + Send + Sync + 'static,
    {
        self.dispatcher.set_on_unknown_signal(hook);
    }

    /// Dispatch counters since the client was created
    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    /// Stop the running dispatch loop.
    ///
    /// The signal being dispatched, if any, completes; no further one starts.
    /// Returns whether a loop was running.
    pub fn stop_listening(&self) -> bool {
        self.session.stop()
    }

    /// Whether a dispatch loop is running
    pub fn is_listening(&self) -> bool {
        self.session.is_active()
    }
}

impl<B: SignalBus> Client<B> {
    /// Register `listener` and subscribe to the events it newly needs.
    ///
    /// A failed remote subscription is reported in
    /// [`Registration::errors`] and does not undo the local registration.
    ///
    /// Registrations and unregistrations are serialized, so the remote calls
    /// for an event reach the bus in the order its listener set changed.
    pub fn register(&self, listener: Arc<dyn Listener>) -> Registration {
        let _gate = self.subscription_gate.lock();
        let hooked = self.hooker.register(listener);

        let mut errors = Vec::new();
        for event in &hooked.subscribe {
            let signal = self.config.signal_name(event);
            match self.bus.listen_for_signal(&signal, &self.config.signal_paths) {
                Ok(()) => tracing::debug!(%signal, "listening for signal"),
                Err(source) => {
                    tracing::warn!(%signal, error = %source, "failed to listen for signal");
                    errors.push(ClientError::Subscribe {
                        event: event.clone(),
                        source,
                    });
                }
            }
        }

        Registration {
            id: hooked.id,
            subscribed: hooked.subscribe,
            errors,
        }
    }

    /// Unregister `id` and unsubscribe from the events nobody needs anymore.
    ///
    /// Unknown handles are a no-op.
    pub fn unregister(&self, id: ListenerId) -> Unregistration {
        let _gate = self.subscription_gate.lock();
        let released = self.hooker.unregister(id);

        let mut errors = Vec::new();
        for event in &released {
            let signal = self.config.signal_name(event);
            match self.bus.stop_listening_for_signal(&signal) {
                Ok(()) => tracing::debug!(%signal, "stopped listening for signal"),
                Err(source) => {
                    tracing::warn!(%signal, error = %source, "failed to stop listening for signal");
                    errors.push(ClientError::Unsubscribe {
                        event: event.clone(),
                        source,
                    });
                }
            }
        }

        Unregistration { released, errors }
    }

    /// Dispatch signals from the bus until it closes or [`Client::stop_listening`] is called.
    pub fn listen(&self) -> Result<LoopExit> {
        let session = self.session.start()?;
        let feed = self.bus.signal_feed(self.config.feed_capacity)?;
        Ok(worker::run_blocking(&self.dispatcher, &feed, &session))
    }

    /// Dispatch signals from a caller-provided feed.
    pub fn listen_on(&self, feed: SignalFeed) -> Result<LoopExit> {
        let session = self.session.start()?;
        Ok(worker::run_blocking(&self.dispatcher, &feed, &session))
    }

    /// Dispatch signals from a tokio channel.
    ///
    /// Listener callbacks run on the task driving this future.
    pub async fn listen_async(&self, mut feed: mpsc::Receiver<RawSignal>) -> Result<LoopExit> {
        let session = self.session.start()?;
        Ok(worker::run_async(&self.dispatcher, &mut feed, &session).await)
    }

    /// Run [`Client::listen`] on a dedicated thread.
    pub fn spawn_listener(&self) -> Result<JoinHandle<LoopExit>> {
        let session = self.session.start()?;
        let feed = self.bus.signal_feed(self.config.feed_capacity)?;
        worker::spawn_dispatch_worker(Arc::clone(&self.dispatcher), feed, session)
    }
}

impl<B: PropertyBus> Client<B> {
    /// Properties of the core object (`org.PulseAudio.Core1`)
    pub fn core(&self) -> PropertyObject<Arc<B>> {
        PropertyObject::new(
            Arc::clone(&self.bus),
            self.config.interface.clone(),
            self.config.core_path.clone(),
        )
    }

    /// Properties of a sink or source
    pub fn device(&self, path: ObjectPath) -> PropertyObject<Arc<B>> {
        self.object("Device", path)
    }

    /// Properties of a playback or record stream
    pub fn stream(&self, path: ObjectPath) -> PropertyObject<Arc<B>> {
        self.object("Stream", path)
    }

    /// Properties of a connected client
    pub fn client(&self, path: ObjectPath) -> PropertyObject<Arc<B>> {
        self.object("Client", path)
    }

    fn object(&self, kind: &str, path: ObjectPath) -> PropertyObject<Arc<B>> {
        PropertyObject::new(Arc::clone(&self.bus), self.config.object_interface(kind), path)
    }
}

impl<B> Drop for Client<B> {
    fn drop(&mut self) {
        tracing::debug!(
            "Client dropping, {} hooked events",
            self.hooker.hooked_events().len()
        );
        self.session.stop();
    }
}
