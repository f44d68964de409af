//! Listener registration and per-event fan-out
//!
//! The [`Hooker`] owns three tables behind one lock: the capability registry
//! (event name to [`CapabilityDescriptor`]), the invocation table (event name
//! to [`Adapter`]) and the subscription table (event name to the handles of
//! the listeners registered for it). Registration and unregistration report
//! which event names went from zero to one listener or back, so the caller
//! knows which remote subscriptions to open or close.

use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use pulse_bus::{ObjectPath, Value, ValueKind};
use tracing::{debug, error};

use crate::adapter::Adapter;
use crate::capability::{CapabilityDescriptor, Listener};
use crate::catalog::{self, CatalogEntry};
use crate::error::PayloadError;
use crate::payload::Envelope;

/// Handle of one registration, returned by [`Hooker::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Result of [`Hooker::register`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Handle to pass to [`Hooker::unregister`]
    pub id: ListenerId,
    /// Event names that just gained their first listener, sorted
    pub subscribe: Vec<String>,
}

#[derive(Default)]
struct Tables {
    capabilities: BTreeMap<String, CapabilityDescriptor>,
    adapters: HashMap<String, Adapter>,
    hooks: HashMap<String, Vec<ListenerId>>,
    listeners: HashMap<ListenerId, Arc<dyn Listener>>,
    next_id: u64,
}

/// Capability-based subscription bookkeeping and dispatch.
#[derive(Default)]
pub struct Hooker {
    tables: RwLock<Tables>,
}

impl Hooker {
    /// Create a hooker with empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hooker preloaded with [`catalog::builtin`].
    pub fn with_builtin_catalog() -> Self {
        let hooker = Self::new();
        hooker.add_catalog(catalog::builtin());
        hooker
    }

    /// Install one capability descriptor, replacing any previous one for `name`.
    pub fn add_capability(&self, name: impl Into<String>, descriptor: CapabilityDescriptor) {
        self.add_capabilities([(name.into(), descriptor)]);
    }

    /// Install capability descriptors in bulk.
    pub fn add_capabilities<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, CapabilityDescriptor)>,
    {
        let mut tables = self.tables.write();
        let live = !tables.listeners.is_empty();
        for (name, descriptor) in entries {
            if live {
                debug!(
                    event = %name,
                    "capability added after registration; existing listeners unchanged"
                );
            }
            tables.capabilities.insert(name, descriptor);
        }
    }

    /// Install one adapter, replacing any previous one for `name`.
    pub fn add_adapter(&self, name: impl Into<String>, adapter: Adapter) {
        self.add_adapters([(name.into(), adapter)]);
    }

    /// Install adapters in bulk.
    pub fn add_adapters<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (String, Adapter)>,
    {
        let mut tables = self.tables.write();
        for (name, adapter) in entries {
            tables.adapters.insert(name, adapter);
        }
    }

    /// Install descriptor and adapter of each catalog entry.
    pub fn add_catalog<I>(&self, entries: I)
    where
        I: IntoIterator<Item = CatalogEntry>,
    {
        let (capabilities, adapters): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .map(|e| {
                (
                    (e.name.to_string(), e.descriptor),
                    (e.name.to_string(), e.adapter),
                )
            })
            .unzip();
        self.add_capabilities(capabilities);
        self.add_adapters(adapters);
    }

    /// Register `listener` under every event whose capability it declares.
    ///
    /// Only events with both a descriptor and an adapter are considered.
    /// Registering the same listener twice yields two handles and double
    /// delivery; callers must not do that unless they mean it.
    pub fn register(&self, listener: Arc<dyn Listener>) -> Registration {
        let mut guard = self.tables.write();
        let tables = &mut *guard;

        tables.next_id += 1;
        let id = ListenerId(tables.next_id);

        let mut subscribe = Vec::new();
        for (name, descriptor) in &tables.capabilities {
            if !tables.adapters.contains_key(name) || !descriptor.accepts(name, listener.as_ref()) {
                continue;
            }

            let entry = tables.hooks.entry(name.clone()).or_default();
            entry.push(id);
            debug!(event = %name, listener = %id, count = entry.len(), "listener hooked");
            if entry.len() == 1 {
                subscribe.push(name.clone());
            }
        }

        tables.listeners.insert(id, listener);
        Registration { id, subscribe }
    }

    /// Remove the registration `id` from every event it is hooked to.
    ///
    /// Returns the event names left without listeners, sorted. Unknown or
    /// already removed handles are a no-op.
    pub fn unregister(&self, id: ListenerId) -> Vec<String> {
        let mut tables = self.tables.write();
        if tables.listeners.remove(&id).is_none() {
            debug!(listener = %id, "unregister of unknown listener ignored");
            return Vec::new();
        }

        let mut released = Vec::new();
        tables.hooks.retain(|name, entry| {
            if let Some(position) = entry.iter().position(|hooked| *hooked == id) {
                entry.remove(position);
                debug!(event = %name, listener = %id, count = entry.len(), "listener unhooked");
                if entry.is_empty() {
                    released.push(name.clone());
                    return false;
                }
            }
            true
        });

        released.sort();
        released
    }

    /// Deliver one signal to every listener hooked to `name`.
    ///
    /// Returns `Ok(false)` when `name` has no adapter, and `Ok(true)` otherwise,
    /// including when nobody listens. The body is decoded once; a body that
    /// does not fit the event is an error and nothing is delivered. A panicking
    /// listener is logged and skipped.
    pub fn call(
        &self,
        name: &str,
        path: &ObjectPath,
        body: &[Value],
    ) -> Result<bool, PayloadError> {
        let (adapter, signature, listeners) = {
            let tables = self.tables.read();
            let Some(adapter) = tables.adapters.get(name).cloned() else {
                return Ok(false);
            };
            let signature = tables
                .capabilities
                .get(name)
                .and_then(|descriptor| descriptor.signature.clone());
            let listeners: Vec<(ListenerId, Arc<dyn Listener>)> = tables
                .hooks
                .get(name)
                .into_iter()
                .flatten()
                .filter_map(|id| tables.listeners.get(id).map(|l| (*id, Arc::clone(l))))
                .collect();
            (adapter, signature, listeners)
        };

        if listeners.is_empty() {
            debug!(event = name, path = %path, "signal for known event without listeners");
            return Ok(true);
        }

        if let Some(expected) = signature {
            check_signature(name, &expected, body)?;
        }
        let envelope = Envelope::new(path.clone(), adapter.decode(name, body)?);

        for (id, listener) in listeners {
            let delivered =
                catch_unwind(AssertUnwindSafe(|| envelope.deliver_to(listener.as_ref())));
            match delivered {
                Ok(true) => {}
                Ok(false) => {
                    debug!(event = name, listener = %id, "listener lacks capability for payload")
                }
                Err(_) => error!(event = name, listener = %id, "listener panicked during delivery"),
            }
        }

        Ok(true)
    }

    /// Number of listeners currently hooked to `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.tables.read().hooks.get(name).map_or(0, Vec::len)
    }

    /// Names in the capability registry, sorted.
    pub fn events(&self) -> Vec<String> {
        self.tables.read().capabilities.keys().cloned().collect()
    }

    /// Names with at least one listener, sorted.
    pub fn hooked_events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().hooks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether `id` is still registered.
    pub fn is_registered(&self, id: ListenerId) -> bool {
        self.tables.read().listeners.contains_key(&id)
    }
}

fn check_signature(
    event: &str,
    expected: &[ValueKind],
    body: &[Value],
) -> Result<(), PayloadError> {
    let matches = expected.len() == body.len()
        && expected.iter().zip(body).all(|(kind, value)| value.kind() == *kind);
    if matches {
        return Ok(());
    }

    let expected: String = expected.iter().map(ValueKind::signature).collect();
    let found: String = body.iter().map(|value| value.kind().signature()).collect();
    Err(PayloadError::Signature {
        event: event.to_string(),
        expected: format!("({})", expected),
        found: format!("({})", found),
    })
}
