/// Notification channels.
///
/// A channel is an ordered list of listeners. Listeners fire synchronously in
/// registration order. Each notification iterates a snapshot of the list, so
/// a listener that subscribes or unsubscribes while a notification is running
/// only affects later notifications.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use relaylog_report::ExceptionNode;
use tracing::debug;

use crate::error::FacadeError;

/// Listener for logged exceptions: the exception and its rendered report.
pub type ExceptionListener = dyn Fn(&ExceptionNode, &str) -> anyhow::Result<()> + Send + Sync;

/// Listener for logged error messages.
pub type ErrorListener = dyn Fn(&str) -> anyhow::Result<()> + Send + Sync;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

type Entry<F> = (SubscriptionId, Arc<F>);

/// Thread-safe ordered listener list.
pub struct Channel<F: ?Sized> {
    name: &'static str,
    listeners: RwLock<Vec<Entry<F>>>,
}

impl<F: ?Sized> Channel<F> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append a listener. It fires after every listener registered before it.
    pub fn subscribe(&self, listener: Arc<F>) -> SubscriptionId {
        let id = SubscriptionId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        debug!(channel = self.name, ?id, "Listener subscribed");
        id
    }

    /// Remove a listener. Returns `false` if `id` was not registered here.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(entry_id, _)| *entry_id != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(channel = self.name, ?id, "Listener unsubscribed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Listeners in registration order, as of now.
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    /// Invoke every listener in the snapshot with `call`, stopping at the
    /// first failure.
    pub fn notify_with<C>(&self, mut call: C) -> Result<(), FacadeError>
    where
        C: FnMut(&F) -> anyhow::Result<()>,
    {
        for (index, listener) in self.snapshot().iter().enumerate() {
            call(listener.as_ref()).map_err(|source| FacadeError::Listener {
                channel: self.name,
                index,
                source,
            })?;
        }
        Ok(())
    }
}

impl Channel<ExceptionListener> {
    pub fn notify(&self, exception: &ExceptionNode, text: &str) -> Result<(), FacadeError> {
        self.notify_with(|listener| listener(exception, text))
    }
}

impl Channel<ErrorListener> {
    pub fn notify(&self, message: &str) -> Result<(), FacadeError> {
        self.notify_with(|listener| listener(message))
    }
}

impl<F: ?Sized> std::fmt::Debug for Channel<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("listeners", &self.len())
            .finish()
    }
}
