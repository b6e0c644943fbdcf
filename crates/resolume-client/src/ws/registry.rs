//! Per-parameter listener registry.
//!
//! Maps a canonical [`ParameterKey`] to the listeners registered for it, in
//! registration order. The registry decides when the server needs to hear
//! about a key: a subscribe when the first listener arrives, an unsubscribe
//! when the last one leaves. An entry is never left behind empty.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use resolume_core::{Action, ParameterKey};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned when a listener is registered; pass it back to remove it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, unique within the process.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

pub(crate) struct ListenerRegistry<L: ?Sized> {
    entries: HashMap<ParameterKey, Vec<(ListenerId, Arc<L>)>>,
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Append a listener. Returns a subscribe action if `key` had none.
    pub(crate) fn insert(
        &mut self,
        key: ParameterKey,
        id: ListenerId,
        listener: Arc<L>,
    ) -> Option<Action> {
        let entry = self.entries.entry(key.clone()).or_default();
        let first = entry.is_empty();
        entry.push((id, listener));
        first.then(|| Action::subscribe(key))
    }

    /// Remove a listener. Returns an unsubscribe action if it was the last
    /// one for `key`. Unknown keys and ids are ignored.
    pub(crate) fn remove(&mut self, key: &ParameterKey, id: ListenerId) -> Option<Action> {
        let entry = self.entries.get_mut(key)?;
        let before = entry.len();
        entry.retain(|(existing, _)| *existing != id);
        if entry.len() == before || !entry.is_empty() {
            return None;
        }
        let _ = self.entries.remove(key);
        Some(Action::unsubscribe(key.clone()))
    }

    /// Snapshot of the listeners for `key`, in registration order.
    pub(crate) fn listeners(&self, key: &ParameterKey) -> Vec<Arc<L>> {
        self.entries
            .get(key)
            .map(|entry| entry.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn contains_key(&self, key: &ParameterKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys with at least one listener.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
