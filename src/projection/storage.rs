use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

const EVENT_BUFFER: usize = 64;

/// What a subscriber learns about a write made by another context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    Key(String),
    /// Notifications were dropped; every key should be treated as changed.
    Missed(u64),
}

#[derive(Debug, Clone)]
struct StorageEvent {
    key: String,
    origin: u64,
}

/// Change feed for one context. Writes made through the same context are
/// not reported back to it.
pub struct Subscription {
    receiver: broadcast::Receiver<StorageEvent>,
    context: u64,
}

impl Subscription {
    /// Next change made elsewhere, or `None` once the storage is gone.
    pub async fn changed(&mut self) -> Option<StorageChange> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.context => continue,
                Ok(event) => return Some(StorageChange::Key(event.key)),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Storage notifications lagged");
                    return Some(StorageChange::Missed(missed));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// Persistent string storage shared by several independent contexts.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn subscribe(&self) -> Subscription;
}

struct Shared {
    data: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
    contexts: AtomicU64,
}

/// In-process storage. Clones belong to the same context; [`MemoryStore::open_context`]
/// hands out a new one over the same data, the way a second window shares
/// its browser profile.
#[derive(Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
    context: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            shared: Arc::new(Shared {
                data: RwLock::new(HashMap::new()),
                events,
                contexts: AtomicU64::new(1),
            }),
            context: 0,
        }
    }

    pub fn open_context(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            context: self.shared.contexts.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn notify(&self, key: &str) {
        // No receivers is fine: nobody else is looking.
        let _ = self.shared.events.send(StorageEvent {
            key: key.to_string(),
            origin: self.context,
        });
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let data = self.shared.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let changed = {
            let mut data = self.shared.data.write().unwrap_or_else(PoisonError::into_inner);
            data.insert(key.to_string(), value.clone()).as_ref() != Some(&value)
        };
        if changed {
            self.notify(key);
        }
    }

    fn remove(&self, key: &str) {
        let removed = {
            let mut data = self.shared.data.write().unwrap_or_else(PoisonError::into_inner);
            data.remove(key).is_some()
        };
        if removed {
            self.notify(key);
        }
    }

    fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.shared.events.subscribe(),
            context: self.context,
        }
    }
}
