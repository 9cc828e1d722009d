use super::{SessionStorage, StorageError, StorageEvent};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// In-memory storage area. Clones share the same area and event stream, the way
/// tabs of one browser session share `sessionStorage`.
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

struct Inner {
    items: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    /// Subscribes to changes made through any clone of this area.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.inner
            .items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: StorageEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let old_value = self.items().insert(key.to_string(), value.to_string());
        if old_value.as_deref() != Some(value) {
            self.notify(StorageEvent {
                key: Some(key.to_string()),
                old_value,
                new_value: Some(value.to_string()),
            });
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let old_value = self.items().remove(key);
        if old_value.is_some() {
            self.notify(StorageEvent {
                key: Some(key.to_string()),
                old_value,
                new_value: None,
            });
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let had_items = {
            let mut items = self.items();
            let had_items = !items.is_empty();
            items.clear();
            had_items
        };
        if had_items {
            self.notify(StorageEvent {
                key: None,
                old_value: None,
                new_value: None,
            });
        }
        Ok(())
    }
}
