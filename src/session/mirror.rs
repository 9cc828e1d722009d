//! Persisted mirror of the session status and user record.
//!
//! Both keys are written together and cleared together. Anything else found in
//! the storage area (one key without the other, a flag other than `"true"`, a
//! user record that is not valid JSON) is treated as corrupt.

use super::types::UserRecord;
use crate::storage::{SessionStorage, StorageError, StorageEvent};
use std::sync::{Arc, Mutex, PoisonError};

pub const KEY_IS_AUTHENTICATED: &str = "isAuthenticated";
pub const KEY_USER: &str = "user";

const AUTHENTICATED_FLAG: &str = "true";

/// What the mirror currently holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MirrorSnapshot {
    Absent,
    Present(UserRecord),
    Corrupt,
}

/// Handle over the mirror keys of one storage area. Reads and writes made through
/// the same handle never observe each other half-done.
#[derive(Clone)]
pub struct PersistedMirror {
    storage: Arc<dyn SessionStorage>,
    lock: Arc<Mutex<()>>,
}

impl PersistedMirror {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn read(&self) -> MirrorSnapshot {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let flag = self.storage.get_item(KEY_IS_AUTHENTICATED);
        let user = self.storage.get_item(KEY_USER);

        match (flag, user) {
            (None, None) => MirrorSnapshot::Absent,
            (Some(flag), Some(user)) if flag == AUTHENTICATED_FLAG => {
                serde_json::from_str::<UserRecord>(&user)
                    .map_or(MirrorSnapshot::Corrupt, MirrorSnapshot::Present)
            }
            _ => MirrorSnapshot::Corrupt,
        }
    }

    /// Writes both keys. The user is encoded first so a failure leaves the area
    /// untouched, and a failed second write rolls the first one back.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if encoding or either write fails.
    pub fn write(&self, user: &UserRecord) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(user)?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.storage.set_item(KEY_IS_AUTHENTICATED, AUTHENTICATED_FLAG)?;
        if let Err(err) = self.storage.set_item(KEY_USER, &encoded) {
            let _ = self.storage.remove_item(KEY_IS_AUTHENTICATED);
            return Err(err);
        }
        Ok(())
    }

    /// Removes both keys, attempting the second even if the first fails.
    ///
    /// # Errors
    /// Returns the first [`StorageError`] encountered.
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let flag = self.storage.remove_item(KEY_IS_AUTHENTICATED);
        let user = self.storage.remove_item(KEY_USER);
        flag.and(user)
    }

    /// True when a storage event could have changed the mirror.
    #[must_use]
    pub fn is_affected_by(event: &StorageEvent) -> bool {
        event.touches(KEY_IS_AUTHENTICATED) || event.touches(KEY_USER)
    }
}
