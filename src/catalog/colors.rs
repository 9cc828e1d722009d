use super::{
    client::CatalogClient,
    types::{Filament, FilamentColor, FilamentType},
    CatalogError,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::OnceCell;
use tracing::debug;

type Slot = Arc<OnceCell<Arc<[FilamentColor]>>>;

/// Memoized `/colors` lookups, one fetch per filament type until invalidated.
/// Concurrent callers for the same type share a single request; a failed fetch
/// is not cached.
#[derive(Debug)]
pub struct ColorCache {
    catalog: CatalogClient,
    slots: Mutex<HashMap<FilamentType, Slot>>,
}

impl ColorCache {
    #[must_use]
    pub fn new(catalog: CatalogClient) -> Self {
        Self {
            catalog,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// All colors for `filament_type`, fetched on first use.
    ///
    /// # Errors
    /// Returns the fetch error; the next call retries.
    pub async fn colors(&self, filament_type: FilamentType) -> Result<Arc<[FilamentColor]>, CatalogError> {
        let slot = self.slot(filament_type);
        let colors = slot
            .get_or_try_init(|| async {
                debug!(%filament_type, "Fetching colors");
                self.catalog
                    .colors(filament_type)
                    .await
                    .map(Arc::from)
            })
            .await?;
        Ok(Arc::clone(colors))
    }

    /// Available colors for `filament_type` in the form shape.
    ///
    /// # Errors
    /// Returns the fetch error; the next call retries.
    pub async fn filaments(&self, filament_type: FilamentType) -> Result<Vec<Filament>, CatalogError> {
        let colors = self.colors(filament_type).await?;
        Ok(colors
            .iter()
            .filter(|color| color.available)
            .map(Filament::from)
            .collect())
    }

    /// Drops the cached colors for one type, or all types with `None`.
    pub fn invalidate(&self, filament_type: Option<FilamentType>) {
        let mut slots = self.lock_slots();
        match filament_type {
            Some(filament_type) => {
                slots.remove(&filament_type);
            }
            None => slots.clear(),
        }
    }

    #[must_use]
    pub fn is_cached(&self, filament_type: FilamentType) -> bool {
        self.lock_slots()
            .get(&filament_type)
            .is_some_and(|slot| slot.initialized())
    }

    fn slot(&self, filament_type: FilamentType) -> Slot {
        Arc::clone(self.lock_slots().entry(filament_type).or_default())
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<FilamentType, Slot>> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
