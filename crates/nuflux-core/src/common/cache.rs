//! Keyed get-or-compute cache used by the flux and cross-section layers.
//!
//! Each key owns its own slot lock, so distinct keys fill concurrently while a
//! single key is computed at most once. A slot holds either nothing or a
//! complete value.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

#[derive(Debug)]
pub struct OnceCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for OnceCache<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> OnceCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;
        let value = slot.lock().unwrap_or_else(PoisonError::into_inner).clone();
        value
    }

    /// Returns the cached value, computing it on first touch.
    ///
    /// A failed computation leaves the slot empty, so a later call retries.
    pub fn get_or_try_compute<E>(
        &self,
        key: &K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = entry.as_ref() {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(compute()?);
        *entry = Some(Arc::clone(&value));
        Ok(value)
    }

    pub fn len(&self) -> usize {
        let slots: Vec<Slot<V>> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots
            .iter()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
