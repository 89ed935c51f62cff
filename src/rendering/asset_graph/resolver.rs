use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use log::trace;

type Slot<T> = Arc<Mutex<Option<Arc<T>>>>;

/// Deduplicates loads by name. Every entry carries its own lock, whoever holds it is the only one
/// generating that entry while concurrent requesters for the same name block and then reuse the
/// result. Entries are never evicted.
pub struct Resolver<T> {
    ref_cache: DashMap<String, Slot<T>>,
}

impl<T> Resolver<T> {
    pub fn new() -> Self {
        Self {
            ref_cache: DashMap::with_capacity(100),
        }
    }

    fn slot(&self, name: &str) -> Slot<T> {
        if let Some(slot) = self.ref_cache.get(name) {
            return Arc::clone(slot.value());
        }

        // The shard lock is released at the end of the statement, the generator must not run under it
        Arc::clone(self.ref_cache.entry(name.to_owned()).or_default().value())
    }

    /// Returns the cached value or runs `generate` while holding the entry's lock. Errors and
    /// `Ok(None)` leave the entry empty, so the next request generates again.
    pub fn resolve<E, F>(&self, name: &str, generate: F) -> Result<Option<Arc<T>>, E>
    where
        F: FnOnce() -> Result<Option<T>, E>,
    {
        let slot = self.slot(name);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(arc) = guard.as_ref() {
            trace!("Cache hit for {}", name);
            return Ok(Some(arc.clone()));
        }

        match generate()? {
            Some(value) => {
                let arc = Arc::new(value);
                *guard = Some(arc.clone());
                Ok(Some(arc))
            }
            None => Ok(None),
        }
    }

    /// For values that were already produced elsewhere. An existing entry wins over `generate`.
    pub fn get_or_insert_with<F: FnOnce() -> T>(&self, name: &str, generate: F) -> Arc<T> {
        let slot = self.slot(name);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get_or_insert_with(|| Arc::new(generate())).clone()
    }

    /// The cached value, without generating or waiting for an in-flight generation.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        let slot = Arc::clone(self.ref_cache.get(name)?.value());
        let guard = slot.try_lock().ok()?;
        guard.clone()
    }

    /// Number of successfully generated entries.
    pub fn len(&self) -> usize {
        self.ref_cache
            .iter()
            .filter(|entry| matches!(entry.value().try_lock(), Ok(guard) if guard.is_some()))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for Resolver<T> {
    fn default() -> Self {
        Self::new()
    }
}
