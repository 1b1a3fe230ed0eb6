//! Per-key in-flight registry for live-tier calls.
//!
//! Callers for the same key serialize on a shared async mutex, so only the
//! first one reaches the model; the rest find the cache filled when they get
//! the lock. Slots are removed once no caller holds them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::Mutex as AsyncMutex;

use crate::cache::CacheKey;

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl InFlight {
    pub(crate) fn acquire_slot(&self, key: &CacheKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.clone()).or_default().clone()
    }

    /// Hand back a slot from [`acquire_slot`](Self::acquire_slot). The map
    /// entry is dropped when the registry and `slot` are its only owners.
    pub(crate) fn release_slot(&self, key: &CacheKey, slot: Slot) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&slot) == 2 {
            slots.remove(key);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
