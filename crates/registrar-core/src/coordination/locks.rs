//! Keyed mutex registry.
//!
//! One async mutex per key, created on first use and kept for the
//! registry's lifetime. The registry's own guard is held only while
//! fetching or inserting an entry, never while the caller works, so
//! unrelated keys never wait on each other.
//!
//! Entries are never removed. Deleting a lock while another task is about
//! to acquire it would hand the two tasks different mutexes for the same
//! key.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::{collections::HashMap, fmt, hash::Hash, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Exclusive hold on one key. Releases on drop.
pub struct KeyGuard<K> {
    key: K,
    _guard: OwnedMutexGuard<()>,
}

impl<K: Copy> KeyGuard<K> {
    #[must_use]
    pub const fn key(&self) -> K {
        self.key
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyGuard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard").field("key", &self.key).finish()
    }
}

/// Per-key lock manager.
pub struct LockRegistry<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for LockRegistry<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> fmt::Debug for LockRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRegistry").finish_non_exhaustive()
    }
}

impl<K> LockRegistry<K>
where
    K: Eq + Hash + Copy,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    ///
    /// Registry guard: get-or-insert, release. Then await the key's own
    /// mutex.
    pub async fn acquire(&self, key: K) -> KeyGuard<K> {
        let lock = self.lock_for(key).await;
        let guard = lock.lock_owned().await;
        KeyGuard { key, _guard: guard }
    }

    /// Take `key` only if nobody holds it right now.
    pub async fn try_acquire(&self, key: K) -> Option<KeyGuard<K>> {
        let lock = self.lock_for(key).await;
        lock.try_lock_owned()
            .ok()
            .map(|guard| KeyGuard { key, _guard: guard })
    }

    /// Number of keys that have a lock.
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }

    async fn lock_for(&self, key: K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(key).or_default())
    }
}
