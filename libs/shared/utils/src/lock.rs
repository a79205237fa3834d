use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// Registry of per-key async mutexes. Writers that must not interleave for the
/// same psychologist acquire the same key; different keys never block each other.
#[derive(Clone, Default)]
pub struct ScheduleLocks {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl ScheduleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive ownership of `key`. The lock is released when the
    /// returned guard is dropped.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // Holders and waiters keep a clone; an entry only the map references is idle.
            map.retain(|_, mutex| Arc::strong_count(mutex) > 1);
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        debug!("Waiting for schedule lock {}", key);
        mutex.lock_owned().await
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn availability_key(psychologist_id: &str) -> String {
        format!("availability:{}", psychologist_id)
    }

    pub fn consultation_key(psychologist_id: &str) -> String {
        format!("consultation:{}", psychologist_id)
    }
}
