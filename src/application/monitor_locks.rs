// Per-monitor mutual exclusion for state-changing operations
use crate::domain::monitor::MonitorId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::OwnedMutexGuard;

type MonitorLock = tokio::sync::Mutex<()>;

/// Serializes every read-check-write sequence on a monitor.
///
/// The table only holds weak handles; an entry lives as long as some caller
/// holds or waits for its lock and is pruned on a later `acquire`.
#[derive(Clone, Default)]
pub struct MonitorLocks {
    inner: Arc<Mutex<HashMap<MonitorId, Weak<MonitorLock>>>>,
}

impl MonitorLocks {
    pub async fn acquire(&self, id: MonitorId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, entry| entry.strong_count() > 0);
            match locks.get(&id).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(MonitorLock::new(()));
                    locks.insert(id, Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_monitor_is_exclusive() {
        let locks = MonitorLocks::default();
        let guard = locks.acquire(1).await;

        let contender = locks.clone();
        let blocked = tokio::time::timeout(Duration::from_millis(50), contender.acquire(1)).await;
        assert!(blocked.is_err());

        // Other monitors are unaffected
        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2)).await;
        assert!(other.is_ok());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = MonitorLocks::default();
        for id in 0..500 {
            drop(locks.acquire(id).await);
        }
        assert_eq!(locks.tracked(), 1);

        let held = locks.acquire(7).await;
        drop(locks.acquire(8).await);
        // 7 is still held, 8 is released but not yet pruned
        assert_eq!(locks.tracked(), 2);
        drop(held);
        drop(locks.acquire(9).await);
        assert_eq!(locks.tracked(), 1);
    }

    #[tokio::test]
    async fn test_waiter_keeps_entry_alive() {
        let locks = MonitorLocks::default();
        let guard = locks.acquire(3).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(3).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Pruning for another id must not split the lock of monitor 3
        drop(locks.acquire(4).await);
        assert!(tokio::time::timeout(Duration::from_millis(20), locks.acquire(3)).await.is_err());

        drop(guard);
        waiter.await.unwrap();
    }
}
