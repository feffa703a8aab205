//! Keyed debounce primitive used for auto-save
//!
//! `schedule(key, delay, action)` aborts any action still waiting for the
//! same key and arms a new one. An action that has started running is no
//! longer pending and is never aborted by a later schedule.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

struct PendingAction {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Debounces actions per key
pub struct Debouncer<K> {
    pending: Arc<Mutex<HashMap<K, PendingAction>>>,
    generation: AtomicU64,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
    /// Create an idle debouncer
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Run `action` after `delay` unless another schedule for `key` supersedes it
    pub async fn schedule<F, Fut>(&self, key: K, delay: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().await;
        // taken under the lock so install order matches generation order
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(previous) = pending.remove(&key) {
            previous.handle.abort();
            trace!(key = ?key, "Superseded pending action");
        }

        let registry = Arc::clone(&self.pending);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = registry.lock().await;
                match pending.get(&task_key) {
                    Some(entry) if entry.generation == generation => {
                        pending.remove(&task_key);
                    }
                    _ => return,
                }
            }
            action().await;
        });

        pending.insert(key, PendingAction { generation, handle });
    }

    /// Drop the pending action for `key`; returns whether one was waiting
    pub async fn cancel(&self, key: &K) -> bool {
        match self.pending.lock().await.remove(key) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Number of keys with an action still waiting
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl<K> Default for Debouncer<K>
where
    K: Eq + Hash + Clone + Send + std::fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.try_lock() {
            for (_, entry) in pending.drain() {
                entry.handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type Log = Arc<std::sync::Mutex<Vec<&'static str>>>;

    fn record(log: &Log, value: &'static str) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let log = Arc::clone(log);
        move || {
            log.lock().unwrap().push(value);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_schedule_supersedes_first() {
        let debouncer = Debouncer::new();
        let log = Log::default();

        debouncer.schedule("draft", Duration::from_millis(1000), record(&log, "first")).await;
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.schedule("draft", Duration::from_millis(1000), record(&log, "second")).await;

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(*log.lock().unwrap(), vec!["second"]);
        assert_eq!(debouncer.pending().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_schedules_keep_latest_generation() {
        let debouncer = Arc::new(Debouncer::new());
        let log = Log::default();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let debouncer = Arc::clone(&debouncer);
                let action = record(&log, "saved");
                tokio::spawn(async move {
                    debouncer.schedule("draft", Duration::from_millis(1000), action).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        {
            let pending = debouncer.pending.lock().await;
            assert_eq!(pending.len(), 1);
            assert_eq!(
                pending["draft"].generation,
                debouncer.generation.load(Ordering::SeqCst)
            );
        }

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(*log.lock().unwrap(), vec!["saved"]);
        assert_eq!(debouncer.pending().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_do_not_interfere() {
        let debouncer = Debouncer::new();
        let log = Log::default();

        debouncer.schedule("a", Duration::from_millis(100), record(&log, "a")).await;
        debouncer.schedule("b", Duration::from_millis(100), record(&log, "b")).await;
        assert_eq!(debouncer.pending().await, 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let mut fired = log.lock().unwrap().clone();
        fired.sort();
        assert_eq!(fired, vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_action() {
        let debouncer = Debouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        debouncer
            .schedule(1u32, Duration::from_millis(50), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert!(debouncer.cancel(&1).await);
        assert!(!debouncer.cancel(&1).await);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_after_firing_runs_again() {
        let debouncer = Debouncer::new();
        let log = Log::default();

        debouncer.schedule("k", Duration::from_millis(10), record(&log, "one")).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.schedule("k", Duration::from_millis(10), record(&log, "two")).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
    }
}
