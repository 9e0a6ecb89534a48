use crate::types::{PusherError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// How a pending request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The answering side supplied a value
    Resolved(T),
    /// The timer (or a teardown) fired first
    Expired,
}

/// Waitable side of a registered request.
///
/// Exactly one of [`CorrelationRegistry::resolve`] or [`CorrelationRegistry::expire`] completes
/// it. If the registry entry is dropped without either (registry dropped), the wait reports
/// [`Resolution::Expired`].
#[derive(Debug)]
pub struct PendingHandle<T> {
    key: String,
    receiver: oneshot::Receiver<Resolution<T>>,
}

impl<T> PendingHandle<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Suspends the current task until the request is resolved or expired.
    pub async fn wait(self) -> Resolution<T> {
        self.receiver.await.unwrap_or(Resolution::Expired)
    }

    /// Blocks the current thread until the request is resolved or expired.
    ///
    /// Must not be called from inside an async runtime worker thread.
    pub fn wait_blocking(self) -> Resolution<T> {
        self.receiver.blocking_recv().unwrap_or(Resolution::Expired)
    }
}

/// Maps in-flight cross-boundary requests to their one-shot resolvers.
///
/// Every operation runs under a single registry-wide lock, so register/resolve/expire are
/// linearizable. The lock is never held while a resolver is completed or while anyone waits.
#[derive(Debug)]
pub struct CorrelationRegistry<T> {
    pending: Mutex<HashMap<String, oneshot::Sender<Resolution<T>>>>,
}

impl<T> CorrelationRegistry<T> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a pending request under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::DuplicateKey`] if `key` is already pending. The existing entry is
    /// left untouched.
    pub fn register(&self, key: impl Into<String>) -> Result<PendingHandle<T>> {
        let key = key.into();
        let mut pending = self.pending.lock();

        if pending.contains_key(&key) {
            return Err(PusherError::DuplicateKey(key));
        }

        let (tx, rx) = oneshot::channel();
        pending.insert(key.clone(), tx);

        Ok(PendingHandle { key, receiver: rx })
    }

    /// Completes the request under `key` with `value`.
    ///
    /// Returns `false` if nothing was pending under `key` (already resolved or expired).
    pub fn resolve(&self, key: &str, value: T) -> bool {
        self.complete(key, Resolution::Resolved(value))
    }

    /// Completes the request under `key` with [`Resolution::Expired`], if still pending.
    pub fn expire(&self, key: &str) -> bool {
        self.complete(key, Resolution::Expired)
    }

    /// Expires every pending request. Returns how many were expired.
    pub fn expire_all(&self) -> usize {
        let drained: Vec<_> = self.pending.lock().drain().collect();
        let count = drained.len();

        for (key, tx) in drained {
            if tx.send(Resolution::Expired).is_err() {
                tracing::debug!("Waiter for {} already gone", key);
            }
        }

        count
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pending.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    fn complete(&self, key: &str, resolution: Resolution<T>) -> bool {
        let Some(tx) = self.pending.lock().remove(key) else {
            return false;
        };

        if tx.send(resolution).is_err() {
            tracing::debug!("Waiter for {} already gone", key);
        }
        true
    }
}

impl<T> Default for CorrelationRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
