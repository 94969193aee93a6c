//! Per-engine-family mutual exclusion.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::debug;

/// Serializes every call of one engine family (text or speech), across all
/// handles. Calls block until the lock is free; there is no timeout.
pub struct SerialGuard {
    family: &'static str,
    lock: Mutex<()>,
}

impl SerialGuard {
    pub fn new(family: &'static str) -> Self {
        Self {
            family,
            lock: Mutex::new(()),
        }
    }

    /// Block until no other call of this family is running.
    ///
    /// A poisoned lock is recovered: the guarded data is `()`, and models
    /// are re-validated by every call anyway.
    pub fn enter(&self) -> MutexGuard<'_, ()> {
        match self.lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!(family = self.family, "Waiting for in-flight call");
                self.lock.lock().unwrap_or_else(PoisonError::into_inner)
            }
        }
    }
}
