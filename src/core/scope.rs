//! Request cancellation scopes
//!
//! A view creates one scope per page and runs its requests through it; when
//! the user navigates away the scope is dropped and every pending request
//! resolves to [`ApiError::Cancelled`] instead of updating stale state.
//! Requests already on the wire may still reach the server.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{AbortHandle, AbortRegistration, Abortable};

use crate::core::error::{ApiError, Result};

#[derive(Debug, Default)]
struct ScopeInner {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, AbortHandle>>,
}

impl ScopeInner {
    fn register(&self) -> Option<(u64, AbortRegistration)> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if self.cancelled.load(Ordering::SeqCst) {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (handle, registration) = AbortHandle::new_pair();
        pending.insert(id, handle);
        Some((id, registration))
    }

    fn release(&self, id: u64) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        self.cancelled.store(true, Ordering::SeqCst);
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }
}

/// Removes one request's abort handle from its scope
#[derive(Debug)]
struct PendingGuard {
    inner: Arc<ScopeInner>,
    id: u64,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.inner.release(self.id);
    }
}

/// Cancels its requests when cancelled explicitly or dropped
#[derive(Debug, Default)]
pub struct RequestScope {
    inner: Arc<ScopeInner>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a request so it stops when the scope is cancelled.
    ///
    /// The returned future does not borrow the scope and can be spawned.
    /// Dropping it, polled or not, releases its slot in the scope.
    pub fn run<F, T>(&self, future: F) -> impl Future<Output = Result<T>> + use<F, T>
    where
        F: Future<Output = Result<T>>,
    {
        let slot = self.inner.register().map(|(id, registration)| {
            let guard = PendingGuard {
                inner: Arc::clone(&self.inner),
                id,
            };
            (guard, registration)
        });

        async move {
            let Some((_guard, registration)) = slot else {
                return Err(ApiError::Cancelled);
            };
            Abortable::new(future, registration)
                .await
                .unwrap_or_else(|_| Err(ApiError::Cancelled))
        }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Requests currently running in this scope
    pub fn pending(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.inner.cancel();
    }
}
