//! Reactive tri-state wrapper around a keyed async lookup.
//!
//! An [`AsyncLookup`] owns one lookup function and publishes its latest
//! [`LookupResult`] over a `tokio::sync::watch` channel. Every key change
//! dispatches a new lookup tagged with a generation token; a settled lookup
//! is published only if its token is still the current one and the hook has
//! not been dropped.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;

use crate::error::{MetaError, Result};

/// Boxed lookup function shared by a hook and its in-flight tasks.
pub type LookupFn<T> = Arc<dyn Fn(String) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Current state of a lookup.
#[derive(Debug, Clone)]
pub enum LookupResult<T> {
    /// Lookup in flight (or not yet started)
    Pending,
    /// Lookup resolved
    Ready(T),
    /// Lookup failed; the error is the one the lookup returned
    Failed(Arc<MetaError>),
}

impl<T> LookupResult<T> {
    /// Check if the lookup is still in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupResult::Pending)
    }

    /// Check if the lookup reached a terminal state.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    /// Get the failure, if any.
    pub fn error(&self) -> Option<&MetaError> {
        match self {
            LookupResult::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Get the resolved value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            LookupResult::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Take the resolved value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            LookupResult::Ready(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> Default for LookupResult<T> {
    fn default() -> Self {
        LookupResult::Pending
    }
}

struct Shared<T> {
    tx: watch::Sender<LookupResult<T>>,
    /// Token of the most recent dispatch. Only written under the watch lock.
    current: AtomicU64,
    /// Set on drop. Covers a task that upgraded its weak handle just before
    /// the hook went away.
    disposed: AtomicBool,
}

impl<T> Shared<T> {
    fn settle(&self, token: u64, outcome: Result<T>) {
        self.tx.send_if_modified(|state| {
            if self.disposed.load(Ordering::Acquire) || self.current.load(Ordering::Acquire) != token
            {
                return false;
            }
            *state = match outcome {
                Ok(value) => LookupResult::Ready(value),
                Err(e) => LookupResult::Failed(Arc::new(e)),
            };
            true
        });
    }
}

/// A keyed async lookup exposed as a reactive [`LookupResult`].
///
/// Must be driven from within a tokio runtime: each dispatch spawns a task.
pub struct AsyncLookup<T> {
    shared: Arc<Shared<T>>,
    lookup: LookupFn<T>,
    key: Option<String>,
    next_token: u64,
}

impl<T> AsyncLookup<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a hook around `lookup`. Nothing runs until [`use_key`](Self::use_key).
    pub fn new<F, Fut>(lookup: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, _rx) = watch::channel(LookupResult::Pending);

        Self {
            shared: Arc::new(Shared {
                tx,
                current: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
            lookup: boxed(lookup),
            key: None,
            next_token: 0,
        }
    }

    /// Request the result for `key`.
    ///
    /// A new key restarts the lookup and resets the result to
    /// [`LookupResult::Pending`]. The same key returns the current result
    /// without dispatching again.
    pub fn use_key(&mut self, key: &str) -> LookupResult<T> {
        if self.key.as_deref() != Some(key) {
            self.key = Some(key.to_string());
            self.dispatch();
        }
        self.current()
    }

    /// Swap the lookup function. The current key, if any, is looked up again.
    pub fn set_lookup<F, Fut>(&mut self, lookup: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.lookup = boxed(lookup);
        self.dispatch();
    }

    /// Key of the most recent request.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Snapshot of the current result.
    pub fn current(&self) -> LookupResult<T> {
        self.shared.tx.borrow().clone()
    }

    /// Subscribe to result changes.
    ///
    /// The channel closes when the hook is dropped.
    pub fn subscribe(&self) -> watch::Receiver<LookupResult<T>> {
        self.shared.tx.subscribe()
    }

    /// Wait until the current request settles.
    ///
    /// Never resolves if no key was ever requested.
    pub async fn settled(&self) -> LookupResult<T> {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(LookupResult::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.current(),
        };
        settled
    }

    fn dispatch(&mut self) {
        let Some(key) = self.key.clone() else {
            return;
        };

        self.next_token += 1;
        let token = self.next_token;

        let shared = &self.shared;
        shared.tx.send_if_modified(|state| {
            shared.current.store(token, Ordering::Release);
            let changed = !state.is_loading();
            *state = LookupResult::Pending;
            changed
        });

        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        let lookup = (self.lookup)(key);
        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(lookup).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => Err(MetaError::lookup(panic_message(panic.as_ref()))),
            };
            if let Some(shared) = weak.upgrade() {
                shared.settle(token, outcome);
            }
        });
    }
}

impl<T> Drop for AsyncLookup<T> {
    fn drop(&mut self) {
        self.shared.disposed.store(true, Ordering::Release);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("lookup panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("lookup panicked: {}", message)
    } else {
        "lookup panicked".to_string()
    }
}

fn boxed<T, F, Fut>(lookup: F) -> LookupFn<T>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move |key| lookup(key).boxed())
}
