//! Request lifetimes tied to a view.
//!
//! A view that fetches data owns a [`RequestScope`]. When the view goes away
//! the scope is dropped, every task it spawned is aborted, and any `run`
//! still waiting resolves to [`ZtmfError::Cancelled`], so no late response
//! is applied to state that no longer exists.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::error::ZtmfError;

#[derive(Debug)]
pub struct RequestScope {
    cancel_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            cancel_tx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Run `fut` as a task owned by this scope. Must be called from within
    /// a tokio runtime.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = tokio::spawn(fut);
        if self.is_cancelled() {
            handle.abort();
        } else {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            tasks.retain(|t| !t.is_finished());
            tasks.push(handle.abort_handle());
        }
        handle
    }

    /// Await `fut` unless the scope is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `ZtmfError::Cancelled` when the scope is cancelled before
    /// `fut` completes, and otherwise whatever `fut` returns.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, ZtmfError>
    where
        F: Future<Output = Result<T, ZtmfError>>,
    {
        let mut rx = self.cancel_tx.subscribe();
        tokio::select! {
            biased;
            _ = rx.wait_for(|cancelled| *cancelled) => Err(ZtmfError::Cancelled),
            out = fut => out,
        }
    }

    /// Abort everything in flight. Later `run` calls fail immediately.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let count = tasks.len();
        for task in tasks.drain(..) {
            task.abort();
        }
        if count > 0 {
            debug!(count, "aborted scoped requests");
        }
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
