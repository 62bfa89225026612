//! Test doubles for exercising routing behaviour.
//!
//! These handlers implement both [`HandleCommand`] and [`HandleEvent`] for
//! any matching message type, so one double covers both delivery paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use courier_core::{BoxError, Command, Event};

use crate::handler::{HandleCommand, HandleEvent};
use crate::shutdown::ShutdownToken;

/// A handler that records every message it receives.
///
/// Clones share the underlying store, so keep one clone outside the
/// resolver to inspect what was routed.
pub struct RecordingHandler<M> {
    received: Arc<Mutex<Vec<M>>>,
}

impl<M> RecordingHandler<M> {
    /// A new handler with an empty store.
    pub fn new() -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of the recorded messages.
    pub fn received(&self) -> Vec<M>
    where
        M: Clone,
    {
        self.received.lock().unwrap().clone()
    }

    /// Number of recorded messages.
    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl<M> Default for RecordingHandler<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for RecordingHandler<M> {
    fn clone(&self) -> Self {
        Self {
            received: Arc::clone(&self.received),
        }
    }
}

impl<C: Command + Clone> HandleCommand<C> for RecordingHandler<C> {
    async fn handle(&self, command: C, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        self.received.lock().unwrap().push(command);
        Ok(())
    }
}

impl<E: Event + Clone> HandleEvent<E> for RecordingHandler<E> {
    async fn handle(&self, event: E, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        self.received.lock().unwrap().push(event);
        Ok(())
    }
}

/// A handler that counts invocations and succeeds.
pub struct CountingHandler {
    invocations: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// A counting handler over the given shared counter.
    pub fn new(invocations: Arc<AtomicUsize>) -> Self {
        Self { invocations }
    }

    /// How many times this handler has run.
    pub fn count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

impl<C: Command + Clone> HandleCommand<C> for CountingHandler {
    async fn handle(&self, _command: C, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl<E: Event + Clone> HandleEvent<E> for CountingHandler {
    async fn handle(&self, _event: E, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A handler that always fails with the given message.
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// A failing handler reporting `message` as its fault.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<C: Command + Clone> HandleCommand<C> for FailingHandler {
    async fn handle(&self, _command: C, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}

impl<E: Event + Clone> HandleEvent<E> for FailingHandler {
    async fn handle(&self, _event: E, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}

/// A handler that never completes on its own.
///
/// Ignores the shutdown token entirely; useful for proving that the router
/// unblocks joins on cancellation without handler cooperation.
pub struct PendingHandler;

impl<C: Command + Clone> HandleCommand<C> for PendingHandler {
    async fn handle(&self, _command: C, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

impl<E: Event + Clone> HandleEvent<E> for PendingHandler {
    async fn handle(&self, _event: E, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// A handler that sleeps before counting an invocation, for join-ordering
/// assertions.
pub struct SlowHandler {
    delay: Duration,
    invocations: Arc<AtomicUsize>,
}

impl SlowHandler {
    /// A slow handler that records into the given shared counter.
    pub fn new(delay: Duration, invocations: Arc<AtomicUsize>) -> Self {
        Self { delay, invocations }
    }
}

impl<C: Command + Clone> HandleCommand<C> for SlowHandler {
    async fn handle(&self, _command: C, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        tokio::time::sleep(self.delay).await;
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl<E: Event + Clone> HandleEvent<E> for SlowHandler {
    async fn handle(&self, _event: E, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        tokio::time::sleep(self.delay).await;
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
