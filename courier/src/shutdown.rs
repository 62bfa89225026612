//! Cooperative shutdown signalling between a router and its handlers.
//!
//! Built on a `tokio::sync::watch` channel: the router owns the
//! [`ShutdownSignal`] and hands a [`ShutdownToken`] to every handler
//! invocation. Cancellation is cooperative — handlers observe the token at
//! their own checkpoints — but the router additionally races every
//! invocation against the token so a non-cooperative handler can never
//! stall a pending join.

use tokio::sync::watch;

/// Owner side of the shutdown channel.
///
/// Dropping the signal counts as shutdown for all outstanding tokens.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl ShutdownSignal {
    /// A fresh, un-triggered signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A token observing this signal.
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Raise the shutdown signal.
    ///
    /// Idempotent; tokens that already observed shutdown are unaffected.
    pub fn shutdown(&self) {
        // send only fails when every receiver is gone, which is harmless here
        let _ = self.tx.send(true);
    }

    /// Whether shutdown has been raised.
    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of the shutdown channel, cloned into each invocation.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Non-blocking check, for handlers polling at their own checkpoints.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is signalled (or the signal is dropped).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
