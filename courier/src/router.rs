//! The dispatch engine.
//!
//! `MessageRouter` resolves a live message against the registry and
//! executes the matched handler(s) as independently scheduled tasks:
//! exactly one invocation for a command, a concurrent fan-out joined in
//! full for an event. Exactly one of the two continuations runs per routed
//! message, and only after every invocation has reached a terminal state.

use std::sync::Arc;

use courier_core::{AnyMessage, BoxError, MessageKind, TypeIdentity};
use futures::future::join_all;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::handler::DynHandler;
use crate::registry::HandlerRegistry;
use crate::shutdown::{ShutdownSignal, ShutdownToken};

/// One captured failure from a routed message.
///
/// Dispatch-time failures are always recovered locally and reported through
/// the error continuation; the router never lets a handler fault escape a
/// `route` call.
#[derive(Debug, Error)]
pub enum RouteFailure {
    /// The instance's type is absent from both message sets of the catalog.
    #[error("message type `{message}` is not present in any scanned catalog")]
    UnclassifiedMessageType {
        /// The unrecognised message type.
        message: TypeIdentity,
    },

    /// A command was routed with no handler bound to its type.
    #[error("no handler is registered for command `{command}`")]
    NoHandlerForCommand {
        /// The unhandled command type.
        command: TypeIdentity,
    },

    /// A handler invocation returned an error or panicked.
    #[error("handler `{handler}` failed")]
    HandlerExecution {
        /// The failing handler type.
        handler: TypeIdentity,
        /// The captured fault.
        #[source]
        source: BoxError,
    },

    /// The invocation was aborted by cooperative shutdown.
    ///
    /// Reported distinctly from [`RouteFailure::HandlerExecution`] so
    /// callers can tell "handler misbehaved" from "system is shutting
    /// down".
    #[error("invocation aborted by cooperative shutdown")]
    Cancelled,
}

impl RouteFailure {
    /// True for the cancellation kind.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RouteFailure::Cancelled)
    }
}

/// Terminal state of a single handler invocation.
enum Invocation {
    Completed,
    Failed {
        handler: TypeIdentity,
        source: BoxError,
    },
    Cancelled,
}

/// Routes messages to their registered handlers.
///
/// Owns the shutdown signal for its invocations; the registry is shared and
/// read-only for the router's lifetime.
pub struct MessageRouter {
    registry: Arc<HandlerRegistry>,
    shutdown: ShutdownSignal,
}

impl MessageRouter {
    /// A router over the given registry.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self::with_shared(Arc::new(registry))
    }

    /// A router over an already-shared registry.
    pub fn with_shared(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Raise cooperative shutdown for every outstanding invocation.
    ///
    /// Pending `route` calls resolve through their error continuation with
    /// a cancellation-kind failure; none are silently dropped.
    pub fn shutdown(&self) {
        info!("router shutdown requested");
        self.shutdown.shutdown();
    }

    /// A token observing this router's shutdown signal.
    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.token()
    }

    /// Route a message, reporting the outcome through exactly one of the
    /// two continuations.
    ///
    /// For an event with several handlers, neither continuation runs until
    /// every invocation has reached a terminal state. Handler work may be
    /// scheduled concurrently; callers must not assume in-line execution.
    pub async fn route<C, F>(&self, message: AnyMessage, on_complete: C, on_error: F)
    where
        C: FnOnce() + Send,
        F: FnOnce(AnyMessage, Vec<RouteFailure>) + Send,
    {
        match self.dispatch(&message).await {
            Ok(()) => on_complete(),
            Err(failures) => {
                warn!(
                    message = %message.identity(),
                    failures = failures.len(),
                    "routing failed"
                );
                on_error(message, failures);
            }
        }
    }

    /// `Result`-shaped twin of [`route`](Self::route).
    ///
    /// `Ok(())` corresponds to the completion continuation, `Err` to the
    /// error continuation.
    pub async fn dispatch(&self, message: &AnyMessage) -> Result<(), Vec<RouteFailure>> {
        let identity = message.identity();
        match self.registry.kind_of(&identity) {
            None => Err(vec![RouteFailure::UnclassifiedMessageType { message: identity }]),
            Some(MessageKind::Command) => self.dispatch_command(message).await,
            Some(MessageKind::Event) => self.dispatch_event(message).await,
        }
    }

    async fn dispatch_command(&self, message: &AnyMessage) -> Result<(), Vec<RouteFailure>> {
        let command = message.identity();
        let Some(handler) = self.registry.command_handler(&command) else {
            return Err(vec![RouteFailure::NoHandlerForCommand { command }]);
        };
        debug!(command = %command, handler = %handler.identity(), "dispatching command");

        let identity = handler.identity();
        let task = self.spawn_invocation(Arc::clone(handler), message.clone());
        match join_invocation(identity, task).await {
            Invocation::Completed => Ok(()),
            Invocation::Failed { handler, source } => {
                Err(vec![RouteFailure::HandlerExecution { handler, source }])
            }
            Invocation::Cancelled => Err(vec![RouteFailure::Cancelled]),
        }
    }

    async fn dispatch_event(&self, message: &AnyMessage) -> Result<(), Vec<RouteFailure>> {
        let event = message.identity();
        let handlers = self.registry.event_handlers(&event);
        if handlers.is_empty() {
            // zero handlers for an event is a valid, silently accepted no-op
            debug!(event = %event, "no handlers registered; completing");
            return Ok(());
        }
        debug!(event = %event, handlers = handlers.len(), "fanning out event");

        let tasks: Vec<(TypeIdentity, JoinHandle<Invocation>)> = handlers
            .iter()
            .map(|handler| {
                (
                    handler.identity(),
                    self.spawn_invocation(Arc::clone(handler), message.clone()),
                )
            })
            .collect();

        // join every invocation before touching either continuation
        let outcomes = join_all(
            tasks
                .into_iter()
                .map(|(identity, task)| join_invocation(identity, task)),
        )
        .await;

        let mut failures = Vec::new();
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                Invocation::Completed => {}
                Invocation::Failed { handler, source } => {
                    failures.push(RouteFailure::HandlerExecution { handler, source });
                }
                Invocation::Cancelled => cancelled = true,
            }
        }

        if cancelled {
            // cancelled invocations are neither success nor failure; the
            // route resolves with the cancellation kind alone
            return Err(vec![RouteFailure::Cancelled]);
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }

    /// Schedule one handler invocation as an independent unit of work,
    /// racing it against the shutdown token so a non-cooperative handler
    /// can never stall the join.
    fn spawn_invocation(
        &self,
        handler: Arc<dyn DynHandler>,
        message: AnyMessage,
    ) -> JoinHandle<Invocation> {
        let token = self.shutdown.token();
        tokio::spawn(async move {
            let watch = token.clone();
            tokio::select! {
                () = watch.cancelled() => Invocation::Cancelled,
                result = handler.invoke(&message, token) => match result {
                    Ok(()) => Invocation::Completed,
                    Err(source) => Invocation::Failed {
                        handler: handler.identity(),
                        source,
                    },
                },
            }
        })
    }
}

async fn join_invocation(handler: TypeIdentity, task: JoinHandle<Invocation>) -> Invocation {
    match task.await {
        Ok(outcome) => outcome,
        Err(error) if error.is_cancelled() => Invocation::Cancelled,
        Err(error) => Invocation::Failed {
            handler,
            source: panic_error(error),
        },
    }
}

/// Convert a task panic into a reportable fault, preserving the message.
fn panic_error(error: JoinError) -> BoxError {
    match error.try_into_panic() {
        Ok(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "handler panicked".to_string());
            message.into()
        }
        Err(error) => error.into(),
    }
}
