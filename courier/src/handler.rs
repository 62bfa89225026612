//! Handler traits and the type erasure that lets the registry store them.
//!
//! The typed traits use native `async fn`-style signatures for zero-cost
//! static dispatch; [`DynHandler`] is the object-safe form the registry and
//! router work with, bridged by per-kind adapters that downcast the erased
//! payload back to the concrete message type.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use courier_core::{AnyMessage, BoxError, Command, Event, MessageKind, TypeIdentity};
use thiserror::Error;

use crate::shutdown::ShutdownToken;

/// Boxed future returned by type-erased handler invocations.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + 'a>>;

/// Processes a command routed to it.
///
/// A command type has **exactly one** handler; that cardinality is enforced
/// when the registry is built, never here.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle commands of type `{C}`",
    label = "missing `HandleCommand<{C}>` implementation"
)]
pub trait HandleCommand<C: Command>: Send + Sync + 'static {
    /// Process one command.
    ///
    /// `shutdown` enables participation in cooperative cancellation; long
    /// running handlers should observe it at their checkpoints.
    fn handle(
        &self,
        command: C,
        shutdown: ShutdownToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Processes an event routed to it.
///
/// Event handlers may be invoked concurrently with logically unrelated
/// handlers of the same fan-out; implementations must tolerate that.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle events of type `{E}`",
    label = "missing `HandleEvent<{E}>` implementation"
)]
pub trait HandleEvent<E: Event>: Send + Sync + 'static {
    /// Process one event.
    fn handle(
        &self,
        event: E,
        shutdown: ShutdownToken,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// A routed payload did not match the handler's message type.
///
/// Registry construction verifies every resolved instance against its
/// binding, so this is unreachable through normal dispatch; it exists so a
/// miswired [`DynHandler`] reports instead of panicking.
#[derive(Debug, Error)]
#[error("handler `{handler}` received a `{received}` payload, expected `{expected}`")]
pub struct PayloadMismatch {
    /// The handler type that was invoked.
    pub handler: TypeIdentity,
    /// The message type the handler accepts.
    pub expected: TypeIdentity,
    /// The message type actually routed.
    pub received: TypeIdentity,
}

/// Object-safe, type-erased handler stored by the registry.
///
/// Any [`HandleCommand`]/[`HandleEvent`] implementation becomes a
/// `DynHandler` through [`CommandHandlerAdapter`]/[`EventHandlerAdapter`].
pub trait DynHandler: Send + Sync + 'static {
    /// Identity of the handler type itself.
    fn identity(&self) -> TypeIdentity;

    /// Identity of the message type this handler accepts.
    fn subject(&self) -> TypeIdentity;

    /// Which kind of message this handler accepts.
    fn kind(&self) -> MessageKind;

    /// Invoke the handler with an erased payload.
    fn invoke<'a>(&'a self, message: &'a AnyMessage, shutdown: ShutdownToken) -> HandlerFuture<'a>;
}

/// Adapts a typed [`HandleCommand`] implementation to [`DynHandler`].
pub struct CommandHandlerAdapter<C, H> {
    inner: H,
    _phantom: PhantomData<fn(C)>,
}

impl<C, H> CommandHandlerAdapter<C, H>
where
    C: Command + Clone,
    H: HandleCommand<C>,
{
    /// Wrap a typed handler.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            _phantom: PhantomData,
        }
    }

    /// Wrap a typed handler and share it.
    pub fn shared(inner: H) -> Arc<dyn DynHandler> {
        Arc::new(Self::new(inner))
    }
}

impl<C, H> DynHandler for CommandHandlerAdapter<C, H>
where
    C: Command + Clone,
    H: HandleCommand<C>,
{
    fn identity(&self) -> TypeIdentity {
        TypeIdentity::of::<H>()
    }

    fn subject(&self) -> TypeIdentity {
        TypeIdentity::of::<C>()
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Command
    }

    fn invoke<'a>(&'a self, message: &'a AnyMessage, shutdown: ShutdownToken) -> HandlerFuture<'a> {
        Box::pin(async move {
            let Some(command) = message.downcast_ref::<C>() else {
                return Err(PayloadMismatch {
                    handler: self.identity(),
                    expected: self.subject(),
                    received: message.identity(),
                }
                .into());
            };
            self.inner.handle(command.clone(), shutdown).await
        })
    }
}

/// Adapts a typed [`HandleEvent`] implementation to [`DynHandler`].
pub struct EventHandlerAdapter<E, H> {
    inner: H,
    _phantom: PhantomData<fn(E)>,
}

impl<E, H> EventHandlerAdapter<E, H>
where
    E: Event + Clone,
    H: HandleEvent<E>,
{
    /// Wrap a typed handler.
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            _phantom: PhantomData,
        }
    }

    /// Wrap a typed handler and share it.
    pub fn shared(inner: H) -> Arc<dyn DynHandler> {
        Arc::new(Self::new(inner))
    }
}

impl<E, H> DynHandler for EventHandlerAdapter<E, H>
where
    E: Event + Clone,
    H: HandleEvent<E>,
{
    fn identity(&self) -> TypeIdentity {
        TypeIdentity::of::<H>()
    }

    fn subject(&self) -> TypeIdentity {
        TypeIdentity::of::<E>()
    }

    fn kind(&self) -> MessageKind {
        MessageKind::Event
    }

    fn invoke<'a>(&'a self, message: &'a AnyMessage, shutdown: ShutdownToken) -> HandlerFuture<'a> {
        Box::pin(async move {
            let Some(event) = message.downcast_ref::<E>() else {
                return Err(PayloadMismatch {
                    handler: self.identity(),
                    expected: self.subject(),
                    received: message.identity(),
                }
                .into());
            };
            self.inner.handle(event.clone(), shutdown).await
        })
    }
}
