//! Message marker traits and the type-erased message envelope.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::TypeIdentity;

/// A marker trait for command messages.
///
/// Commands are routed to **exactly one** handler and fail fast: a command
/// with zero or with more than one registered handler is an error.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct Deposit { account: u64, amount: i64 }
///
/// impl Command for Deposit {}
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Command",
    label = "must be `Send + Sync + 'static`",
    note = "Command types must be thread-safe and static to cross the routing boundary."
)]
pub trait Command: Send + Sync + 'static {}

/// A marker trait for event messages.
///
/// Events fan out to **zero or many** handlers concurrently; completion is
/// reported only after every handler has reached a terminal state.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Event",
    label = "must be `Send + Sync + 'static`",
    note = "Event types must be thread-safe and static to cross the routing boundary."
)]
pub trait Event: Send + Sync + 'static {}

/// The two kinds of routable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Exactly-one-handler, fail-fast delivery.
    Command,
    /// Zero-or-many handlers, concurrent fan-out, aggregated completion.
    Event,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Command => f.write_str("command"),
            MessageKind::Event => f.write_str("event"),
        }
    }
}

/// A live message instance erased behind its stable type identity.
///
/// The payload is shared, so cloning an `AnyMessage` (for example to hand a
/// copy to every spawned handler invocation) never copies the message
/// itself. Classification of the instance happens by catalog membership of
/// its [`TypeIdentity`], not by downcasting.
#[derive(Clone)]
pub struct AnyMessage {
    identity: TypeIdentity,
    payload: Arc<dyn Any + Send + Sync>,
}

impl AnyMessage {
    /// Erase a message instance, capturing its type identity.
    pub fn new<M: Send + Sync + 'static>(message: M) -> Self {
        Self {
            identity: TypeIdentity::of::<M>(),
            payload: Arc::new(message),
        }
    }

    /// The identity of the erased message type.
    pub fn identity(&self) -> TypeIdentity {
        self.identity
    }

    /// Borrow the payload as a concrete message type.
    ///
    /// Returns `None` if `M` is not the erased type.
    pub fn downcast_ref<M: 'static>(&self) -> Option<&M> {
        self.payload.downcast_ref::<M>()
    }
}

impl fmt::Debug for AnyMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyMessage")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
