//! Pure classification predicates over [`TypeDescriptor`]s.
//!
//! Every function here is a stateless function of its arguments: no I/O, no
//! shared state, safe to call from any thread. Predicates that can observe
//! an ambiguous declaration return `Result` and fail closed — the catalog
//! must never silently pick one of several structural matches.

use crate::descriptor::{Capability, TypeDescriptor, TypeFlags, TypeIdentity};
use crate::error::ClassifyError;
use crate::message::MessageKind;

/// True iff the described type is instantiable: not an abstract marker, and
/// if generic, fully instantiated. An unbound generic template is never
/// concrete.
pub fn is_concrete(descriptor: &TypeDescriptor) -> bool {
    let flags = descriptor.flags();
    if flags.contains(TypeFlags::ABSTRACT) {
        return false;
    }
    !(flags.contains(TypeFlags::GENERIC) && flags.contains(TypeFlags::UNBOUND))
}

/// True iff the type declares `capability` exactly as requested.
///
/// This is a **strict** match: for handler capabilities the instantiated
/// message type must be equal, never merely assignable.
pub fn has_capability(descriptor: &TypeDescriptor, capability: &Capability) -> bool {
    descriptor.capabilities().iter().any(|declared| declared == capability)
}

/// True iff the type declares the command marker exactly once.
pub fn is_command(descriptor: &TypeDescriptor) -> Result<bool, ClassifyError> {
    declared_once(descriptor, "Command", |c| matches!(c, Capability::Command))
}

/// True iff the type declares the event marker exactly once.
pub fn is_event(descriptor: &TypeDescriptor) -> Result<bool, ClassifyError> {
    declared_once(descriptor, "Event", |c| matches!(c, Capability::Event))
}

/// True iff the type is a message of either kind.
///
/// The two markers are mutually exclusive: declaring both (or either more
/// than once) is a classification error.
pub fn is_message(descriptor: &TypeDescriptor) -> Result<bool, ClassifyError> {
    message_kind(descriptor).map(|kind| kind.is_some())
}

/// The message kind of the type, if it is a message at all.
pub fn message_kind(descriptor: &TypeDescriptor) -> Result<Option<MessageKind>, ClassifyError> {
    let markers = descriptor
        .capabilities()
        .iter()
        .filter(|c| c.is_marker())
        .count();
    if markers > 1 {
        return Err(ambiguous(descriptor, "message marker", markers));
    }
    Ok(match descriptor.capabilities().iter().find(|c| c.is_marker()) {
        Some(Capability::Command) => Some(MessageKind::Command),
        Some(Capability::Event) => Some(MessageKind::Event),
        _ => None,
    })
}

/// True iff the type is concrete and declares the command handler
/// capability exactly once, counting across all message-type arguments.
pub fn is_command_handler(descriptor: &TypeDescriptor) -> Result<bool, ClassifyError> {
    if !is_concrete(descriptor) {
        return Ok(false);
    }
    declared_once(descriptor, "HandlesCommand", |c| {
        matches!(c, Capability::HandlesCommand(_))
    })
}

/// True iff the type is concrete and declares the event handler capability
/// exactly once, counting across all message-type arguments.
pub fn is_event_handler(descriptor: &TypeDescriptor) -> Result<bool, ClassifyError> {
    if !is_concrete(descriptor) {
        return Ok(false);
    }
    declared_once(descriptor, "HandlesEvent", |c| {
        matches!(c, Capability::HandlesEvent(_))
    })
}

/// True iff the type is a handler of either kind.
pub fn is_handler(descriptor: &TypeDescriptor) -> Result<bool, ClassifyError> {
    Ok(is_command_handler(descriptor)? || is_event_handler(descriptor)?)
}

/// The handler bindings the type gives rise to: at most one per handler
/// capability. A concrete type may legitimately carry one command-handler
/// and one event-handler capability, yielding two targets.
pub fn handler_targets(
    descriptor: &TypeDescriptor,
) -> Result<Vec<(MessageKind, TypeIdentity)>, ClassifyError> {
    let mut targets = Vec::new();
    if is_command_handler(descriptor)? {
        if let Some(Capability::HandlesCommand(message)) = descriptor
            .capabilities()
            .iter()
            .find(|c| matches!(c, Capability::HandlesCommand(_)))
        {
            targets.push((MessageKind::Command, *message));
        }
    }
    if is_event_handler(descriptor)? {
        if let Some(Capability::HandlesEvent(message)) = descriptor
            .capabilities()
            .iter()
            .find(|c| matches!(c, Capability::HandlesEvent(_)))
        {
            targets.push((MessageKind::Event, *message));
        }
    }
    Ok(targets)
}

fn declared_once(
    descriptor: &TypeDescriptor,
    capability: &'static str,
    matches: impl Fn(&Capability) -> bool,
) -> Result<bool, ClassifyError> {
    match descriptor.capabilities().iter().filter(|c| matches(c)).count() {
        0 => Ok(false),
        1 => Ok(true),
        declarations => Err(ambiguous(descriptor, capability, declarations)),
    }
}

fn ambiguous(
    descriptor: &TypeDescriptor,
    capability: &'static str,
    declarations: usize,
) -> ClassifyError {
    ClassifyError::AmbiguousCapability {
        type_name: descriptor.identity().name(),
        capability,
        declarations,
    }
}
