//! The handler registry: a dispatch-ready view of one catalog.
//!
//! Built once from a [`Catalog`] and a [`HandlerResolver`], then frozen.
//! The command cardinality rule (exactly one handler) is enforced here, at
//! build time — ambiguous routing must be impossible before any message is
//! routed.

use std::collections::HashMap;
use std::sync::Arc;

use courier_core::{MessageKind, TypeIdentity};
use thiserror::Error;

use crate::catalog::{Catalog, HandlerBinding};
use crate::handler::DynHandler;
use crate::resolver::HandlerResolver;

/// Errors that abort a registry build.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// More than one handler binding targets the same command type.
    #[error("command `{command}` has {count} registered handlers; commands require exactly one")]
    AmbiguousCommandRouting {
        /// The over-subscribed command type.
        command: TypeIdentity,
        /// How many bindings were found.
        count: usize,
    },

    /// The resolution capability had no instance for a bound handler type.
    #[error("handler `{handler}` could not be resolved to an instance")]
    UnresolvedHandler {
        /// The unresolvable handler type.
        handler: TypeIdentity,
    },

    /// A resolved instance disagrees with its binding about the message it
    /// handles.
    #[error("handler `{handler}` resolved to an instance handling `{actual}`, expected `{expected}`")]
    SubjectMismatch {
        /// The handler type.
        handler: TypeIdentity,
        /// The message type the binding targets.
        expected: TypeIdentity,
        /// The message type the instance reports.
        actual: TypeIdentity,
    },
}

/// Read-only map from message type identity to resolved handler instances.
///
/// Commands map to zero-or-one instance (zero is recorded so routing can
/// fail per-message later); events map to a list in catalog discovery
/// order. Shared by reference for the lifetime of the router; never mutated
/// after build.
pub struct HandlerRegistry {
    kinds: HashMap<TypeIdentity, MessageKind>,
    commands: HashMap<TypeIdentity, Option<Arc<dyn DynHandler>>>,
    events: HashMap<TypeIdentity, Vec<Arc<dyn DynHandler>>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.kinds.len())
            .field("commands", &self.commands.len())
            .field("events", &self.events.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// Build a registry from a catalog and a resolution capability.
    pub fn build(
        catalog: &Catalog,
        resolver: &dyn HandlerResolver,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self {
            kinds: HashMap::new(),
            commands: HashMap::new(),
            events: HashMap::new(),
        };

        for &command in catalog.commands() {
            registry.kinds.insert(command, MessageKind::Command);
            let bindings: Vec<&HandlerBinding> = catalog.command_bindings_for(&command).collect();
            let resolved = match bindings.as_slice() {
                [] => None,
                [binding] => Some(resolve(resolver, binding)?),
                many => {
                    return Err(RegistryError::AmbiguousCommandRouting {
                        command,
                        count: many.len(),
                    });
                }
            };
            registry.commands.insert(command, resolved);
        }

        for &event in catalog.events() {
            registry.kinds.insert(event, MessageKind::Event);
            let mut handlers = Vec::new();
            for binding in catalog.event_bindings_for(&event) {
                handlers.push(resolve(resolver, binding)?);
            }
            registry.events.insert(event, handlers);
        }

        Ok(registry)
    }

    /// The message kind of a registered type.
    pub fn kind_of(&self, identity: &TypeIdentity) -> Option<MessageKind> {
        self.kinds.get(identity).copied()
    }

    /// The single resolved handler for a command, if one is bound.
    pub fn command_handler(&self, command: &TypeIdentity) -> Option<&Arc<dyn DynHandler>> {
        self.commands.get(command).and_then(|slot| slot.as_ref())
    }

    /// The resolved handlers for an event, in catalog discovery order.
    pub fn event_handlers(&self, event: &TypeIdentity) -> &[Arc<dyn DynHandler>] {
        self.events.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of registered command types.
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Number of registered event types.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

fn resolve(
    resolver: &dyn HandlerResolver,
    binding: &HandlerBinding,
) -> Result<Arc<dyn DynHandler>, RegistryError> {
    let instance = resolver
        .get(&binding.handler)
        .ok_or(RegistryError::UnresolvedHandler {
            handler: binding.handler,
        })?;
    if instance.subject() != binding.message || instance.kind() != binding.kind {
        return Err(RegistryError::SubjectMismatch {
            handler: binding.handler,
            expected: binding.message,
            actual: instance.subject(),
        });
    }
    Ok(instance)
}
