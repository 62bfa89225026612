//! The catalog: an immutable snapshot of everything a scan discovered.

use std::collections::HashSet;

use courier_core::{classify, ClassifyError, MessageKind, TypeDescriptor, TypeIdentity};
use thiserror::Error;
use tracing::debug;

use crate::module::{ModuleLoadError, ModuleSource};

/// Errors that abort a catalog build.
///
/// Build-time errors are never deferred to dispatch time; a catalog either
/// exists whole or not at all.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A module source failed to enumerate its types.
    #[error(transparent)]
    ModuleLoad(#[from] ModuleLoadError),

    /// A type's capability declarations were ambiguous.
    #[error("classification failed while scanning module `{module}`")]
    Classification {
        /// The module that contributed the offending descriptor.
        module: String,
        /// The underlying classification error.
        #[source]
        source: ClassifyError,
    },
}

/// A handler type bound to the concrete message type it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerBinding {
    /// Which delivery semantics apply.
    pub kind: MessageKind,
    /// The concrete message type being handled.
    pub message: TypeIdentity,
    /// The handler type.
    pub handler: TypeIdentity,
}

/// Immutable result of scanning a set of module sources.
///
/// Four disjoint partitions: concrete command types, concrete event types,
/// command handler bindings, event handler bindings. Membership is
/// deduplicated by type identity across sources (first occurrence wins) and
/// is deterministic for a given set of inputs; within-partition order is
/// discovery order. A catalog is never updated incrementally — supersede it
/// with a fresh scan.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    commands: Vec<TypeIdentity>,
    events: Vec<TypeIdentity>,
    command_bindings: Vec<HandlerBinding>,
    event_bindings: Vec<HandlerBinding>,
}

impl Catalog {
    /// Scan the given sources into a catalog.
    ///
    /// Any enumeration or classification failure aborts the whole build.
    pub fn scan(sources: &[&dyn ModuleSource]) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();
        let mut seen: HashSet<TypeIdentity> = HashSet::new();

        for source in sources {
            let descriptors = source.descriptors()?;
            debug!(
                module = source.name(),
                types = descriptors.len(),
                "scanning module"
            );
            for descriptor in &descriptors {
                // the same type reachable from two sources contributes once
                if !seen.insert(descriptor.identity()) {
                    continue;
                }
                catalog.absorb(source.name(), descriptor)?;
            }
        }

        debug!(
            commands = catalog.commands.len(),
            events = catalog.events.len(),
            command_bindings = catalog.command_bindings.len(),
            event_bindings = catalog.event_bindings.len(),
            "catalog built"
        );
        Ok(catalog)
    }

    fn absorb(&mut self, module: &str, descriptor: &TypeDescriptor) -> Result<(), CatalogError> {
        let classified = |source: ClassifyError| CatalogError::Classification {
            module: module.to_string(),
            source,
        };

        if classify::is_concrete(descriptor) {
            match classify::message_kind(descriptor).map_err(classified)? {
                Some(MessageKind::Command) => self.commands.push(descriptor.identity()),
                Some(MessageKind::Event) => self.events.push(descriptor.identity()),
                None => {}
            }
        } else {
            // abstract/open message declarations are not routable, but their
            // declarations must still be well formed
            classify::message_kind(descriptor).map_err(classified)?;
        }

        for (kind, message) in classify::handler_targets(descriptor).map_err(classified)? {
            let binding = HandlerBinding {
                kind,
                message,
                handler: descriptor.identity(),
            };
            match kind {
                MessageKind::Command => self.command_bindings.push(binding),
                MessageKind::Event => self.event_bindings.push(binding),
            }
        }
        Ok(())
    }

    /// Concrete command types, in discovery order.
    pub fn commands(&self) -> &[TypeIdentity] {
        &self.commands
    }

    /// Concrete event types, in discovery order.
    pub fn events(&self) -> &[TypeIdentity] {
        &self.events
    }

    /// All command handler bindings, in discovery order.
    pub fn command_bindings(&self) -> &[HandlerBinding] {
        &self.command_bindings
    }

    /// All event handler bindings, in discovery order.
    pub fn event_bindings(&self) -> &[HandlerBinding] {
        &self.event_bindings
    }

    /// The message kind of a scanned type, if present in either message set.
    pub fn kind_of(&self, identity: &TypeIdentity) -> Option<MessageKind> {
        if self.commands.contains(identity) {
            Some(MessageKind::Command)
        } else if self.events.contains(identity) {
            Some(MessageKind::Event)
        } else {
            None
        }
    }

    /// Command bindings targeting the given message type.
    pub fn command_bindings_for<'a>(
        &'a self,
        message: &'a TypeIdentity,
    ) -> impl Iterator<Item = &'a HandlerBinding> {
        self.command_bindings
            .iter()
            .filter(move |binding| binding.message == *message)
    }

    /// Event bindings targeting the given message type.
    pub fn event_bindings_for<'a>(
        &'a self,
        message: &'a TypeIdentity,
    ) -> impl Iterator<Item = &'a HandlerBinding> {
        self.event_bindings
            .iter()
            .filter(move |binding| binding.message == *message)
    }
}
