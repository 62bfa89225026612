//! Module sources: the units the catalog scans for message and handler
//! types.
//!
//! Registration is explicit — a [`ModuleBuilder`] records descriptors whose
//! capability sets are correct by construction, with the compiler checking
//! the message/handler pairing through trait bounds. There is no runtime
//! structural probing.

use courier_core::{classify, Capability, Command, Event, TypeDescriptor, TypeIdentity};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::handler::{HandleCommand, HandleEvent};

/// A declared module source could not be enumerated.
///
/// Fatal to catalog construction: a build over partial inputs would
/// silently misroute.
#[derive(Debug, Clone, Error)]
#[error("module `{module}` could not be enumerated: {reason}")]
pub struct ModuleLoadError {
    /// Name of the failing module.
    pub module: String,
    /// Human-readable cause.
    pub reason: String,
}

/// A unit of compiled types that can be scanned.
pub trait ModuleSource: Send + Sync {
    /// Stable name, used in diagnostics.
    fn name(&self) -> &str;

    /// Every type descriptor contained in this module.
    fn descriptors(&self) -> Result<Vec<TypeDescriptor>, ModuleLoadError>;
}

/// An in-memory module source built once via [`ModuleBuilder`].
#[derive(Debug, Clone)]
pub struct StaticModule {
    name: String,
    descriptors: Vec<TypeDescriptor>,
}

impl StaticModule {
    /// Start building a module with the given diagnostic name.
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            name: name.into(),
            descriptors: Vec::new(),
        }
    }
}

impl ModuleSource for StaticModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn descriptors(&self) -> Result<Vec<TypeDescriptor>, ModuleLoadError> {
        Ok(self.descriptors.clone())
    }
}

/// Records message and handler declarations for a [`StaticModule`].
#[derive(Debug)]
pub struct ModuleBuilder {
    name: String,
    descriptors: Vec<TypeDescriptor>,
}

impl ModuleBuilder {
    /// Declare a command message type.
    pub fn command<C: Command>(mut self) -> Self {
        self.descriptors
            .push(TypeDescriptor::of::<C>().with_capability(Capability::Command));
        self
    }

    /// Declare an event message type.
    pub fn event<E: Event>(mut self) -> Self {
        self.descriptors
            .push(TypeDescriptor::of::<E>().with_capability(Capability::Event));
        self
    }

    /// Declare a command handler type together with its target command.
    pub fn command_handler<H, C>(mut self) -> Self
    where
        H: HandleCommand<C>,
        C: Command,
    {
        self.descriptors.push(
            TypeDescriptor::of::<H>()
                .with_capability(Capability::HandlesCommand(TypeIdentity::of::<C>())),
        );
        self
    }

    /// Declare an event handler type together with its target event.
    pub fn event_handler<H, E>(mut self) -> Self
    where
        H: HandleEvent<E>,
        E: Event,
    {
        self.descriptors.push(
            TypeDescriptor::of::<H>()
                .with_capability(Capability::HandlesEvent(TypeIdentity::of::<E>())),
        );
        self
    }

    /// Record a hand-built descriptor.
    ///
    /// Escape hatch for descriptors the typed methods cannot express (open
    /// generics, foreign shapes); such descriptors go through the same
    /// classification as every other.
    pub fn descriptor(mut self, descriptor: TypeDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Freeze the module.
    pub fn build(self) -> StaticModule {
        StaticModule {
            name: self.name,
            descriptors: self.descriptors,
        }
    }
}

/// Per-source convenience accessors over a module's classified contents.
///
/// Plain data and infrastructure types are filtered out silently; only a
/// genuinely ambiguous declaration raises.
pub struct ModuleScanner<'a> {
    source: &'a dyn ModuleSource,
}

impl<'a> ModuleScanner<'a> {
    /// Scan the given source.
    pub fn new(source: &'a dyn ModuleSource) -> Self {
        Self { source }
    }

    /// Every descriptor in the module, unfiltered.
    pub fn all_types(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        Ok(self.source.descriptors()?)
    }

    /// Descriptors of instantiable types.
    pub fn concrete_types(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        self.filtered(|d| Ok(classify::is_concrete(d)))
    }

    /// Descriptors declaring the command marker.
    pub fn command_messages(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        self.filtered(classify::is_command)
    }

    /// Descriptors declaring the event marker.
    pub fn event_messages(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        self.filtered(classify::is_event)
    }

    /// Descriptors declaring either message marker.
    pub fn all_messages(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        self.filtered(classify::is_message)
    }

    /// Concrete descriptors declaring the command handler capability.
    pub fn command_handlers(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        self.filtered(classify::is_command_handler)
    }

    /// Concrete descriptors declaring the event handler capability.
    pub fn event_handlers(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        self.filtered(classify::is_event_handler)
    }

    /// Concrete descriptors declaring either handler capability.
    pub fn all_handlers(&self) -> Result<Vec<TypeDescriptor>, CatalogError> {
        self.filtered(classify::is_handler)
    }

    fn filtered(
        &self,
        keep: impl Fn(&TypeDescriptor) -> Result<bool, courier_core::ClassifyError>,
    ) -> Result<Vec<TypeDescriptor>, CatalogError> {
        let mut kept = Vec::new();
        for descriptor in self.source.descriptors()? {
            let matched = keep(&descriptor).map_err(|source| CatalogError::Classification {
                module: self.source.name().to_string(),
                source,
            })?;
            if matched {
                kept.push(descriptor);
            }
        }
        Ok(kept)
    }
}
