//! Type descriptors: identity, structural shape and declared capabilities.

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;

/// Stable, comparable identity for a type.
///
/// Equality and hashing use the [`TypeId`] only; the name rides along for
/// diagnostics and is never compared (two types with the same short name in
/// different modules stay distinct).
#[derive(Debug, Clone, Copy, Eq)]
pub struct TypeIdentity {
    id: TypeId,
    name: &'static str,
}

impl TypeIdentity {
    /// The identity of a concrete Rust type.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// The fully qualified type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Hash for TypeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

bitflags! {
    /// Structural shape recorded for a scanned type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        /// An interface or abstract marker; never instantiable.
        const ABSTRACT = 1;
        /// A generic type.
        const GENERIC = 1 << 1;
        /// A generic type with at least one unsupplied parameter.
        ///
        /// Meaningful only together with [`TypeFlags::GENERIC`]; a generic
        /// without this flag is fully instantiated (closed).
        const UNBOUND = 1 << 2;
    }
}

/// One structural capability declared by a type.
///
/// Marker capabilities are non-generic; handler capabilities are generic and
/// carry the message type they were instantiated at. Capability matching is
/// **strict**: [`HandlesCommand`](Capability::HandlesCommand) for one
/// message type never matches the same capability instantiated at another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The command message marker.
    Command,
    /// The event message marker.
    Event,
    /// The command handler capability, instantiated at a command type.
    HandlesCommand(TypeIdentity),
    /// The event handler capability, instantiated at an event type.
    HandlesEvent(TypeIdentity),
}

impl Capability {
    /// True for the non-generic message markers.
    pub fn is_marker(&self) -> bool {
        matches!(self, Capability::Command | Capability::Event)
    }

    /// True for the generic handler capabilities.
    pub fn is_handler(&self) -> bool {
        matches!(
            self,
            Capability::HandlesCommand(_) | Capability::HandlesEvent(_)
        )
    }
}

/// Immutable record of a type's identity, shape and capability set.
///
/// Descriptors are produced once by module registration and never mutated.
/// The typed constructors on `courier`'s `ModuleBuilder` yield well-formed
/// descriptors; the builder methods here can also express malformed ones
/// (duplicate capabilities, open generics) so that classification's
/// fail-closed paths stay reachable from tests.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    identity: TypeIdentity,
    flags: TypeFlags,
    capabilities: Vec<Capability>,
}

impl TypeDescriptor {
    /// A descriptor for a concrete Rust type, with no capabilities yet.
    pub fn of<T: 'static>() -> Self {
        Self::new(TypeIdentity::of::<T>(), TypeFlags::empty())
    }

    /// A descriptor from raw parts.
    pub fn new(identity: TypeIdentity, flags: TypeFlags) -> Self {
        Self {
            identity,
            flags,
            capabilities: Vec::new(),
        }
    }

    /// Replace the shape flags.
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Append a declared capability.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// The described type's identity.
    pub fn identity(&self) -> TypeIdentity {
        self.identity
    }

    /// The described type's shape flags.
    pub fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// The declared capability set, in declaration order.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }
}
