//! The resolution capability: turning handler types into live instances.
//!
//! The registry consumes a [`HandlerResolver`] purely to obtain instances —
//! it never constructs anything itself. Applications with a dependency
//! injection container implement the trait over it; [`StaticResolver`] is
//! the provided implementation for explicitly constructed handlers.

use std::collections::HashMap;
use std::sync::Arc;

use courier_core::{Command, Event, TypeIdentity};

use crate::handler::{
    CommandHandlerAdapter, DynHandler, EventHandlerAdapter, HandleCommand, HandleEvent,
};

/// Resolves a handler type identity to a live, invokable instance.
///
/// Instances are owned by the resolver; the registry shares them by
/// reference for the lifetime of the router.
pub trait HandlerResolver: Send + Sync {
    /// Whether this resolver can produce an instance of the given type.
    fn can_resolve(&self, handler: &TypeIdentity) -> bool;

    /// Produce an instance of the given type, if known.
    fn get(&self, handler: &TypeIdentity) -> Option<Arc<dyn DynHandler>>;
}

/// A resolver over explicitly registered handler instances.
///
/// Registration erases each instance at insert time and keys it by the
/// handler's type identity, so lookup is a plain map access. Registering
/// the same handler type twice replaces the earlier instance.
#[derive(Default)]
pub struct StaticResolver {
    instances: HashMap<TypeIdentity, Arc<dyn DynHandler>>,
}

impl StaticResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command handler instance.
    pub fn with_command_handler<H, C>(mut self, handler: H) -> Self
    where
        H: HandleCommand<C>,
        C: Command + Clone,
    {
        self.instances.insert(
            TypeIdentity::of::<H>(),
            CommandHandlerAdapter::shared(handler),
        );
        self
    }

    /// Register an event handler instance.
    pub fn with_event_handler<H, E>(mut self, handler: H) -> Self
    where
        H: HandleEvent<E>,
        E: Event + Clone,
    {
        self.instances
            .insert(TypeIdentity::of::<H>(), EventHandlerAdapter::shared(handler));
        self
    }

    /// Register an already-erased instance under an explicit identity.
    pub fn with_instance(mut self, handler: TypeIdentity, instance: Arc<dyn DynHandler>) -> Self {
        self.instances.insert(handler, instance);
        self
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instances are registered.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl HandlerResolver for StaticResolver {
    fn can_resolve(&self, handler: &TypeIdentity) -> bool {
        self.instances.contains_key(handler)
    }

    fn get(&self, handler: &TypeIdentity) -> Option<Arc<dyn DynHandler>> {
        self.instances.get(handler).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::BoxError;

    use crate::shutdown::ShutdownToken;

    #[derive(Debug, Clone)]
    struct Poke;
    impl Command for Poke {}

    struct PokeHandler;
    impl HandleCommand<Poke> for PokeHandler {
        async fn handle(&self, _command: Poke, _shutdown: ShutdownToken) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn registered_handlers_resolve() {
        let resolver = StaticResolver::new().with_command_handler::<PokeHandler, Poke>(PokeHandler);
        let identity = TypeIdentity::of::<PokeHandler>();
        assert!(resolver.can_resolve(&identity));
        let instance = resolver.get(&identity).unwrap();
        assert_eq!(instance.subject(), TypeIdentity::of::<Poke>());
    }

    #[test]
    fn unknown_handlers_do_not_resolve() {
        let resolver = StaticResolver::new();
        assert!(!resolver.can_resolve(&TypeIdentity::of::<PokeHandler>()));
        assert!(resolver.get(&TypeIdentity::of::<PokeHandler>()).is_none());
    }
}
