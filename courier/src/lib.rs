//! # courier — in-process command/event routing
//!
//! Courier routes messages to handlers discovered from a set of registered
//! modules, with asymmetric delivery semantics:
//!
//! - **Commands** go to exactly one handler and fail fast.
//! - **Events** fan out to zero or many handlers concurrently; completion
//!   is reported only after every handler has reached a terminal state,
//!   with failures aggregated.
//!
//! Data flows one way at build time and one way at dispatch time:
//!
//! ```text
//! modules ──▶ Catalog ──▶ HandlerRegistry          (build, fallible, once)
//! message ──▶ MessageRouter ──▶ handler tasks ──▶ continuation   (dispatch)
//! ```
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use courier::{Catalog, HandlerRegistry, MessageRouter, StaticModule, StaticResolver};
//!
//! let module = StaticModule::builder("accounts")
//!     .command::<Deposit>()
//!     .command_handler::<DepositHandler, Deposit>()
//!     .build();
//! let catalog = Catalog::scan(&[&module])?;
//!
//! let resolver = StaticResolver::new()
//!     .with_command_handler::<DepositHandler, Deposit>(DepositHandler::new(store));
//! let registry = HandlerRegistry::build(&catalog, &resolver)?;
//!
//! let router = MessageRouter::new(registry);
//! router.route(AnyMessage::new(Deposit { .. }), on_complete, on_error).await;
//! ```
//!
//! Build-time errors (ambiguous classification, module load failure,
//! ambiguous command routing) abort construction before any message can be
//! routed; dispatch-time failures are always recovered locally and reported
//! through the error continuation.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod catalog;
pub mod handler;
pub mod module;
pub mod registry;
pub mod resolver;
pub mod router;
pub mod shutdown;
pub mod testing;

pub use courier_core::{
    classify, AnyMessage, BoxError, Capability, ClassifyError, Command, Event, MessageKind,
    TypeDescriptor, TypeFlags, TypeIdentity,
};

pub use catalog::{Catalog, CatalogError, HandlerBinding};
pub use handler::{
    CommandHandlerAdapter, DynHandler, EventHandlerAdapter, HandleCommand, HandleEvent,
    HandlerFuture, PayloadMismatch,
};
pub use module::{ModuleBuilder, ModuleLoadError, ModuleScanner, ModuleSource, StaticModule};
pub use registry::{HandlerRegistry, RegistryError};
pub use resolver::{HandlerResolver, StaticResolver};
pub use router::{MessageRouter, RouteFailure};
pub use shutdown::{ShutdownSignal, ShutdownToken};
