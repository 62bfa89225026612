//! # courier-core
//!
//! Core types for the Courier routing core.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! modules and resolvers that don't need the full `courier` dispatch
//! machinery. It contains the three pure building blocks of the system:
//!
//! ## Messages ([`Command`], [`Event`], [`AnyMessage`])
//!
//! Marker traits declare which kind a message type belongs to, and
//! [`AnyMessage`] carries a live instance behind its stable type identity so
//! the router never needs runtime type inspection beyond an identity lookup.
//!
//! ## Descriptors ([`TypeDescriptor`])
//!
//! An immutable record of a type's identity, structural shape and declared
//! capability set. Descriptors are produced by module registration and are
//! the sole input to classification.
//!
//! ## Classification ([`classify`])
//!
//! Pure, stateless predicates that decide whether a descriptor is a
//! message, a handler, or neither — and for a handler, which message type it
//! targets. Ambiguous declarations are rejected, never guessed at.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod classify;
pub mod descriptor;
pub mod error;
pub mod message;

pub use descriptor::{Capability, TypeDescriptor, TypeFlags, TypeIdentity};
pub use error::{BoxError, ClassifyError};
pub use message::{AnyMessage, Command, Event, MessageKind};
