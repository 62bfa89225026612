//! Error types shared across the Courier core.

use thiserror::Error;

/// A boxed error type for dynamic error handling at the routing boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by classification.
///
/// Classification fails closed: a type whose capability declarations are
/// ambiguous is rejected outright rather than resolved by an arbitrary pick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// A marker or handler capability is structurally satisfied more than
    /// once by the same type.
    #[error(
        "type `{type_name}` declares the {capability} capability {declarations} times; \
         at most one declaration is allowed"
    )]
    AmbiguousCapability {
        /// Name of the offending type.
        type_name: &'static str,
        /// Which capability family was declared more than once.
        capability: &'static str,
        /// How many declarations were found.
        declarations: usize,
    },
}
