#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use courier::shutdown::ShutdownToken;
use courier::{BoxError, Command, Event, HandleCommand, HandleEvent};

// ============================================================================
// Arithmetic sample domain
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AddCommand {
    pub augend: i32,
    pub addend: i32,
}

impl Command for AddCommand {}

#[derive(Debug, Clone, PartialEq)]
pub struct AddedEvent {
    pub augend: i32,
    pub addend: i32,
    pub sum: i32,
}

impl Event for AddedEvent {}

/// Computes the sum and records the resulting event into a shared store.
pub struct AddCommandHandler {
    pub store: Arc<Mutex<Vec<AddedEvent>>>,
}

impl HandleCommand<AddCommand> for AddCommandHandler {
    async fn handle(&self, command: AddCommand, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        let sum = command.augend + command.addend;
        self.store.lock().unwrap().push(AddedEvent {
            augend: command.augend,
            addend: command.addend,
            sum,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivideCommand {
    pub dividend: i32,
    pub divisor: i32,
}

impl Command for DivideCommand {}

/// Deliberately fails every invocation.
pub struct FailingDivideCommandHandler;

impl HandleCommand<DivideCommand> for FailingDivideCommandHandler {
    async fn handle(&self, _command: DivideCommand, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        Err("failed to process DivideCommand".into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipliedEvent {
    pub multiplicand: i32,
    pub multiplier: i32,
    pub product: i32,
}

impl Event for MultipliedEvent {}

/// Succeeds after a short delay, counting its invocation.
pub struct MultipliedEventHandler {
    pub invocations: Arc<AtomicUsize>,
}

impl HandleEvent<MultipliedEvent> for MultipliedEventHandler {
    async fn handle(&self, _event: MultipliedEvent, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A second, independent subscriber to `MultipliedEvent`.
pub struct MultipliedAuditHandler {
    pub invocations: Arc<AtomicUsize>,
}

impl HandleEvent<MultipliedEvent> for MultipliedAuditHandler {
    async fn handle(&self, _event: MultipliedEvent, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Counts its invocation, then fails.
pub struct FailingMultipliedEventHandler {
    pub invocations: Arc<AtomicUsize>,
}

impl HandleEvent<MultipliedEvent> for FailingMultipliedEventHandler {
    async fn handle(&self, _event: MultipliedEvent, _shutdown: ShutdownToken) -> Result<(), BoxError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Err("failed to process MultipliedEvent".into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtractedEvent {
    pub minuend: i32,
    pub subtrahend: i32,
    pub difference: i32,
}

impl Event for SubtractedEvent {}

#[derive(Debug, Clone, PartialEq)]
pub struct ExponentiateCommand {
    pub base: i32,
    pub exponent: u32,
}

impl Command for ExponentiateCommand {}

/// One of two competing handlers for `ExponentiateCommand`; registering
/// both makes command routing ambiguous.
pub struct ExponentiateCommandHandler;

impl HandleCommand<ExponentiateCommand> for ExponentiateCommandHandler {
    async fn handle(
        &self,
        command: ExponentiateCommand,
        _shutdown: ShutdownToken,
    ) -> Result<(), BoxError> {
        let _ = command.base.pow(command.exponent);
        Ok(())
    }
}

/// The other competing handler for `ExponentiateCommand`.
pub struct RaiseToPowerCommandHandler;

impl HandleCommand<ExponentiateCommand> for RaiseToPowerCommandHandler {
    async fn handle(
        &self,
        command: ExponentiateCommand,
        _shutdown: ShutdownToken,
    ) -> Result<(), BoxError> {
        let _ = (0..command.exponent).fold(1_i64, |acc, _| acc * i64::from(command.base));
        Ok(())
    }
}
