//! Optional notification hook invoked after successful mutations.

use crate::settlement::model::{PaymentRecord, Settlement, Transaction};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Receives settlement events once they are committed to the store.
///
/// A failing hook never fails the operation that triggered it; the engine
/// logs the error and carries on.
pub trait SettlementNotifier: Send + Sync {
    fn payment_recorded(&self, _transaction: &Transaction, _payment: &PaymentRecord) -> Result<(), NotifyError> {
        Ok(())
    }

    fn settlement_completed(&self, _settlement: &Settlement) -> Result<(), NotifyError> {
        Ok(())
    }

    fn settlement_cancelled(&self, _settlement: &Settlement) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Hook that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl SettlementNotifier for NoopNotifier {}
