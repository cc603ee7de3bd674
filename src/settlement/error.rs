use crate::core::validation::ValidationError;
use crate::settlement::status::SettlementStatus;
use crate::settlement::store::StoreError;
use thiserror::Error;

/// Failure of a settlement engine operation.
#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{requester} is not allowed to modify settlement {settlement_id}")]
    Authorization {
        requester: String,
        settlement_id: String,
    },

    #[error("cannot move settlement from {current} to {requested}")]
    InvalidTransition {
        current: SettlementStatus,
        requested: SettlementStatus,
    },

    /// An optimistic update lost a race. Retry with fresh data.
    #[error("{entity} {id} was modified concurrently")]
    ConcurrencyConflict { entity: &'static str, id: String },

    #[error("ledger store failure: {0}")]
    Store(String),
}

impl From<StoreError> for SettlementError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { entity, id } => SettlementError::ConcurrencyConflict { entity, id },
            StoreError::Missing { entity, id } => SettlementError::NotFound { entity, id },
            other => SettlementError::Store(other.to_string()),
        }
    }
}
