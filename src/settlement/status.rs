use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a settlement.
///
/// ```text
/// pending   -> partial | completed | cancelled
/// partial   -> completed | cancelled
/// completed -> (terminal)
/// cancelled -> (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Partial,
    Completed,
    Cancelled,
}

impl SettlementStatus {
    pub const ALL: [SettlementStatus; 4] = [
        SettlementStatus::Pending,
        SettlementStatus::Partial,
        SettlementStatus::Completed,
        SettlementStatus::Cancelled,
    ];

    /// Statuses that still accept payments and cancellation.
    pub const OPEN: [SettlementStatus; 2] = [SettlementStatus::Pending, SettlementStatus::Partial];

    /// Whether `self -> next` appears in the transition table.
    pub fn can_transition_to(&self, next: SettlementStatus) -> bool {
        use SettlementStatus::*;
        matches!(
            (*self, next),
            (Pending, Partial) | (Pending, Completed) | (Pending, Cancelled) | (Partial, Completed) | (Partial, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SettlementStatus::Completed | SettlementStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Partial => "partial",
            SettlementStatus::Completed => "completed",
            SettlementStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment progress of a single participant's ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Partial,
    Completed,
}

impl TransactionStatus {
    /// Status implied by how much of `owed` has been `paid`.
    pub fn from_amounts(owed: Decimal, paid: Decimal) -> Self {
        if paid >= owed {
            TransactionStatus::Completed
        } else if paid > Decimal::ZERO {
            TransactionStatus::Partial
        } else {
            TransactionStatus::Pending
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Pending => f.write_str("pending"),
            TransactionStatus::Partial => f.write_str("partial"),
            TransactionStatus::Completed => f.write_str("completed"),
        }
    }
}
