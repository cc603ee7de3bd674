//! # expense-settlement
//!
//! Shared-expense splitting, settlement tracking and debt simplification.
//!
//! A group expense is split among participants under one of several
//! policies, each participant's share becomes a transaction that is paid
//! down over time, and the outstanding debts across settlements can be
//! reduced to a small set of direct transfers.
//!
//! ## Architecture
//!
//! - **core**: Money helpers, user and entity ids, debts, net balances
//! - **graph**: Aggregated debt graph and its connected components
//! - **optimization**: Greedy debt simplification
//! - **split**: Split policies and the split calculator
//! - **settlement**: Lifecycle engine, validation, ledger store
//! - **simulation**: Random debt networks for benches and testing
//! - **config**: Engine limits

pub mod config;
pub mod core;
pub mod graph;
pub mod optimization;
pub mod settlement;
pub mod simulation;
pub mod split;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::EngineLimits;
    pub use crate::core::balance::BalanceSheet;
    pub use crate::core::debt::{DebtEdge, DebtSet};
    pub use crate::core::ids::{PaymentId, SettlementId, TransactionId};
    pub use crate::core::money::CurrencyCode;
    pub use crate::core::user::UserId;
    pub use crate::graph::debt_graph::DebtGraph;
    pub use crate::optimization::netting::{DebtNettingOptimizer, NettingPlan, Transfer};
    pub use crate::settlement::engine::{PaymentOutcome, SettlementEngine};
    pub use crate::settlement::error::SettlementError;
    pub use crate::settlement::model::{NewPayment, NewSettlement, PaymentMethod, Settlement, Transaction};
    pub use crate::settlement::status::{SettlementStatus, TransactionStatus};
    pub use crate::settlement::store::{InMemoryLedgerStore, LedgerStore, SettlementDetails};
    pub use crate::split::calculator::{SplitCalculator, SplitResult};
    pub use crate::split::policy::{
        CustomShare, ItemizedSplit, ParticipantRef, PercentageShare, SplitPolicy, SplitType, WeightedShare,
    };
}
