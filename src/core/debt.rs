use crate::core::user::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected debt edge.
#[derive(Debug, Error, PartialEq)]
pub enum DebtError {
    #[error("debt amount must be positive, got {amount} for {from} -> {to}")]
    NonPositiveAmount {
        from: UserId,
        to: UserId,
        amount: Decimal,
    },
    #[error("{user} cannot owe themselves")]
    SelfDebt { user: UserId },
}

/// A directed debt: `from` owes `to` the given `amount`.
///
/// Debt edges are ephemeral. They are assembled from outstanding ledger
/// rows right before netting and never persisted.
///
/// # Examples
///
/// ```
/// use expense_settlement::core::debt::DebtEdge;
/// use expense_settlement::core::user::UserId;
/// use rust_decimal_macros::dec;
///
/// let edge = DebtEdge::new(UserId::new("alice"), UserId::new("bob"), dec!(30));
/// assert_eq!(edge.amount(), dec!(30));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtEdge {
    from: UserId,
    to: UserId,
    amount: Decimal,
}

impl DebtEdge {
    /// Create a new debt edge.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive or `from == to`. Use
    /// [`DebtEdge::try_new`] for untrusted input.
    pub fn new(from: UserId, to: UserId, amount: Decimal) -> Self {
        match Self::try_new(from, to, amount) {
            Ok(edge) => edge,
            Err(e) => panic!("invalid debt edge: {e}"),
        }
    }

    pub fn try_new(from: UserId, to: UserId, amount: Decimal) -> Result<Self, DebtError> {
        if from == to {
            return Err(DebtError::SelfDebt { user: from });
        }
        if amount <= Decimal::ZERO {
            return Err(DebtError::NonPositiveAmount { from, to, amount });
        }
        Ok(Self { from, to, amount })
    }

    pub fn from(&self) -> &UserId {
        &self.from
    }

    pub fn to(&self) -> &UserId {
        &self.to
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// A collection of debt edges submitted to the optimizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtSet {
    edges: Vec<DebtEdge>,
}

impl DebtSet {
    pub fn new() -> Self {
        Self { edges: Vec::new() }
    }

    pub fn add(&mut self, edge: DebtEdge) {
        self.edges.push(edge);
    }

    pub fn edges(&self) -> &[DebtEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Sum of every edge amount before netting.
    pub fn gross_total(&self) -> Decimal {
        self.edges.iter().map(|e| e.amount()).sum()
    }

    /// All distinct users referenced, sorted.
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .edges
            .iter()
            .flat_map(|e| [e.from().clone(), e.to().clone()])
            .collect();
        users.sort();
        users.dedup();
        users
    }
}

impl FromIterator<DebtEdge> for DebtSet {
    fn from_iter<T: IntoIterator<Item = DebtEdge>>(iter: T) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}
