use crate::core::debt::DebtEdge;
use crate::core::money::MONEY_TOLERANCE;
use crate::core::user::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net balance of each user across a set of debts.
///
/// A positive balance means the user is owed money (net creditor).
/// A negative balance means the user owes money (net debtor).
///
/// Ordered by user id so that iteration, and therefore netting, is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    balances: BTreeMap<UserId, Decimal>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a DebtEdge>) -> Self {
        let mut sheet = Self::new();
        for edge in edges {
            sheet.apply(edge);
        }
        sheet
    }

    /// Apply a debt: debtor loses, creditor gains.
    pub fn apply(&mut self, edge: &DebtEdge) {
        self.record(edge.from(), edge.to(), edge.amount());
    }

    /// Record `amount` flowing as a debt from `from` to `to`.
    pub fn record(&mut self, from: &UserId, to: &UserId, amount: Decimal) {
        *self.balances.entry(from.clone()).or_insert(Decimal::ZERO) -= amount;
        *self.balances.entry(to.clone()).or_insert(Decimal::ZERO) += amount;
    }

    pub fn balance(&self, user: &UserId) -> Decimal {
        self.balances.get(user).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn balances(&self) -> &BTreeMap<UserId, Decimal> {
        &self.balances
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum of all balances is zero.
    pub fn is_balanced(&self) -> bool {
        self.balances.values().sum::<Decimal>() == Decimal::ZERO
    }

    /// Total owed to net creditors (equivalently, owed by net debtors).
    pub fn total_outstanding(&self) -> Decimal {
        self.balances.values().filter(|v| **v > Decimal::ZERO).sum()
    }

    /// Every user's balance in `self` matches `other` within tolerance.
    /// Users missing from one side count as zero.
    pub fn matches(&self, other: &BalanceSheet) -> bool {
        self.balances
            .keys()
            .chain(other.balances.keys())
            .all(|user| (self.balance(user) - other.balance(user)).abs() <= MONEY_TOLERANCE)
    }
}
