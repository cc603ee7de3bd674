use crate::core::user::UserId;
use crate::optimization::netting::Transfer;
use crate::settlement::status::SettlementStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub partial: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: SettlementStatus) {
        match status {
            SettlementStatus::Pending => self.pending += 1,
            SettlementStatus::Partial => self.partial += 1,
            SettlementStatus::Completed => self.completed += 1,
            SettlementStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.partial + self.completed + self.cancelled
    }
}

/// What a user owes and is owed across every settlement they touch.
///
/// Only open settlements contribute amounts; balances of cancelled
/// settlements are void.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub user_id: UserId,
    pub counts: StatusCounts,
    /// Settlements the user created.
    pub created_count: usize,
    /// Outstanding amounts the user owes to other creators.
    pub total_owed_by_user: Decimal,
    /// Outstanding amounts other participants owe the user.
    pub total_owed_to_user: Decimal,
}

impl SettlementSummary {
    /// Positive when the user is owed more than they owe.
    pub fn net_balance(&self) -> Decimal {
        self.total_owed_to_user - self.total_owed_by_user
    }
}

/// Outstanding debts around a user, before and after simplification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalSettlement {
    pub user_id: UserId,
    /// Outstanding transactions feeding the plan.
    pub raw_count: usize,
    pub optimized_count: usize,
    /// Transfers avoided: `raw_count - optimized_count`.
    pub savings: usize,
    pub gross_total: Decimal,
    pub net_total: Decimal,
    pub transfers: Vec<Transfer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        counts.record(SettlementStatus::Pending);
        counts.record(SettlementStatus::Pending);
        counts.record(SettlementStatus::Cancelled);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.cancelled, 1);
        assert_eq!(counts.total(), 3);
    }
}
