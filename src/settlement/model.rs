use crate::core::ids::{PaymentId, SettlementId, TransactionId};
use crate::core::money::CurrencyCode;
use crate::core::user::UserId;
use crate::settlement::status::{SettlementStatus, TransactionStatus};
use crate::split::calculator::Participant;
use crate::split::policy::{SplitPolicy, SplitType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A declared shared expense, tracked until it is paid off or cancelled.
///
/// Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_amount: Decimal,
    pub currency: CurrencyCode,
    pub split_type: SplitType,
    pub creator_id: UserId,
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub status: SettlementStatus,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user)
    }

    /// Creator or participant.
    pub fn involves(&self, user: &UserId) -> bool {
        &self.creator_id == user || self.is_participant(user)
    }
}

/// One participant's owed/paid row within a settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub settlement_id: SettlementId,
    pub user_id: UserId,
    pub amount_owed: Decimal,
    pub amount_paid: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(settlement_id: SettlementId, user_id: UserId, amount_owed: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            id: TransactionId::new(),
            settlement_id,
            user_id,
            amount_owed,
            amount_paid: Decimal::ZERO,
            status: TransactionStatus::from_amounts(amount_owed, Decimal::ZERO),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn amount_remaining(&self) -> Decimal {
        self.amount_owed - self.amount_paid
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    /// Add a payment and refresh the status. Callers check the bounds first.
    pub(crate) fn apply_payment(&mut self, amount: Decimal, at: DateTime<Utc>) {
        self.amount_paid += amount;
        self.status = TransactionStatus::from_amounts(self.amount_owed, self.amount_paid);
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Card,
    MobileWallet,
    Other,
}

/// A single payment against a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

/// Caller input for [`SettlementEngine::create_settlement`].
///
/// [`SettlementEngine::create_settlement`]: crate::settlement::engine::SettlementEngine::create_settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSettlement {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub creator_id: UserId,
    pub split: SplitPolicy,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Caller input for [`SettlementEngine::record_payment`].
///
/// [`SettlementEngine::record_payment`]: crate::settlement::engine::SettlementEngine::record_payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
}

impl NewPayment {
    pub fn new(amount: Decimal, method: PaymentMethod) -> Self {
        Self {
            amount,
            method,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_payment_progress() {
        let now = Utc::now();
        let mut tx = Transaction::new(SettlementId::new(), UserId::new("a"), dec!(25.00), now);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.amount_remaining(), dec!(25.00));

        tx.apply_payment(dec!(10.00), now);
        assert_eq!(tx.status, TransactionStatus::Partial);
        assert_eq!(tx.amount_remaining(), dec!(15.00));

        tx.apply_payment(dec!(15.00), now);
        assert!(tx.is_completed());
    }

    #[test]
    fn test_zero_owed_transaction_starts_completed() {
        let tx = Transaction::new(SettlementId::new(), UserId::new("a"), Decimal::ZERO, Utc::now());
        assert!(tx.is_completed());
    }

    #[test]
    fn test_new_settlement_json_defaults() {
        let input: NewSettlement = serde_json::from_str(
            r#"{
                "title": "Dinner",
                "total_amount": "90.00",
                "creator_id": "alice",
                "split": { "type": "equal", "participants": [{ "user_id": "alice" }, { "user_id": "bob" }] }
            }"#,
        )
        .unwrap();
        assert_eq!(input.currency, CurrencyCode::new("USD"));
        assert!(input.due_date.is_none());
        assert_eq!(input.split.split_type(), SplitType::Equal);
    }
}
