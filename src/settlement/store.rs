use crate::core::ids::{SettlementId, TransactionId};
use crate::core::user::UserId;
use crate::settlement::model::{PaymentRecord, Settlement, Transaction};
use crate::settlement::status::SettlementStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Failure reported by a [`LedgerStore`].
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// A compare-and-set precondition did not hold.
    #[error("{entity} {id} changed since it was read")]
    Conflict { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: String },

    #[error("{entity} {id} not found")]
    Missing { entity: &'static str, id: String },

    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
}

/// A settlement together with all of its transactions, read as one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementDetails {
    pub settlement: Settlement,
    pub transactions: Vec<Transaction>,
}

impl SettlementDetails {
    pub fn all_completed(&self) -> bool {
        self.transactions.iter().all(|t| t.is_completed())
    }

    pub fn any_paid(&self) -> bool {
        self.transactions.iter().any(|t| t.amount_paid > Decimal::ZERO)
    }
}

/// Durable home of settlements, transactions and payment records.
///
/// Implementations must:
/// - persist a settlement and its transactions atomically (all or nothing)
/// - apply payments as a compare-and-set on `amount_paid`, refusing to
///   overdraw and refusing while the parent settlement is terminal
/// - change settlement status only as a compare-and-set on the current status
/// - serve [`LedgerStore::snapshot`] from a single consistent view
pub trait LedgerStore: Send + Sync {
    /// Persist a new settlement with its transactions.
    fn insert_settlement(&self, settlement: Settlement, transactions: Vec<Transaction>) -> Result<(), StoreError>;

    fn settlement(&self, id: SettlementId) -> Result<Option<Settlement>, StoreError>;

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    fn transactions_for(&self, settlement_id: SettlementId) -> Result<Vec<Transaction>, StoreError>;

    fn payments_for(&self, transaction_id: TransactionId) -> Result<Vec<PaymentRecord>, StoreError>;

    /// Settlement plus every sibling transaction, read atomically.
    fn snapshot(&self, settlement_id: SettlementId) -> Result<Option<SettlementDetails>, StoreError>;

    /// Append `payment` and add its amount to `amount_paid`, provided
    /// `amount_paid` still equals `expected_paid`. Returns the updated row.
    fn apply_payment(
        &self,
        transaction_id: TransactionId,
        expected_paid: Decimal,
        payment: PaymentRecord,
    ) -> Result<Transaction, StoreError>;

    /// Set the status to `new`, provided it is still `expected`.
    fn update_status(
        &self,
        settlement_id: SettlementId,
        expected: SettlementStatus,
        new: SettlementStatus,
    ) -> Result<Settlement, StoreError>;

    /// Settlements the user created or participates in, restricted to `statuses`.
    fn settlements_for_user(&self, user: &UserId, statuses: &[SettlementStatus]) -> Result<Vec<Settlement>, StoreError>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn insert_settlement(&self, settlement: Settlement, transactions: Vec<Transaction>) -> Result<(), StoreError> {
        (**self).insert_settlement(settlement, transactions)
    }

    fn settlement(&self, id: SettlementId) -> Result<Option<Settlement>, StoreError> {
        (**self).settlement(id)
    }

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        (**self).transaction(id)
    }

    fn transactions_for(&self, settlement_id: SettlementId) -> Result<Vec<Transaction>, StoreError> {
        (**self).transactions_for(settlement_id)
    }

    fn payments_for(&self, transaction_id: TransactionId) -> Result<Vec<PaymentRecord>, StoreError> {
        (**self).payments_for(transaction_id)
    }

    fn snapshot(&self, settlement_id: SettlementId) -> Result<Option<SettlementDetails>, StoreError> {
        (**self).snapshot(settlement_id)
    }

    fn apply_payment(
        &self,
        transaction_id: TransactionId,
        expected_paid: Decimal,
        payment: PaymentRecord,
    ) -> Result<Transaction, StoreError> {
        (**self).apply_payment(transaction_id, expected_paid, payment)
    }

    fn update_status(
        &self,
        settlement_id: SettlementId,
        expected: SettlementStatus,
        new: SettlementStatus,
    ) -> Result<Settlement, StoreError> {
        (**self).update_status(settlement_id, expected, new)
    }

    fn settlements_for_user(&self, user: &UserId, statuses: &[SettlementStatus]) -> Result<Vec<Settlement>, StoreError> {
        (**self).settlements_for_user(user, statuses)
    }
}

#[derive(Debug, Default)]
struct Tables {
    settlements: HashMap<SettlementId, Settlement>,
    transactions: HashMap<TransactionId, Transaction>,
    by_settlement: HashMap<SettlementId, Vec<TransactionId>>,
    payments: HashMap<TransactionId, Vec<PaymentRecord>>,
}

impl Tables {
    fn transactions_for(&self, settlement_id: SettlementId) -> Vec<Transaction> {
        self.by_settlement
            .get(&settlement_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.transactions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// In-memory ledger store.
///
/// Intended for tests, the CLI and embedding. A single lock guards all
/// tables, so every method observes and produces a consistent state.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    tables: RwLock<Tables>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn insert_settlement(&self, settlement: Settlement, transactions: Vec<Transaction>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(Self::poisoned)?;

        // Check everything before touching any table.
        if tables.settlements.contains_key(&settlement.id) {
            return Err(StoreError::Duplicate {
                entity: "settlement",
                id: settlement.id.to_string(),
            });
        }
        for tx in &transactions {
            if tables.transactions.contains_key(&tx.id) {
                return Err(StoreError::Duplicate {
                    entity: "transaction",
                    id: tx.id.to_string(),
                });
            }
        }

        let ids: Vec<TransactionId> = transactions.iter().map(|t| t.id).collect();
        for tx in transactions {
            tables.transactions.insert(tx.id, tx);
        }
        tables.by_settlement.insert(settlement.id, ids);
        tables.settlements.insert(settlement.id, settlement);
        Ok(())
    }

    fn settlement(&self, id: SettlementId) -> Result<Option<Settlement>, StoreError> {
        let tables = self.tables.read().map_err(Self::poisoned)?;
        Ok(tables.settlements.get(&id).cloned())
    }

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        let tables = self.tables.read().map_err(Self::poisoned)?;
        Ok(tables.transactions.get(&id).cloned())
    }

    fn transactions_for(&self, settlement_id: SettlementId) -> Result<Vec<Transaction>, StoreError> {
        let tables = self.tables.read().map_err(Self::poisoned)?;
        Ok(tables.transactions_for(settlement_id))
    }

    fn payments_for(&self, transaction_id: TransactionId) -> Result<Vec<PaymentRecord>, StoreError> {
        let tables = self.tables.read().map_err(Self::poisoned)?;
        Ok(tables.payments.get(&transaction_id).cloned().unwrap_or_default())
    }

    fn snapshot(&self, settlement_id: SettlementId) -> Result<Option<SettlementDetails>, StoreError> {
        let tables = self.tables.read().map_err(Self::poisoned)?;
        Ok(tables.settlements.get(&settlement_id).map(|settlement| SettlementDetails {
            settlement: settlement.clone(),
            transactions: tables.transactions_for(settlement_id),
        }))
    }

    fn apply_payment(
        &self,
        transaction_id: TransactionId,
        expected_paid: Decimal,
        payment: PaymentRecord,
    ) -> Result<Transaction, StoreError> {
        let mut guard = self.tables.write().map_err(Self::poisoned)?;
        let tables = &mut *guard;

        let tx = tables
            .transactions
            .get_mut(&transaction_id)
            .ok_or_else(|| StoreError::Missing {
                entity: "transaction",
                id: transaction_id.to_string(),
            })?;

        let parent_open = tables
            .settlements
            .get(&tx.settlement_id)
            .map(|s| !s.status.is_terminal())
            .unwrap_or(false);
        if !parent_open {
            return Err(StoreError::Conflict {
                entity: "settlement",
                id: tx.settlement_id.to_string(),
            });
        }

        if tx.amount_paid != expected_paid || payment.amount > tx.amount_remaining() {
            return Err(StoreError::Conflict {
                entity: "transaction",
                id: transaction_id.to_string(),
            });
        }

        tx.apply_payment(payment.amount, payment.paid_at);
        let updated = tx.clone();
        tables.payments.entry(transaction_id).or_default().push(payment);
        Ok(updated)
    }

    fn update_status(
        &self,
        settlement_id: SettlementId,
        expected: SettlementStatus,
        new: SettlementStatus,
    ) -> Result<Settlement, StoreError> {
        let mut tables = self.tables.write().map_err(Self::poisoned)?;
        let settlement = tables
            .settlements
            .get_mut(&settlement_id)
            .ok_or_else(|| StoreError::Missing {
                entity: "settlement",
                id: settlement_id.to_string(),
            })?;

        if settlement.status != expected {
            return Err(StoreError::Conflict {
                entity: "settlement",
                id: settlement_id.to_string(),
            });
        }
        settlement.status = new;
        Ok(settlement.clone())
    }

    fn settlements_for_user(&self, user: &UserId, statuses: &[SettlementStatus]) -> Result<Vec<Settlement>, StoreError> {
        let tables = self.tables.read().map_err(Self::poisoned)?;
        let mut found: Vec<Settlement> = tables
            .settlements
            .values()
            .filter(|s| statuses.contains(&s.status) && s.involves(user))
            .cloned()
            .collect();
        found.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(found)
    }
}
