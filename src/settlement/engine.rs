use crate::config::EngineLimits;
use crate::core::debt::DebtEdge;
use crate::core::ids::{PaymentId, SettlementId, TransactionId};
use crate::core::user::UserId;
use crate::graph::debt_graph::DebtGraph;
use crate::optimization::netting::DebtNettingOptimizer;
use crate::settlement::error::SettlementError;
use crate::settlement::guard::SettlementGuard;
use crate::settlement::model::{NewPayment, NewSettlement, PaymentRecord, Settlement, Transaction};
use crate::settlement::notify::{NoopNotifier, SettlementNotifier};
use crate::settlement::status::{SettlementStatus, TransactionStatus};
use crate::settlement::store::{LedgerStore, SettlementDetails, StoreError};
use crate::settlement::summary::{OptimalSettlement, SettlementSummary, StatusCounts};
use crate::split::calculator::SplitCalculator;
use crate::split::policy::SplitPolicy;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of a successful [`SettlementEngine::record_payment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub transaction: Transaction,
    pub payment: PaymentRecord,
    /// Settlement status after recomputation.
    pub settlement_status: SettlementStatus,
}

/// Orchestrates the settlement lifecycle over a [`LedgerStore`].
///
/// Holds no per-request state: every operation reads what it needs from the
/// store and writes back through compare-and-set updates, so one engine can
/// be shared across threads.
///
/// # Examples
///
/// ```
/// use expense_settlement::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let engine = SettlementEngine::new(InMemoryLedgerStore::new());
/// let created = engine
///     .create_settlement(NewSettlement {
///         title: "Cabin weekend".to_string(),
///         description: None,
///         total_amount: dec!(300.00),
///         currency: CurrencyCode::new("USD"),
///         creator_id: UserId::new("alice"),
///         split: SplitPolicy::Equal {
///             participants: vec![ParticipantRef::new("alice"), ParticipantRef::new("bob")],
///         },
///         due_date: None,
///     })
///     .unwrap();
///
/// assert_eq!(created.transactions.len(), 2);
/// assert_eq!(created.settlement.status, SettlementStatus::Pending);
/// ```
pub struct SettlementEngine<S: LedgerStore> {
    store: S,
    guard: SettlementGuard,
    notifier: Arc<dyn SettlementNotifier>,
}

impl<S: LedgerStore> SettlementEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, EngineLimits::default())
    }

    pub fn with_limits(store: S, limits: EngineLimits) -> Self {
        Self {
            store,
            guard: SettlementGuard::new(limits),
            notifier: Arc::new(NoopNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn SettlementNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn guard(&self) -> &SettlementGuard {
        &self.guard
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_settlement(&self, input: NewSettlement) -> Result<SettlementDetails, SettlementError> {
        self.create_settlement_at(input, Utc::now())
    }

    /// Validate, split and persist a settlement with one transaction per
    /// participant, as of `now`.
    pub fn create_settlement_at(
        &self,
        input: NewSettlement,
        now: DateTime<Utc>,
    ) -> Result<SettlementDetails, SettlementError> {
        self.guard.validate_new_settlement(&input, now)?;
        let split = SplitCalculator::calculate_with_tolerance(
            input.total_amount,
            &input.split,
            self.guard.limits().tolerance,
        )?;

        let settlement = Settlement {
            id: SettlementId::new(),
            title: input.title,
            description: input.description,
            // Itemized splits carry the item-derived total.
            total_amount: split.total_amount,
            currency: input.currency,
            split_type: input.split.split_type(),
            creator_id: input.creator_id,
            participants: split.participants,
            due_date: input.due_date,
            status: SettlementStatus::Pending,
            created_at: now,
        };
        let transactions: Vec<Transaction> = settlement
            .participants
            .iter()
            .map(|p| Transaction::new(settlement.id, p.user_id.clone(), p.amount, now))
            .collect();

        self.store
            .insert_settlement(settlement.clone(), transactions.clone())?;
        info!(
            "created settlement {} '{}' for {} {} across {} participants",
            settlement.id,
            settlement.title,
            settlement.total_amount,
            settlement.currency,
            transactions.len()
        );

        Ok(SettlementDetails {
            settlement,
            transactions,
        })
    }

    /// Record a payment against one participant's transaction and
    /// recompute the settlement status.
    pub fn record_payment(
        &self,
        transaction_id: TransactionId,
        payment: NewPayment,
    ) -> Result<PaymentOutcome, SettlementError> {
        let tx = self
            .store
            .transaction(transaction_id)?
            .ok_or_else(|| not_found("transaction", transaction_id))?;
        let settlement = self
            .store
            .settlement(tx.settlement_id)?
            .ok_or_else(|| not_found("settlement", tx.settlement_id))?;

        self.guard.ensure_accepts_payments(&settlement)?;
        self.guard
            .validate_payment_amount(payment.amount, tx.amount_remaining())?;

        let record = PaymentRecord {
            id: PaymentId::new(),
            transaction_id,
            amount: payment.amount,
            method: payment.method,
            reference: payment.reference,
            paid_at: Utc::now(),
        };
        let updated = self
            .store
            .apply_payment(transaction_id, tx.amount_paid, record.clone())?;
        info!(
            "recorded payment {} of {} on transaction {} ({} remaining)",
            record.id,
            record.amount,
            transaction_id,
            updated.amount_remaining()
        );

        if let Err(e) = self.notifier.payment_recorded(&updated, &record) {
            warn!("payment notification for {} failed: {}", record.id, e);
        }

        let settlement = self.recompute_status(updated.settlement_id)?;
        Ok(PaymentOutcome {
            transaction: updated,
            payment: record,
            settlement_status: settlement.status,
        })
    }

    /// Cancel an open settlement. Only its creator may do so.
    ///
    /// Outstanding transaction balances are left as they are and treated as
    /// void from here on.
    pub fn cancel_settlement(&self, id: SettlementId, requester: &UserId) -> Result<Settlement, SettlementError> {
        for _ in 0..SettlementStatus::ALL.len() {
            let settlement = self
                .store
                .settlement(id)?
                .ok_or_else(|| not_found("settlement", id))?;
            self.guard.authorize_creator(&settlement, requester)?;
            self.guard
                .validate_transition(settlement.status, SettlementStatus::Cancelled)?;

            match self
                .store
                .update_status(id, settlement.status, SettlementStatus::Cancelled)
            {
                Ok(cancelled) => {
                    info!("settlement {} cancelled by {}", id, requester);
                    if let Err(e) = self.notifier.settlement_cancelled(&cancelled) {
                        warn!("cancellation notification for {} failed: {}", id, e);
                    }
                    return Ok(cancelled);
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!("settlement {} changed during cancel, re-reading", id);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(SettlementError::ConcurrencyConflict {
            entity: "settlement",
            id: id.to_string(),
        })
    }

    pub fn get_settlement(&self, id: SettlementId) -> Result<SettlementDetails, SettlementError> {
        self.store
            .snapshot(id)?
            .ok_or_else(|| not_found("settlement", id))
    }

    pub fn payment_history(&self, transaction_id: TransactionId) -> Result<Vec<PaymentRecord>, SettlementError> {
        if self.store.transaction(transaction_id)?.is_none() {
            return Err(not_found("transaction", transaction_id));
        }
        Ok(self.store.payments_for(transaction_id)?)
    }

    /// Amounts owed to and by `user`, plus settlement counts per status.
    pub fn get_settlement_summary(&self, user: &UserId) -> Result<SettlementSummary, SettlementError> {
        let settlements = self.store.settlements_for_user(user, &SettlementStatus::ALL)?;

        let mut counts = StatusCounts::default();
        let mut created_count = 0;
        let mut owed_by = Decimal::ZERO;
        let mut owed_to = Decimal::ZERO;

        for settlement in &settlements {
            counts.record(settlement.status);
            let is_creator = &settlement.creator_id == user;
            if is_creator {
                created_count += 1;
            }
            if settlement.status.is_terminal() {
                continue;
            }
            let Some(details) = self.store.snapshot(settlement.id)? else {
                continue;
            };
            for tx in &details.transactions {
                if tx.user_id == settlement.creator_id {
                    continue;
                }
                if is_creator {
                    owed_to += tx.amount_remaining();
                } else if &tx.user_id == user {
                    owed_by += tx.amount_remaining();
                }
            }
        }

        Ok(SettlementSummary {
            user_id: user.clone(),
            counts,
            created_count,
            total_owed_by_user: owed_by,
            total_owed_to_user: owed_to,
        })
    }

    /// Simplify the outstanding debts across every open settlement `user`
    /// touches.
    ///
    /// Each unpaid transaction is a debt from its owner to the settlement
    /// creator. The debts are netted per connected group of users.
    pub fn calculate_optimal_settlement(&self, user: &UserId) -> Result<OptimalSettlement, SettlementError> {
        let settlements = self.store.settlements_for_user(user, &SettlementStatus::OPEN)?;

        let mut graph = DebtGraph::new();
        for settlement in &settlements {
            let Some(details) = self.store.snapshot(settlement.id)? else {
                continue;
            };
            if details.settlement.status.is_terminal() {
                continue;
            }
            let creator = &details.settlement.creator_id;
            for tx in details
                .transactions
                .iter()
                .filter(|tx| tx.status != TransactionStatus::Completed && &tx.user_id != creator)
            {
                let remaining = tx.amount_remaining();
                if remaining <= Decimal::ZERO {
                    warn!(
                        "skipping transaction {} in settlement {}: {} remaining while {}",
                        tx.id, settlement.id, remaining, tx.status
                    );
                    continue;
                }
                match DebtEdge::try_new(tx.user_id.clone(), creator.clone(), remaining) {
                    Ok(edge) => graph.add_debt(edge),
                    Err(e) => warn!("skipping transaction {} in settlement {}: {}", tx.id, settlement.id, e),
                }
            }
        }

        let plan = DebtNettingOptimizer::optimize_components(&graph);
        debug!(
            "optimal settlement for {}: {} debts -> {} transfers",
            user,
            plan.raw_count(),
            plan.transfer_count()
        );

        Ok(OptimalSettlement {
            user_id: user.clone(),
            raw_count: plan.raw_count(),
            optimized_count: plan.transfer_count(),
            savings: plan.raw_count().saturating_sub(plan.transfer_count()),
            gross_total: plan.gross_total(),
            net_total: plan.net_total(),
            transfers: plan.transfers().to_vec(),
        })
    }

    /// Bring the settlement status in line with its transactions.
    ///
    /// Completed once every transaction is completed, partial once any
    /// payment exists, otherwise unchanged. Reads a consistent snapshot and
    /// writes with compare-and-set; a lost race re-reads. Status only moves
    /// forward, so this settles within a few rounds.
    fn recompute_status(&self, id: SettlementId) -> Result<Settlement, SettlementError> {
        for _ in 0..SettlementStatus::ALL.len() {
            let details = self
                .store
                .snapshot(id)?
                .ok_or_else(|| not_found("settlement", id))?;
            let current = details.settlement.status;
            if current.is_terminal() {
                return Ok(details.settlement);
            }

            let target = if details.all_completed() {
                SettlementStatus::Completed
            } else if details.any_paid() {
                SettlementStatus::Partial
            } else {
                current
            };
            if target == current {
                return Ok(details.settlement);
            }
            self.guard.validate_transition(current, target)?;

            match self.store.update_status(id, current, target) {
                Ok(updated) => {
                    info!("settlement {} moved {} -> {}", id, current, target);
                    if target == SettlementStatus::Completed {
                        if let Err(e) = self.notifier.settlement_completed(&updated) {
                            warn!("completion notification for {} failed: {}", id, e);
                        }
                    }
                    return Ok(updated);
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!("settlement {} status moved concurrently, re-reading", id);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(SettlementError::ConcurrencyConflict {
            entity: "settlement",
            id: id.to_string(),
        })
    }
}

/// Split a total without persisting anything.
pub fn preview_split(
    guard: &SettlementGuard,
    total: Decimal,
    policy: &SplitPolicy,
) -> Result<crate::split::calculator::SplitResult, SettlementError> {
    guard.validate_total(total)?;
    guard.validate_participants(&policy.user_ids())?;
    guard.precheck_split(total, policy)?;
    Ok(SplitCalculator::calculate_with_tolerance(
        total,
        policy,
        guard.limits().tolerance,
    )?)
}

fn not_found(entity: &'static str, id: impl ToString) -> SettlementError {
    SettlementError::NotFound {
        entity,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::money::CurrencyCode;
    use crate::core::validation::ValidationError;
    use crate::settlement::model::PaymentMethod;
    use crate::settlement::notify::NotifyError;
    use crate::settlement::store::InMemoryLedgerStore;
    use crate::split::policy::{ParticipantRef, PercentageShare, SplitType};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    fn equal_split(creator: &str, members: &[&str], total: Decimal) -> NewSettlement {
        NewSettlement {
            title: "Trip".to_string(),
            description: None,
            total_amount: total,
            currency: CurrencyCode::new("USD"),
            creator_id: UserId::new(creator),
            split: SplitPolicy::Equal {
                participants: members.iter().map(|m| ParticipantRef::new(*m)).collect(),
            },
            due_date: None,
        }
    }

    fn engine() -> SettlementEngine<InMemoryLedgerStore> {
        SettlementEngine::new(InMemoryLedgerStore::new())
    }

    fn tx_for<'a>(details: &'a SettlementDetails, user: &str) -> &'a Transaction {
        details
            .transactions
            .iter()
            .find(|t| t.user_id.as_str() == user)
            .expect("participant transaction")
    }

    #[test]
    fn test_create_persists_transactions() {
        let engine = engine();
        let created = engine
            .create_settlement(equal_split("a", &["a", "b", "c"], dec!(100.00)))
            .unwrap();

        let owed: Vec<Decimal> = created.transactions.iter().map(|t| t.amount_owed).collect();
        assert_eq!(owed, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert!(created
            .transactions
            .iter()
            .all(|t| t.status == TransactionStatus::Pending && t.amount_paid.is_zero()));

        let stored = engine.get_settlement(created.settlement.id).unwrap();
        assert_eq!(stored, created);
    }

    #[test]
    fn test_create_rejects_bad_percentages_without_writing() {
        let engine = engine();
        let mut input = equal_split("a", &["a"], dec!(100));
        input.split = SplitPolicy::Percentage {
            participants: vec![PercentageShare::new("a", dec!(50)), PercentageShare::new("b", dec!(49.5))],
        };
        let err = engine.create_settlement(input).unwrap_err();
        assert_eq!(err, SettlementError::Validation(ValidationError::PercentageSum { sum: dec!(99.5) }));
        assert!(engine
            .store()
            .settlements_for_user(&UserId::new("a"), &SettlementStatus::ALL)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_create_rejects_share_pushed_negative() {
        let engine = engine();
        let mut input = equal_split("a", &["a"], dec!(1000));
        input.split = SplitPolicy::Percentage {
            participants: vec![PercentageShare::new("b", dec!(0)), PercentageShare::new("c", dec!(100.01))],
        };
        let err = engine.create_settlement(input).unwrap_err();
        assert_eq!(
            err,
            SettlementError::Validation(ValidationError::ShareOutOfRange {
                user_id: UserId::new("b"),
                amount: dec!(-0.10),
                total: dec!(1000),
            })
        );
        assert!(engine
            .store()
            .settlements_for_user(&UserId::new("a"), &SettlementStatus::ALL)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_limits_tolerance_reaches_calculator() {
        let limits = EngineLimits {
            tolerance: dec!(0.5),
            ..Default::default()
        };
        let engine = SettlementEngine::with_limits(InMemoryLedgerStore::new(), limits);
        let mut input = equal_split("a", &["a"], dec!(100));
        input.split = SplitPolicy::Percentage {
            participants: vec![PercentageShare::new("a", dec!(50)), PercentageShare::new("b", dec!(49.6))],
        };
        let created = engine.create_settlement(input).unwrap();
        let owed: Vec<Decimal> = created.transactions.iter().map(|t| t.amount_owed).collect();
        assert_eq!(owed, vec![dec!(50.40), dec!(49.60)]);

        let policy = SplitPolicy::Percentage {
            participants: vec![PercentageShare::new("a", dec!(50)), PercentageShare::new("b", dec!(49.6))],
        };
        assert!(preview_split(engine.guard(), dec!(100), &policy).is_ok());
        assert!(preview_split(&SettlementGuard::default(), dec!(100), &policy).is_err());
    }

    #[test]
    fn test_create_rejects_total_over_limit() {
        let err = engine()
            .create_settlement(equal_split("a", &["a", "b"], dec!(1_000_000.01)))
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Validation(ValidationError::AmountTooLarge { .. })
        ));
    }

    #[test]
    fn test_payment_lifecycle() {
        let engine = engine();
        let created = engine
            .create_settlement(equal_split("a", &["a", "b"], dec!(50)))
            .unwrap();
        let a = tx_for(&created, "a").id;
        let b = tx_for(&created, "b").id;

        let outcome = engine
            .record_payment(b, NewPayment::new(dec!(10), PaymentMethod::Cash))
            .unwrap();
        assert_eq!(outcome.transaction.status, TransactionStatus::Partial);
        assert_eq!(outcome.settlement_status, SettlementStatus::Partial);

        engine
            .record_payment(b, NewPayment::new(dec!(15), PaymentMethod::BankTransfer))
            .unwrap();
        let outcome = engine
            .record_payment(a, NewPayment::new(dec!(25), PaymentMethod::Card))
            .unwrap();
        assert_eq!(outcome.settlement_status, SettlementStatus::Completed);
        assert_eq!(engine.payment_history(b).unwrap().len(), 2);
    }

    #[test]
    fn test_overpayment_leaves_transaction_unchanged() {
        let engine = engine();
        let created = engine
            .create_settlement(equal_split("a", &["a", "b"], dec!(50)))
            .unwrap();
        let b = tx_for(&created, "b").clone();

        let err = engine
            .record_payment(b.id, NewPayment::new(dec!(25.01), PaymentMethod::Cash))
            .unwrap_err();
        assert!(matches!(
            err,
            SettlementError::Validation(ValidationError::PaymentExceedsRemaining { .. })
        ));
        assert_eq!(engine.store().transaction(b.id).unwrap().unwrap(), b);
        assert!(engine.payment_history(b.id).unwrap().is_empty());
    }

    #[test]
    fn test_payment_on_unknown_transaction() {
        let err = engine()
            .record_payment(TransactionId::new(), NewPayment::new(dec!(1), PaymentMethod::Cash))
            .unwrap_err();
        assert!(matches!(err, SettlementError::NotFound { entity: "transaction", .. }));
    }

    #[test]
    fn test_cancel_rules() {
        let engine = engine();
        let created = engine
            .create_settlement(equal_split("a", &["a", "b"], dec!(20)))
            .unwrap();
        let id = created.settlement.id;

        assert!(matches!(
            engine.cancel_settlement(id, &UserId::new("b")).unwrap_err(),
            SettlementError::Authorization { .. }
        ));

        let cancelled = engine.cancel_settlement(id, &UserId::new("a")).unwrap();
        assert_eq!(cancelled.status, SettlementStatus::Cancelled);

        assert_eq!(
            engine.cancel_settlement(id, &UserId::new("a")).unwrap_err(),
            SettlementError::InvalidTransition {
                current: SettlementStatus::Cancelled,
                requested: SettlementStatus::Cancelled,
            }
        );

        let b = tx_for(&created, "b").id;
        assert_eq!(
            engine
                .record_payment(b, NewPayment::new(dec!(1), PaymentMethod::Cash))
                .unwrap_err(),
            SettlementError::InvalidTransition {
                current: SettlementStatus::Cancelled,
                requested: SettlementStatus::Partial,
            }
        );
    }

    #[test]
    fn test_summary_and_optimization() {
        let engine = engine();
        // b owes a 30, c owes b 30.
        engine
            .create_settlement(equal_split("a", &["a", "b"], dec!(60)))
            .unwrap();
        engine
            .create_settlement(equal_split("b", &["b", "c"], dec!(60)))
            .unwrap();

        let summary = engine.get_settlement_summary(&UserId::new("b")).unwrap();
        assert_eq!(summary.total_owed_by_user, dec!(30));
        assert_eq!(summary.total_owed_to_user, dec!(30));
        assert_eq!(summary.net_balance(), Decimal::ZERO);
        assert_eq!(summary.counts.pending, 2);
        assert_eq!(summary.created_count, 1);

        let optimal = engine.calculate_optimal_settlement(&UserId::new("b")).unwrap();
        assert_eq!(optimal.raw_count, 2);
        assert_eq!(optimal.optimized_count, 1);
        assert_eq!(optimal.savings, 1);
        assert_eq!(optimal.transfers[0].from, UserId::new("c"));
        assert_eq!(optimal.transfers[0].to, UserId::new("a"));
    }

    #[test]
    fn test_optimization_skips_creator_and_anomalous_rows() {
        let engine = engine();
        let now = Utc::now();
        let settlement = Settlement {
            id: SettlementId::new(),
            title: "Imported".to_string(),
            description: None,
            total_amount: dec!(20),
            currency: CurrencyCode::new("USD"),
            split_type: SplitType::Custom,
            creator_id: UserId::new("a"),
            participants: vec![],
            due_date: None,
            status: SettlementStatus::Pending,
            created_at: now,
        };
        let own = Transaction::new(settlement.id, UserId::new("a"), dec!(5), now);
        let owing = Transaction::new(settlement.id, UserId::new("b"), dec!(15), now);
        let mut negative = Transaction::new(settlement.id, UserId::new("c"), dec!(-5), now);
        negative.status = TransactionStatus::Pending;
        engine
            .store()
            .insert_settlement(settlement, vec![own, owing, negative])
            .unwrap();

        let optimal = engine.calculate_optimal_settlement(&UserId::new("a")).unwrap();
        assert_eq!(optimal.raw_count, 1);
        assert_eq!(optimal.transfers.len(), 1);
        assert_eq!(optimal.transfers[0].from, UserId::new("b"));
        assert_eq!(optimal.transfers[0].to, UserId::new("a"));
        assert_eq!(optimal.transfers[0].amount, dec!(15));
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SettlementNotifier for Recorder {
        fn payment_recorded(&self, _: &Transaction, payment: &PaymentRecord) -> Result<(), NotifyError> {
            self.events.lock().unwrap().push(format!("paid {}", payment.amount));
            Err(NotifyError("mailer down".to_string()))
        }

        fn settlement_completed(&self, settlement: &Settlement) -> Result<(), NotifyError> {
            self.events.lock().unwrap().push(format!("completed {}", settlement.title));
            Ok(())
        }
    }

    #[test]
    fn test_notifier_failure_does_not_fail_payment() {
        let recorder = Arc::new(Recorder::default());
        let engine = SettlementEngine::new(InMemoryLedgerStore::new()).with_notifier(recorder.clone());
        let created = engine
            .create_settlement(equal_split("a", &["b"], dec!(12)))
            .unwrap();
        let b = tx_for(&created, "b").id;

        let outcome = engine
            .record_payment(b, NewPayment::new(dec!(12), PaymentMethod::MobileWallet))
            .unwrap();
        assert_eq!(outcome.settlement_status, SettlementStatus::Completed);
        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec!["paid 12".to_string(), "completed Trip".to_string()]
        );
    }

    #[test]
    fn test_preview_split() {
        let guard = SettlementGuard::default();
        let policy = SplitPolicy::Equal {
            participants: vec![ParticipantRef::new("a"), ParticipantRef::new("b")],
        };
        let result = preview_split(&guard, dec!(9.99), &policy).unwrap();
        assert_eq!(result.allocated_total(), dec!(9.99));
        assert!(preview_split(&guard, dec!(-1), &policy).is_err());
    }
}
