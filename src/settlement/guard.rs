use crate::config::EngineLimits;
use crate::core::money::{checked_sum, is_cent_precise, within};
use crate::core::user::UserId;
use crate::core::validation::ValidationError;
use crate::settlement::error::SettlementError;
use crate::settlement::model::{NewSettlement, Settlement};
use crate::settlement::status::SettlementStatus;
use crate::split::policy::{SplitPolicy, SplitType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

/// Stateless validation and authorization checks.
///
/// Shared by the engine and any API layer in front of it, so malformed
/// requests can be rejected before anything reaches the store. None of the
/// checks mutate state.
#[derive(Debug, Clone, Default)]
pub struct SettlementGuard {
    limits: EngineLimits,
}

impl SettlementGuard {
    pub fn new(limits: EngineLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Run every shape check for a new settlement.
    pub fn validate_new_settlement(&self, input: &NewSettlement, now: DateTime<Utc>) -> Result<(), ValidationError> {
        self.validate_title(&input.title)?;
        self.validate_total(input.total_amount)?;
        self.validate_participants(&input.split.user_ids())?;
        self.validate_due_date(input.due_date, now)?;
        self.precheck_split(input.total_amount, &input.split)
    }

    pub fn validate_title(&self, title: &str) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > self.limits.max_title_len {
            return Err(ValidationError::TitleTooLong {
                len,
                max: self.limits.max_title_len,
            });
        }
        Ok(())
    }

    pub fn validate_total(&self, total: Decimal) -> Result<(), ValidationError> {
        if total <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                field: "total amount",
                amount: total,
            });
        }
        if total > self.limits.max_total_amount {
            return Err(ValidationError::AmountTooLarge {
                field: "total amount",
                amount: total,
                max: self.limits.max_total_amount,
            });
        }
        if !is_cent_precise(total) {
            return Err(ValidationError::ExcessPrecision {
                field: "total amount",
                amount: total,
            });
        }
        Ok(())
    }

    /// Parse a split type name as received at the API boundary.
    pub fn parse_split_type(&self, value: &str) -> Result<SplitType, ValidationError> {
        value.parse()
    }

    pub fn validate_participants(&self, user_ids: &[&UserId]) -> Result<(), ValidationError> {
        if user_ids.is_empty() {
            return Err(ValidationError::EmptyParticipants);
        }
        if user_ids.len() > self.limits.max_participants {
            return Err(ValidationError::TooManyParticipants {
                count: user_ids.len(),
                max: self.limits.max_participants,
            });
        }
        let mut seen = HashSet::with_capacity(user_ids.len());
        for user in user_ids {
            if user.is_blank() {
                return Err(ValidationError::BlankUserId);
            }
            if !seen.insert(*user) {
                return Err(ValidationError::DuplicateParticipant {
                    user_id: (*user).clone(),
                });
            }
        }
        Ok(())
    }

    pub fn validate_due_date(&self, due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<(), ValidationError> {
        match due_date {
            Some(due_date) if due_date < now => Err(ValidationError::DueDateInPast { due_date, now }),
            _ => Ok(()),
        }
    }

    pub fn validate_payment_amount(&self, amount: Decimal, remaining: Decimal) -> Result<(), ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                field: "payment amount",
                amount,
            });
        }
        if !is_cent_precise(amount) {
            return Err(ValidationError::ExcessPrecision {
                field: "payment amount",
                amount,
            });
        }
        if amount > remaining {
            return Err(ValidationError::PaymentExceedsRemaining { amount, remaining });
        }
        Ok(())
    }

    pub fn validate_transition(&self, current: SettlementStatus, requested: SettlementStatus) -> Result<(), SettlementError> {
        if current.can_transition_to(requested) {
            Ok(())
        } else {
            Err(SettlementError::InvalidTransition { current, requested })
        }
    }

    /// Only the creator may perform creator-level mutations.
    pub fn authorize_creator(&self, settlement: &Settlement, requester: &UserId) -> Result<(), SettlementError> {
        if &settlement.creator_id != requester {
            return Err(SettlementError::Authorization {
                requester: requester.to_string(),
                settlement_id: settlement.id.to_string(),
            });
        }
        Ok(())
    }

    /// Terminal settlements accept no further payments.
    pub fn ensure_accepts_payments(&self, settlement: &Settlement) -> Result<(), SettlementError> {
        if settlement.status.is_terminal() {
            return Err(SettlementError::InvalidTransition {
                current: settlement.status,
                requested: SettlementStatus::Partial,
            });
        }
        Ok(())
    }

    /// Sum checks mirroring the split calculator, for early rejection.
    pub fn precheck_split(&self, total: Decimal, policy: &SplitPolicy) -> Result<(), ValidationError> {
        let tolerance = self.limits.tolerance;
        match policy {
            SplitPolicy::Equal { .. } => Ok(()),
            SplitPolicy::Percentage { participants } => {
                let sum = sum_of("percentage", participants.iter().map(|p| p.percentage))?;
                if !within(sum, dec!(100), tolerance) {
                    return Err(ValidationError::PercentageSum { sum });
                }
                Ok(())
            }
            SplitPolicy::Custom { participants } => {
                let sum = sum_of("custom amount", participants.iter().map(|p| p.amount))?;
                if !within(sum, total, tolerance) {
                    return Err(ValidationError::CustomSum { sum, total });
                }
                Ok(())
            }
            SplitPolicy::Weighted { participants } => {
                let sum = sum_of("weight", participants.iter().map(|p| p.effective_weight()))?;
                if sum <= Decimal::ZERO {
                    return Err(ValidationError::ZeroTotalWeight);
                }
                Ok(())
            }
            SplitPolicy::Itemized(split) => {
                let items = split.items.iter().map(|i| i.amount);
                let derived = sum_of("item amount", items.chain(split.shared_items.iter().map(|i| i.amount)))?;
                if !within(derived, total, tolerance) {
                    return Err(ValidationError::ItemizedTotalMismatch {
                        derived,
                        supplied: total,
                    });
                }
                Ok(())
            }
        }
    }
}

fn sum_of(
    field: &'static str,
    amounts: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, ValidationError> {
    checked_sum(amounts).ok_or(ValidationError::ArithmeticOverflow { field })
}
