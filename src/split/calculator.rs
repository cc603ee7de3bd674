use crate::core::money::{checked_sum, floor_money, round_money, within, MONEY_TOLERANCE};
use crate::core::user::UserId;
use crate::core::validation::ValidationError;
use crate::split::policy::{
    CustomShare, ItemizedSplit, ParticipantRef, PercentageShare, SplitPolicy, WeightedShare,
};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const HUNDRED: Decimal = dec!(100);

/// A participant with the share computed for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub amount: Decimal,
    /// Share of the total, for display only.
    pub percentage: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
}

impl Participant {
    fn new(user_id: &UserId, name: &Option<String>, amount: Decimal, percentage: Decimal) -> Self {
        Self {
            user_id: user_id.clone(),
            name: name.clone(),
            amount,
            percentage,
            weight: None,
        }
    }
}

/// Result of dividing a total among participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitResult {
    pub participants: Vec<Participant>,
    pub total_amount: Decimal,
}

impl SplitResult {
    /// Sum of the computed participant amounts.
    pub fn allocated_total(&self) -> Decimal {
        self.participants.iter().map(|p| p.amount).sum()
    }

    pub fn amount_for(&self, user: &UserId) -> Option<Decimal> {
        self.participants
            .iter()
            .find(|p| &p.user_id == user)
            .map(|p| p.amount)
    }
}

/// Divides a total among participants under a [`SplitPolicy`].
///
/// Pure and stateless. For equal, percentage, custom and weighted splits
/// the participant amounts always add up to the total at cent precision:
/// whatever rounding leaves over is assigned to the first participant.
/// If that correction would push any share below zero or above the total,
/// the split is rejected with [`ValidationError::ShareOutOfRange`].
///
/// # Examples
///
/// ```
/// use expense_settlement::split::calculator::SplitCalculator;
/// use expense_settlement::split::policy::ParticipantRef;
/// use rust_decimal_macros::dec;
///
/// let people = vec![ParticipantRef::new("a"), ParticipantRef::new("b"), ParticipantRef::new("c")];
/// let split = SplitCalculator::equal(dec!(100.00), &people).unwrap();
///
/// let amounts: Vec<_> = split.participants.iter().map(|p| p.amount).collect();
/// assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
/// ```
pub struct SplitCalculator;

impl SplitCalculator {
    /// Compute the split described by `policy`, comparing sums within
    /// [`MONEY_TOLERANCE`].
    ///
    /// For an itemized policy the total is derived from the items; `total`
    /// must agree with it within tolerance.
    pub fn calculate(total: Decimal, policy: &SplitPolicy) -> Result<SplitResult, ValidationError> {
        Self::calculate_with_tolerance(total, policy, MONEY_TOLERANCE)
    }

    /// Same as [`calculate`](Self::calculate) with a caller-chosen tolerance
    /// for the percentage, custom and itemized sum checks.
    pub fn calculate_with_tolerance(
        total: Decimal,
        policy: &SplitPolicy,
        tolerance: Decimal,
    ) -> Result<SplitResult, ValidationError> {
        let result = match policy {
            SplitPolicy::Equal { participants } => Self::equal(total, participants),
            SplitPolicy::Percentage { participants } => {
                Self::percentage_within(total, participants, tolerance)
            }
            SplitPolicy::Custom { participants } => Self::custom_within(total, participants, tolerance),
            SplitPolicy::Weighted { participants } => Self::weighted(total, participants),
            SplitPolicy::Itemized(split) => {
                let result = Self::itemized(split)?;
                if !within(result.total_amount, total, tolerance) {
                    return Err(ValidationError::ItemizedTotalMismatch {
                        derived: result.total_amount,
                        supplied: total,
                    });
                }
                Ok(result)
            }
        }?;
        debug!(
            "{} split of {} across {} participants",
            policy.split_type(),
            result.total_amount,
            result.participants.len()
        );
        Ok(result)
    }

    /// Everyone pays `floor(total / n)`; the leftover cents go to the first participant.
    pub fn equal(total: Decimal, participants: &[ParticipantRef]) -> Result<SplitResult, ValidationError> {
        ensure_positive_total(total)?;
        ensure_non_empty(participants.len())?;

        let n = Decimal::from(participants.len());
        let share = floor_money(div("total amount", total, n)?);
        let remainder = total - mul("total amount", share, n)?;
        let percentage = round_money(HUNDRED / n);

        let mut shares: Vec<Participant> = participants
            .iter()
            .map(|p| Participant::new(&p.user_id, &p.name, share, percentage))
            .collect();
        shares[0].amount += remainder;

        Ok(SplitResult {
            participants: shares,
            total_amount: total,
        })
    }

    /// Each participant pays their percentage of the total.
    pub fn percentage(
        total: Decimal,
        participants: &[PercentageShare],
    ) -> Result<SplitResult, ValidationError> {
        Self::percentage_within(total, participants, MONEY_TOLERANCE)
    }

    fn percentage_within(
        total: Decimal,
        participants: &[PercentageShare],
        tolerance: Decimal,
    ) -> Result<SplitResult, ValidationError> {
        ensure_positive_total(total)?;
        ensure_non_empty(participants.len())?;

        for p in participants {
            ensure_not_negative("percentage", &p.user_id, p.percentage)?;
        }
        let sum = sum_of("percentage", participants.iter().map(|p| p.percentage))?;
        if !within(sum, HUNDRED, tolerance) {
            return Err(ValidationError::PercentageSum { sum });
        }

        let mut shares = participants
            .iter()
            .map(|p| {
                let scaled = mul("percentage share", total, p.percentage)?;
                let amount = round_money(div("percentage share", scaled, HUNDRED)?);
                Ok(Participant::new(&p.user_id, &p.name, amount, p.percentage))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        absorb_residual(total, &mut shares)?;
        ensure_shares_in_range(total, &shares)?;

        Ok(SplitResult {
            participants: shares,
            total_amount: total,
        })
    }

    /// Participants state their own amounts, which must add up to the total.
    pub fn custom(total: Decimal, participants: &[CustomShare]) -> Result<SplitResult, ValidationError> {
        Self::custom_within(total, participants, MONEY_TOLERANCE)
    }

    fn custom_within(
        total: Decimal,
        participants: &[CustomShare],
        tolerance: Decimal,
    ) -> Result<SplitResult, ValidationError> {
        ensure_positive_total(total)?;
        ensure_non_empty(participants.len())?;

        for p in participants {
            ensure_not_negative("amount", &p.user_id, p.amount)?;
        }
        let sum = sum_of("custom amount", participants.iter().map(|p| p.amount))?;
        if !within(sum, total, tolerance) {
            return Err(ValidationError::CustomSum { sum, total });
        }

        let mut shares = participants
            .iter()
            .map(|p| {
                let amount = round_money(p.amount);
                let scaled = mul("custom amount", amount, HUNDRED)?;
                let percentage = round_money(div("custom amount", scaled, total)?);
                Ok(Participant::new(&p.user_id, &p.name, amount, percentage))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        absorb_residual(total, &mut shares)?;
        ensure_shares_in_range(total, &shares)?;

        Ok(SplitResult {
            participants: shares,
            total_amount: total,
        })
    }

    /// Participants pay in proportion to their weights.
    pub fn weighted(
        total: Decimal,
        participants: &[WeightedShare],
    ) -> Result<SplitResult, ValidationError> {
        ensure_positive_total(total)?;
        ensure_non_empty(participants.len())?;

        for p in participants {
            ensure_not_negative("weight", &p.user_id, p.effective_weight())?;
        }
        let total_weight = sum_of("weight", participants.iter().map(|p| p.effective_weight()))?;
        if total_weight <= Decimal::ZERO {
            return Err(ValidationError::ZeroTotalWeight);
        }

        let mut shares = participants
            .iter()
            .map(|p| {
                let weight = p.effective_weight();
                let scaled = mul("weighted share", total, weight)?;
                let amount = round_money(div("weighted share", scaled, total_weight)?);
                let percentage = round_money(div("weight", mul("weight", weight, HUNDRED)?, total_weight)?);
                let mut share = Participant::new(&p.user_id, &p.name, amount, percentage);
                share.weight = Some(weight);
                Ok(share)
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        absorb_residual(total, &mut shares)?;
        ensure_shares_in_range(total, &shares)?;

        Ok(SplitResult {
            participants: shares,
            total_amount: total,
        })
    }

    /// Assigned items go to their owner; shared items are split equally.
    ///
    /// The total is the sum of all items. Each participant's portion of the
    /// shared items is rounded to cents and no residual correction is
    /// applied, so the amounts may differ from the total by a few cents.
    pub fn itemized(split: &ItemizedSplit) -> Result<SplitResult, ValidationError> {
        ensure_non_empty(split.participants.len())?;
        if split.items.is_empty() && split.shared_items.is_empty() {
            return Err(ValidationError::NoItems);
        }

        let members: HashSet<&UserId> = split.participants.iter().map(|p| &p.user_id).collect();
        for item in &split.items {
            if item.amount <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveAmount {
                    field: "item amount",
                    amount: item.amount,
                });
            }
            if !members.contains(&item.assigned_to) {
                return Err(ValidationError::UnknownItemAssignee {
                    item: item.description.clone(),
                    user_id: item.assigned_to.clone(),
                });
            }
        }
        for item in &split.shared_items {
            if item.amount <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveAmount {
                    field: "shared item amount",
                    amount: item.amount,
                });
            }
        }

        let assigned_total = sum_of("item amount", split.items.iter().map(|i| i.amount))?;
        let shared_total = sum_of("shared item amount", split.shared_items.iter().map(|i| i.amount))?;
        let total = assigned_total
            .checked_add(shared_total)
            .ok_or(ValidationError::ArithmeticOverflow { field: "item amount" })?;
        let shared_per_head = round_money(div(
            "shared item amount",
            shared_total,
            Decimal::from(split.participants.len()),
        )?);

        let shares = split
            .participants
            .iter()
            .map(|p| {
                let assigned = sum_of(
                    "item amount",
                    split
                        .items
                        .iter()
                        .filter(|i| i.assigned_to == p.user_id)
                        .map(|i| i.amount),
                )?;
                let amount = round_money(
                    assigned
                        .checked_add(shared_per_head)
                        .ok_or(ValidationError::ArithmeticOverflow { field: "item amount" })?,
                );
                let scaled = mul("item amount", amount, HUNDRED)?;
                let percentage = round_money(div("item amount", scaled, total)?);
                Ok(Participant::new(&p.user_id, &p.name, amount, percentage))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(SplitResult {
            participants: shares,
            total_amount: total,
        })
    }
}

fn ensure_positive_total(total: Decimal) -> Result<(), ValidationError> {
    if total <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount {
            field: "total amount",
            amount: total,
        });
    }
    Ok(())
}

fn ensure_non_empty(count: usize) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::EmptyParticipants);
    }
    Ok(())
}

fn ensure_not_negative(field: &'static str, user_id: &UserId, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeShare {
            field,
            user_id: user_id.clone(),
            value,
        });
    }
    Ok(())
}

fn mul(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, ValidationError> {
    a.checked_mul(b).ok_or(ValidationError::ArithmeticOverflow { field })
}

fn div(field: &'static str, a: Decimal, b: Decimal) -> Result<Decimal, ValidationError> {
    a.checked_div(b).ok_or(ValidationError::ArithmeticOverflow { field })
}

fn sum_of(
    field: &'static str,
    amounts: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, ValidationError> {
    checked_sum(amounts).ok_or(ValidationError::ArithmeticOverflow { field })
}

/// Force the rounding leftover onto the first participant so the amounts
/// add up to `total` exactly.
fn absorb_residual(total: Decimal, shares: &mut [Participant]) -> Result<(), ValidationError> {
    let allocated = sum_of("total amount", shares.iter().map(|p| p.amount))?;
    if let Some(first) = shares.first_mut() {
        first.amount = total
            .checked_sub(allocated)
            .and_then(|residual| first.amount.checked_add(residual))
            .ok_or(ValidationError::ArithmeticOverflow { field: "total amount" })?;
    }
    Ok(())
}

/// Every share must lie in `0..=total`.
fn ensure_shares_in_range(total: Decimal, shares: &[Participant]) -> Result<(), ValidationError> {
    match shares.iter().find(|p| p.amount < Decimal::ZERO || p.amount > total) {
        Some(p) => Err(ValidationError::ShareOutOfRange {
            user_id: p.user_id.clone(),
            amount: p.amount,
            total,
        }),
        None => Ok(()),
    }
}
