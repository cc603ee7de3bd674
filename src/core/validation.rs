use crate::core::user::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed or out-of-range input.
///
/// Raised by the split calculator and by the settlement guard. Every
/// variant carries the offending values so the caller can show them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("at least one participant is required")]
    EmptyParticipants,

    #[error("{count} participants exceeds the limit of {max}")]
    TooManyParticipants { count: usize, max: usize },

    #[error("participant {user_id} appears more than once")]
    DuplicateParticipant { user_id: UserId },

    #[error("participant user id must not be blank")]
    BlankUserId,

    #[error("{field} must be positive, got {amount}")]
    NonPositiveAmount { field: &'static str, amount: Decimal },

    #[error("{field} {amount} exceeds the limit of {max}")]
    AmountTooLarge {
        field: &'static str,
        amount: Decimal,
        max: Decimal,
    },

    #[error("{field} {amount} has more than two decimal places")]
    ExcessPrecision { field: &'static str, amount: Decimal },

    #[error("{field} for {user_id} must not be negative, got {value}")]
    NegativeShare {
        field: &'static str,
        user_id: UserId,
        value: Decimal,
    },

    #[error("share of {amount} for {user_id} falls outside 0..={total}")]
    ShareOutOfRange {
        user_id: UserId,
        amount: Decimal,
        total: Decimal,
    },

    #[error("{field} overflows the representable amount range")]
    ArithmeticOverflow { field: &'static str },

    #[error("percentages must sum to 100, got {sum}")]
    PercentageSum { sum: Decimal },

    #[error("custom amounts sum to {sum}, expected {total}")]
    CustomSum { sum: Decimal, total: Decimal },

    #[error("total weight must be positive")]
    ZeroTotalWeight,

    #[error("itemized split needs at least one item")]
    NoItems,

    #[error("item '{item}' is assigned to {user_id}, who is not a participant")]
    UnknownItemAssignee { item: String, user_id: UserId },

    #[error("items sum to {derived}, but the settlement total is {supplied}")]
    ItemizedTotalMismatch { derived: Decimal, supplied: Decimal },

    #[error("unknown split type '{value}'")]
    UnknownSplitType { value: String },

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("title is {len} characters, limit is {max}")]
    TitleTooLong { len: usize, max: usize },

    #[error("due date {due_date} is in the past (now {now})")]
    DueDateInPast {
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("payment of {amount} exceeds the remaining {remaining}")]
    PaymentExceedsRemaining { amount: Decimal, remaining: Decimal },
}
