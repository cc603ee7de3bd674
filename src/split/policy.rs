use crate::core::user::UserId;
use crate::core::validation::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allocation policy governing how a total is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Percentage,
    Custom,
    Weighted,
    Itemized,
}

impl SplitType {
    pub const ALL: [SplitType; 5] = [
        SplitType::Equal,
        SplitType::Percentage,
        SplitType::Custom,
        SplitType::Weighted,
        SplitType::Itemized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Percentage => "percentage",
            SplitType::Custom => "custom",
            SplitType::Weighted => "weighted",
            SplitType::Itemized => "itemized",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SplitType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownSplitType {
                value: s.to_string(),
            })
    }
}

/// A participant named in an equal or itemized split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ParticipantRef {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            name: None,
        }
    }

    pub fn named(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageShare {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub percentage: Decimal,
}

impl PercentageShare {
    pub fn new(user_id: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            user_id: UserId::new(user_id),
            name: None,
            percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomShare {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub amount: Decimal,
}

impl CustomShare {
    pub fn new(user_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            user_id: UserId::new(user_id),
            name: None,
            amount,
        }
    }
}

/// Weighted share; a missing weight counts as 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedShare {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub weight: Option<Decimal>,
}

impl WeightedShare {
    pub fn new(user_id: impl Into<String>, weight: Option<Decimal>) -> Self {
        Self {
            user_id: UserId::new(user_id),
            name: None,
            weight,
        }
    }

    pub fn effective_weight(&self) -> Decimal {
        self.weight.unwrap_or(Decimal::ONE)
    }
}

/// An item charged entirely to one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedItem {
    pub description: String,
    pub amount: Decimal,
    pub assigned_to: UserId,
}

/// An item split equally across every participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedItem {
    pub description: String,
    pub amount: Decimal,
}

/// Receipt-style split: the total is whatever the items add up to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemizedSplit {
    pub participants: Vec<ParticipantRef>,
    #[serde(default)]
    pub items: Vec<AssignedItem>,
    #[serde(default)]
    pub shared_items: Vec<SharedItem>,
}

impl ItemizedSplit {
    pub fn assigned_total(&self) -> Decimal {
        self.items.iter().map(|i| i.amount).sum()
    }

    pub fn shared_total(&self) -> Decimal {
        self.shared_items.iter().map(|i| i.amount).sum()
    }

    /// Sum of every assigned and shared item.
    pub fn derived_total(&self) -> Decimal {
        self.assigned_total() + self.shared_total()
    }
}

/// A split policy together with the fields that policy requires.
///
/// ```
/// use expense_settlement::split::policy::{SplitPolicy, SplitType};
///
/// let policy: SplitPolicy = serde_json::from_str(r#"{
///     "type": "weighted",
///     "participants": [
///         { "user_id": "alice", "weight": "2" },
///         { "user_id": "bob" }
///     ]
/// }"#).unwrap();
/// assert_eq!(policy.split_type(), SplitType::Weighted);
/// assert_eq!(policy.participant_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitPolicy {
    Equal { participants: Vec<ParticipantRef> },
    Percentage { participants: Vec<PercentageShare> },
    Custom { participants: Vec<CustomShare> },
    Weighted { participants: Vec<WeightedShare> },
    Itemized(ItemizedSplit),
}

impl SplitPolicy {
    pub fn split_type(&self) -> SplitType {
        match self {
            SplitPolicy::Equal { .. } => SplitType::Equal,
            SplitPolicy::Percentage { .. } => SplitType::Percentage,
            SplitPolicy::Custom { .. } => SplitType::Custom,
            SplitPolicy::Weighted { .. } => SplitType::Weighted,
            SplitPolicy::Itemized(_) => SplitType::Itemized,
        }
    }

    /// Participant ids in declaration order.
    pub fn user_ids(&self) -> Vec<&UserId> {
        match self {
            SplitPolicy::Equal { participants } => participants.iter().map(|p| &p.user_id).collect(),
            SplitPolicy::Percentage { participants } => {
                participants.iter().map(|p| &p.user_id).collect()
            }
            SplitPolicy::Custom { participants } => participants.iter().map(|p| &p.user_id).collect(),
            SplitPolicy::Weighted { participants } => {
                participants.iter().map(|p| &p.user_id).collect()
            }
            SplitPolicy::Itemized(split) => split.participants.iter().map(|p| &p.user_id).collect(),
        }
    }

    pub fn participant_count(&self) -> usize {
        self.user_ids().len()
    }
}
