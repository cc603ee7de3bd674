//! Random debt networks.
//!
//! Generates groups of users owing each other random cent amounts, for
//! benchmarking the optimizer and exercising it from the command line.

use crate::core::debt::{DebtEdge, DebtSet};
use crate::core::user::UserId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Shape of a generated debt network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Number of distinct users.
    pub participant_count: usize,
    /// Number of debts to draw.
    pub debt_count: usize,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    /// Fixed seed for reproducible networks; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            participant_count: 10,
            debt_count: 30,
            min_amount: Decimal::ONE,
            max_amount: Decimal::from(500),
            seed: None,
        }
    }
}

/// User ids as the generator names them.
pub fn participant_ids(count: usize) -> Vec<UserId> {
    (0..count).map(|i| UserId::new(format!("user-{:03}", i))).collect()
}

/// Generate a random debt network.
///
/// Returns an empty set when fewer than two participants are configured.
/// Amounts are whole cents drawn uniformly from `[min_amount, max_amount]`.
pub fn generate_debt_network(config: &NetworkConfig) -> DebtSet {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let users = participant_ids(config.participant_count);
    let mut set = DebtSet::new();
    if users.len() < 2 {
        return set;
    }

    let min_cents = to_cents(config.min_amount).max(1);
    let max_cents = to_cents(config.max_amount).max(min_cents);

    for _ in 0..config.debt_count {
        let from = rng.gen_range(0..users.len());
        let mut to = rng.gen_range(0..users.len() - 1);
        if to >= from {
            to += 1;
        }
        let amount = Decimal::new(rng.gen_range(min_cents..=max_cents), 2);
        if let Ok(edge) = DebtEdge::try_new(users[from].clone(), users[to].clone(), amount) {
            set.add(edge);
        }
    }

    set
}

fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED).trunc().to_i64().unwrap_or(0)
}
