//! Foundational types: users, money, ids, debts, balances and validation errors.

pub mod balance;
pub mod debt;
pub mod ids;
pub mod money;
pub mod user;
pub mod validation;
