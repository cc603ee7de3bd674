//! Debt simplification.

pub mod netting;
