//! Split policies and the calculator that applies them.

pub mod calculator;
pub mod policy;
