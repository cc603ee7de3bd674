//! Debt graph representation.

pub mod debt_graph;
