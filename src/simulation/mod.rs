//! Synthetic workloads for benches, property tests and the CLI.

pub mod debt_network;
