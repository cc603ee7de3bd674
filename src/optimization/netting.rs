use crate::core::balance::BalanceSheet;
use crate::core::debt::DebtSet;
use crate::core::money::MONEY_TOLERANCE;
use crate::core::user::UserId;
use crate::graph::debt_graph::DebtGraph;
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point-to-point payment in a simplified plan: `from` pays `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: UserId,
    pub to: UserId,
    pub amount: Decimal,
}

/// Output of debt simplification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NettingPlan {
    transfers: Vec<Transfer>,
    /// Net balances implied by the input debts.
    balances: BalanceSheet,
    /// Sum of the input debts.
    gross_total: Decimal,
    /// Number of input debts.
    raw_count: usize,
}

impl NettingPlan {
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    pub fn raw_count(&self) -> usize {
        self.raw_count
    }

    /// Input balances the plan was computed from.
    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    pub fn gross_total(&self) -> Decimal {
        self.gross_total
    }

    /// Total money moved by the plan.
    pub fn net_total(&self) -> Decimal {
        self.transfers.iter().map(|t| t.amount).sum()
    }

    pub fn savings(&self) -> Decimal {
        self.gross_total - self.net_total()
    }

    /// Fraction of gross money movement avoided, in `[0, 1]`.
    pub fn savings_ratio(&self) -> f64 {
        if self.gross_total == Decimal::ZERO {
            return 0.0;
        }
        let ratio = self.savings() / self.gross_total;
        ratio.to_f64().unwrap_or(0.0)
    }

    /// Users with a balance beyond tolerance.
    pub fn participant_count(&self) -> usize {
        self.balances
            .balances()
            .values()
            .filter(|b| b.abs() > MONEY_TOLERANCE)
            .count()
    }

    /// Balances obtained by replaying the transfers.
    pub fn resulting_balances(&self) -> BalanceSheet {
        let mut sheet = BalanceSheet::new();
        for t in &self.transfers {
            sheet.record(&t.from, &t.to, t.amount);
        }
        sheet
    }

    /// The transfers reproduce `expected` per user within tolerance.
    pub fn matches_balances(&self, expected: &BalanceSheet) -> bool {
        self.resulting_balances().matches(expected)
    }

    /// The transfers reproduce the input balances.
    pub fn is_valid(&self) -> bool {
        self.matches_balances(&self.balances)
    }
}

/// Greedy debt simplifier.
///
/// Reduces a set of pairwise debts to a smaller set of transfers with the
/// same net effect on every participant.
///
/// # Algorithm
///
/// 1. Net balance per user = owed to them minus what they owe.
/// 2. Creditors have balance > 0.01, debtors < -0.01; the rest are dropped.
/// 3. Both lists are sorted by absolute amount, largest first.
/// 4. The current largest creditor is matched with the current largest
///    debtor for `min(credit, debt)`, emitting one transfer. Whichever side
///    reaches zero is advanced.
/// 5. Stops when either list is exhausted.
///
/// At most `creditors + debtors - 1` transfers are emitted. This is a
/// heuristic; it does not always find the fewest possible transfers.
pub struct DebtNettingOptimizer;

impl DebtNettingOptimizer {
    /// Simplify all debts as one pool.
    ///
    /// ```
    /// use expense_settlement::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let debts: DebtSet = vec![
    ///     DebtEdge::new(UserId::new("A"), UserId::new("B"), dec!(30)),
    ///     DebtEdge::new(UserId::new("B"), UserId::new("C"), dec!(30)),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let plan = DebtNettingOptimizer::optimize(&debts);
    /// assert_eq!(plan.transfer_count(), 1);
    /// assert_eq!(plan.transfers()[0].from, UserId::new("A"));
    /// assert_eq!(plan.transfers()[0].to, UserId::new("C"));
    /// ```
    pub fn optimize(debts: &DebtSet) -> NettingPlan {
        let balances = BalanceSheet::from_edges(debts.edges());
        let transfers = Self::settle_balances(&balances);
        debug!(
            "netted {} debts across {} users into {} transfers",
            debts.len(),
            balances.len(),
            transfers.len()
        );
        NettingPlan {
            transfers,
            balances,
            gross_total: debts.gross_total(),
            raw_count: debts.len(),
        }
    }

    /// Simplify each weakly connected component of the graph on its own.
    ///
    /// Users who share no chain of debts are never matched with each other,
    /// so the plan never holds more transfers than the graph holds debts.
    pub fn optimize_components(graph: &DebtGraph) -> NettingPlan {
        let components = graph.components();
        let mut transfers = Vec::new();
        for component in &components {
            let balances = BalanceSheet::from_edges(component.edges());
            transfers.extend(Self::settle_balances(&balances));
        }
        debug!(
            "netted {} debts in {} components into {} transfers",
            graph.debt_count(),
            components.len(),
            transfers.len()
        );
        NettingPlan {
            transfers,
            balances: graph.balances(),
            gross_total: graph.gross_total(),
            raw_count: graph.debt_count(),
        }
    }

    /// Greedy largest-first matching of creditors against debtors.
    pub fn settle_balances(balances: &BalanceSheet) -> Vec<Transfer> {
        // BTreeMap iteration plus stable sorts give ties a fixed order by user id.
        let mut creditors: Vec<(UserId, Decimal)> = balances
            .balances()
            .iter()
            .filter(|(_, b)| **b > MONEY_TOLERANCE)
            .map(|(u, b)| (u.clone(), *b))
            .collect();
        let mut debtors: Vec<(UserId, Decimal)> = balances
            .balances()
            .iter()
            .filter(|(_, b)| **b < -MONEY_TOLERANCE)
            .map(|(u, b)| (u.clone(), b.abs()))
            .collect();

        creditors.sort_by(|a, b| b.1.cmp(&a.1));
        debtors.sort_by(|a, b| b.1.cmp(&a.1));

        let mut transfers = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < creditors.len() && j < debtors.len() {
            let settled = creditors[i].1.min(debtors[j].1);
            transfers.push(Transfer {
                from: debtors[j].0.clone(),
                to: creditors[i].0.clone(),
                amount: settled,
            });
            creditors[i].1 -= settled;
            debtors[j].1 -= settled;

            if creditors[i].1 < MONEY_TOLERANCE {
                i += 1;
            }
            if debtors[j].1 < MONEY_TOLERANCE {
                j += 1;
            }
        }
        transfers
    }
}

impl std::fmt::Display for NettingPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Simplified Debts ===")?;
        writeln!(f, "Debts In:       {}", self.raw_count)?;
        writeln!(f, "Transfers Out:  {}", self.transfer_count())?;
        writeln!(f, "Gross Total:    {}", self.gross_total)?;
        writeln!(f, "Net Total:      {}", self.net_total())?;
        writeln!(f, "Savings:        {}", self.savings())?;
        writeln!(f, "Savings %:      {:.1}%", self.savings_ratio() * 100.0)?;
        writeln!(f, "Valid:          {}", self.is_valid())?;

        if !self.transfers.is_empty() {
            writeln!(f, "\nTransfers:")?;
            for t in &self.transfers {
                writeln!(f, "  {} -> {}: {}", t.from, t.to, t.amount)?;
            }
        }
        Ok(())
    }
}
