use crate::core::balance::BalanceSheet;
use crate::core::debt::{DebtEdge, DebtSet};
use crate::core::user::UserId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// A directed graph of who owes whom.
///
/// Parallel debts between the same ordered pair are aggregated into one
/// weighted edge; the input edges are retained so the gross figures
/// reflect what was actually submitted.
///
/// # Examples
///
/// ```
/// use expense_settlement::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let mut graph = DebtGraph::new();
/// graph.add_debt(DebtEdge::new(UserId::new("A"), UserId::new("B"), dec!(30)));
/// graph.add_debt(DebtEdge::new(UserId::new("A"), UserId::new("B"), dec!(20)));
///
/// assert_eq!(graph.user_count(), 2);
/// assert_eq!(graph.debt_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DebtGraph {
    debts: DebtSet,
    graph: DiGraph<UserId, Decimal>,
    nodes: HashMap<UserId, NodeIndex>,
}

impl DebtGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_debts(debts: &DebtSet) -> Self {
        let mut graph = Self::new();
        for edge in debts.edges() {
            graph.add_debt(edge.clone());
        }
        graph
    }

    fn node(&mut self, user: &UserId) -> NodeIndex {
        if let Some(idx) = self.nodes.get(user) {
            return *idx;
        }
        let idx = self.graph.add_node(user.clone());
        self.nodes.insert(user.clone(), idx);
        idx
    }

    /// Add a single debt, aggregating with any existing edge in the same direction.
    pub fn add_debt(&mut self, edge: DebtEdge) {
        let from = self.node(edge.from());
        let to = self.node(edge.to());
        match self.graph.find_edge(from, to) {
            Some(existing) => self.graph[existing] += edge.amount(),
            None => {
                self.graph.add_edge(from, to, edge.amount());
            }
        }
        self.debts.add(edge);
    }

    pub fn user_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of debts as submitted, before aggregation.
    pub fn debt_count(&self) -> usize {
        self.debts.len()
    }

    /// Number of distinct (from, to) pairs.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    pub fn gross_total(&self) -> Decimal {
        self.debts.gross_total()
    }

    pub fn debts(&self) -> &DebtSet {
        &self.debts
    }

    /// Aggregated amount `from` owes `to`.
    pub fn edge_amount(&self, from: &UserId, to: &UserId) -> Decimal {
        match (self.nodes.get(from), self.nodes.get(to)) {
            (Some(a), Some(b)) => self
                .graph
                .find_edge(*a, *b)
                .map(|e| self.graph[e])
                .unwrap_or(Decimal::ZERO),
            _ => Decimal::ZERO,
        }
    }

    /// Net balance per user.
    pub fn balances(&self) -> BalanceSheet {
        let mut sheet = BalanceSheet::new();
        for edge in self.graph.edge_references() {
            sheet.record(
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                *edge.weight(),
            );
        }
        sheet
    }

    /// Split the graph into weakly connected components.
    ///
    /// Each component holds the aggregated edges among its users. Components
    /// are ordered by their smallest user id.
    pub fn components(&self) -> Vec<DebtSet> {
        let mut union = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            union.union(edge.source().index(), edge.target().index());
        }

        let mut groups: HashMap<usize, Vec<DebtEdge>> = HashMap::new();
        for edge in self.graph.edge_references() {
            let root = union.find(edge.source().index());
            groups.entry(root).or_default().push(DebtEdge::new(
                self.graph[edge.source()].clone(),
                self.graph[edge.target()].clone(),
                *edge.weight(),
            ));
        }

        let mut ordered: BTreeMap<UserId, DebtSet> = BTreeMap::new();
        for (_, mut edges) in groups {
            edges.sort_by(|a, b| (a.from(), a.to()).cmp(&(b.from(), b.to())));
            let set: DebtSet = edges.into_iter().collect();
            if let Some(first) = set.users().into_iter().next() {
                ordered.insert(first, set);
            }
        }
        ordered.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn edge(from: &str, to: &str, amount: Decimal) -> DebtEdge {
        DebtEdge::new(UserId::new(from), UserId::new(to), amount)
    }

    #[test]
    fn test_graph_basic() {
        let mut graph = DebtGraph::new();
        graph.add_debt(edge("A", "B", dec!(100)));
        graph.add_debt(edge("B", "C", dec!(200)));

        assert_eq!(graph.user_count(), 3);
        assert_eq!(graph.debt_count(), 2);
        assert_eq!(graph.gross_total(), dec!(300));
    }

    #[test]
    fn test_edge_aggregation() {
        let mut graph = DebtGraph::new();
        graph.add_debt(edge("A", "B", dec!(100)));
        graph.add_debt(edge("A", "B", dec!(50)));
        graph.add_debt(edge("B", "A", dec!(10)));

        let a = UserId::new("A");
        let b = UserId::new("B");
        assert_eq!(graph.edge_amount(&a, &b), dec!(150));
        assert_eq!(graph.edge_amount(&b, &a), dec!(10));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.balances().balance(&a), dec!(-140));
    }

    #[test]
    fn test_components_are_separated() {
        let mut graph = DebtGraph::new();
        graph.add_debt(edge("C", "D", dec!(5)));
        graph.add_debt(edge("A", "B", dec!(10)));
        graph.add_debt(edge("B", "E", dec!(4)));

        let components = graph.components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].users(), vec![UserId::new("A"), UserId::new("B"), UserId::new("E")]);
        assert_eq!(components[1].gross_total(), dec!(5));
    }

    #[test]
    fn test_empty_graph() {
        let graph = DebtGraph::new();
        assert!(graph.is_empty());
        assert!(graph.components().is_empty());
        assert!(graph.balances().is_empty());
    }
}
