use approx::assert_relative_eq;
use expense_settlement::core::balance::BalanceSheet;
use expense_settlement::core::debt::{DebtEdge, DebtSet};
use expense_settlement::core::money::CurrencyCode;
use expense_settlement::core::user::UserId;
use expense_settlement::graph::debt_graph::DebtGraph;
use expense_settlement::optimization::netting::DebtNettingOptimizer;
use expense_settlement::settlement::engine::SettlementEngine;
use expense_settlement::settlement::model::{NewPayment, NewSettlement, PaymentMethod};
use expense_settlement::settlement::store::{InMemoryLedgerStore, LedgerStore};
use expense_settlement::split::calculator::SplitCalculator;
use expense_settlement::split::policy::{
    CustomShare, ParticipantRef, PercentageShare, SplitPolicy, WeightedShare,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Generate a random user from a small pool (to increase netting opportunities).
fn arb_user() -> impl Strategy<Value = UserId> {
    prop::sample::select(vec![
        UserId::new("A"),
        UserId::new("B"),
        UserId::new("C"),
        UserId::new("D"),
        UserId::new("E"),
        UserId::new("F"),
        UserId::new("G"),
    ])
}

/// Whole-unit debt amounts (1 to 9,999).
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(Decimal::from)
}

/// Cent-precise totals (0.01 to 100,000.00).
fn arb_total() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generate a random debt (ensuring payer != payee).
fn arb_debt() -> impl Strategy<Value = DebtEdge> {
    (arb_user(), arb_user(), arb_amount()).prop_filter_map("payer must differ from payee", |(from, to, amount)| {
        if from == to {
            None
        } else {
            Some(DebtEdge::new(from, to, amount))
        }
    })
}

/// Generate a random debt set of 1..40 debts.
fn arb_debt_set() -> impl Strategy<Value = DebtSet> {
    prop::collection::vec(arb_debt(), 1..40).prop_map(|debts| debts.into_iter().collect::<DebtSet>())
}

fn participants(n: usize) -> Vec<ParticipantRef> {
    (0..n).map(|i| ParticipantRef::new(format!("p{}", i))).collect()
}

/// Percentages in hundredths that add up to exactly 100.
fn arb_percentages() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(1i64..1_000i64, 1..12).prop_map(|raw| {
        let sum: i64 = raw.iter().sum();
        let mut hundredths: Vec<i64> = raw.iter().map(|r| r * 10_000 / sum).collect();
        let allocated: i64 = hundredths.iter().sum();
        hundredths[0] += 10_000 - allocated;
        hundredths.into_iter().map(|h| Decimal::new(h, 2)).collect()
    })
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Equal splits add up to the total exactly.
    //
    // Every participant pays floor(total / n) and the leftover cents go
    // to the first participant, never spread or lost.
    // ===================================================================
    #[test]
    fn equal_split_sums_exactly(total in arb_total(), n in 1usize..=50) {
        let people = participants(n);
        let split = SplitCalculator::equal(total, &people).unwrap();
        prop_assert_eq!(split.allocated_total(), total);

        let base = split.participants[1..].iter().map(|p| p.amount).max();
        if let Some(base) = base {
            for p in &split.participants[1..] {
                prop_assert_eq!(p.amount, base);
            }
            prop_assert!(split.participants[0].amount >= base);
        }
    }

    // ===================================================================
    // INVARIANT 2: Percentage splits add up to the total exactly.
    // ===================================================================
    #[test]
    fn percentage_split_sums_exactly(total in arb_total(), percentages in arb_percentages()) {
        let shares: Vec<PercentageShare> = percentages
            .iter()
            .enumerate()
            .map(|(i, pct)| PercentageShare::new(format!("p{}", i), *pct))
            .collect();
        let split = SplitCalculator::percentage(total, &shares).unwrap();
        prop_assert_eq!(split.allocated_total(), total);
    }

    // ===================================================================
    // INVARIANT 3: Weighted splits add up to the total exactly.
    // ===================================================================
    #[test]
    fn weighted_split_sums_exactly(
        total in arb_total(),
        weights in prop::collection::vec(prop::option::of(1i64..20i64), 1..20),
    ) {
        let shares: Vec<WeightedShare> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| WeightedShare::new(format!("p{}", i), w.map(Decimal::from)))
            .collect();
        let split = SplitCalculator::weighted(total, &shares).unwrap();
        prop_assert_eq!(split.allocated_total(), total);
    }

    // ===================================================================
    // INVARIANT 3b: Custom splits add up to the total exactly.
    //
    // Stated amounts may miss the total by up to one cent; the first
    // participant absorbs the difference and everyone else pays exactly
    // what they stated.
    // ===================================================================
    #[test]
    fn custom_split_sums_exactly(
        first in 2i64..500_000i64,
        rest in prop::collection::vec(0i64..500_000i64, 0..11),
        offset in -1i64..=1i64,
    ) {
        let cents: Vec<i64> = std::iter::once(first).chain(rest).collect();
        let total = Decimal::new(cents.iter().sum::<i64>() + offset, 2);
        let shares: Vec<CustomShare> = cents
            .iter()
            .enumerate()
            .map(|(i, c)| CustomShare::new(format!("p{}", i), Decimal::new(*c, 2)))
            .collect();

        let split = SplitCalculator::custom(total, &shares).unwrap();
        prop_assert_eq!(split.allocated_total(), total);
        for (share, stated) in split.participants[1..].iter().zip(&cents[1..]) {
            prop_assert_eq!(share.amount, Decimal::new(*stated, 2));
        }
    }

    // ===================================================================
    // INVARIANT 3c: Every accepted share lies within 0..=total.
    //
    // Tiny totals, zero weights and percentages one hundredth off 100 are
    // where the residual correction could overshoot; such splits must be
    // rejected rather than produce a negative or oversized share.
    // ===================================================================
    #[test]
    fn shares_stay_within_total(
        total_cents in 1i64..500i64,
        weights in prop::collection::vec(0i64..4i64, 1..10),
        percentages in arb_percentages(),
        skew in 0i64..=1i64,
    ) {
        let total = Decimal::new(total_cents, 2);
        let weighted: Vec<WeightedShare> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| WeightedShare::new(format!("p{}", i), Some(Decimal::from(*w))))
            .collect();
        let last = percentages.len() - 1;
        let skewed: Vec<PercentageShare> = percentages
            .iter()
            .enumerate()
            .map(|(i, pct)| {
                let pct = if i == last { *pct + Decimal::new(skew, 2) } else { *pct };
                PercentageShare::new(format!("p{}", i), pct)
            })
            .collect();

        let results = [
            SplitCalculator::weighted(total, &weighted),
            SplitCalculator::percentage(total, &skewed),
        ];
        for split in results.iter().flatten() {
            prop_assert_eq!(split.allocated_total(), total);
            for p in &split.participants {
                prop_assert!(
                    p.amount >= Decimal::ZERO && p.amount <= total,
                    "share {} for {} outside 0..={}", p.amount, p.user_id, total
                );
            }
        }
    }

    // ===================================================================
    // INVARIANT 4: Simplified transfers reproduce every net balance.
    //
    // Replaying the transfers must give each user the same net balance
    // as the input debts, within one cent.
    // ===================================================================
    #[test]
    fn netting_preserves_balances(set in arb_debt_set()) {
        let plan = DebtNettingOptimizer::optimize(&set);
        let expected = BalanceSheet::from_edges(set.edges());
        prop_assert!(plan.matches_balances(&expected));
        prop_assert!(plan.is_valid());
    }

    // ===================================================================
    // INVARIANT 5: Transfer count ≤ creditors + debtors - 1.
    //
    // Each greedy step retires at least one side, so the plan is bounded
    // by the number of users with a non-zero balance.
    // ===================================================================
    #[test]
    fn transfer_count_is_bounded(set in arb_debt_set()) {
        let plan = DebtNettingOptimizer::optimize(&set);
        let active = plan.participant_count();
        prop_assert!(plan.transfer_count() <= active.saturating_sub(1));
    }

    // ===================================================================
    // INVARIANT 6: Per-component netting never adds transfers.
    //
    // Simplifying each connected group on its own keeps the plan no
    // larger than the raw debt list.
    // ===================================================================
    #[test]
    fn component_netting_never_exceeds_raw(set in arb_debt_set()) {
        let graph = DebtGraph::from_debts(&set);
        let plan = DebtNettingOptimizer::optimize_components(&graph);
        prop_assert!(plan.transfer_count() <= plan.raw_count());
        prop_assert!(plan.matches_balances(&BalanceSheet::from_edges(set.edges())));
    }

    // ===================================================================
    // INVARIANT 7: Net total ≤ gross total, and savings ratio in [0, 1].
    // ===================================================================
    #[test]
    fn net_never_exceeds_gross(set in arb_debt_set()) {
        let plan = DebtNettingOptimizer::optimize(&set);
        prop_assert!(plan.net_total() <= plan.gross_total());
        let ratio = plan.savings_ratio();
        prop_assert!((0.0..=1.0).contains(&ratio), "ratio {} out of range", ratio);
    }

    // ===================================================================
    // INVARIANT 8: Netting is deterministic.
    // ===================================================================
    #[test]
    fn netting_is_deterministic(set in arb_debt_set()) {
        let first = DebtNettingOptimizer::optimize(&set);
        let second = DebtNettingOptimizer::optimize(&set);
        prop_assert_eq!(first.transfers(), second.transfers());
    }

    // ===================================================================
    // INVARIANT 9: Paid never exceeds owed, whatever the payment sequence.
    // ===================================================================
    #[test]
    fn payments_never_overdraw(payments in prop::collection::vec(1i64..4_000i64, 1..15)) {
        let engine = SettlementEngine::new(InMemoryLedgerStore::new());
        let created = engine
            .create_settlement(NewSettlement {
                title: "Groceries".to_string(),
                description: None,
                total_amount: Decimal::new(10_000, 2),
                currency: CurrencyCode::default(),
                creator_id: UserId::new("a"),
                split: SplitPolicy::Equal { participants: participants(2) },
                due_date: None,
            })
            .unwrap();
        let tx = created.transactions[1].id;

        for cents in payments {
            let _ = engine.record_payment(tx, NewPayment::new(Decimal::new(cents, 2), PaymentMethod::Cash));
            let current = engine.store().transaction(tx).unwrap().unwrap();
            prop_assert!(current.amount_paid <= current.amount_owed);
        }
    }

    // ===================================================================
    // INVARIANT 10: Reading a summary twice gives the same answer.
    // ===================================================================
    #[test]
    fn summary_is_idempotent(
        totals in prop::collection::vec(arb_total(), 1..5),
        payments in prop::collection::vec(1i64..5_000i64, 0..8),
    ) {
        let engine = SettlementEngine::new(InMemoryLedgerStore::new());
        let creators = ["p0", "p1", "p2"];
        let mut owed_rows = Vec::new();
        for (i, total) in totals.iter().enumerate() {
            let created = engine
                .create_settlement(NewSettlement {
                    title: format!("Outing {}", i),
                    description: None,
                    total_amount: *total,
                    currency: CurrencyCode::default(),
                    creator_id: UserId::new(creators[i % creators.len()]),
                    split: SplitPolicy::Equal { participants: participants(3) },
                    due_date: None,
                })
                .unwrap();
            owed_rows.extend(created.transactions.iter().map(|t| t.id));
        }
        for (i, cents) in payments.into_iter().enumerate() {
            let tx = owed_rows[i % owed_rows.len()];
            let _ = engine.record_payment(tx, NewPayment::new(Decimal::new(cents, 2), PaymentMethod::Cash));
        }

        for user in ["p0", "p1", "p2"] {
            let first = engine.get_settlement_summary(&UserId::new(user)).unwrap();
            let second = engine.get_settlement_summary(&UserId::new(user)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}

/// Savings ratio of a pure cycle is exactly 1.
#[test]
fn cycle_savings_ratio_is_one() {
    let set: DebtSet = vec![
        DebtEdge::new(UserId::new("A"), UserId::new("B"), Decimal::from(40)),
        DebtEdge::new(UserId::new("B"), UserId::new("C"), Decimal::from(40)),
        DebtEdge::new(UserId::new("C"), UserId::new("A"), Decimal::from(40)),
    ]
    .into_iter()
    .collect();
    let plan = DebtNettingOptimizer::optimize(&set);
    assert_eq!(plan.transfer_count(), 0);
    assert_relative_eq!(plan.savings_ratio(), 1.0);
}

/// Partial netting: A owes B 100, B owes A 60. Ratio = 120 / 160.
#[test]
fn bilateral_savings_ratio() {
    let set: DebtSet = vec![
        DebtEdge::new(UserId::new("A"), UserId::new("B"), Decimal::from(100)),
        DebtEdge::new(UserId::new("B"), UserId::new("A"), Decimal::from(60)),
    ]
    .into_iter()
    .collect();
    let plan = DebtNettingOptimizer::optimize(&set);
    assert_eq!(plan.net_total(), Decimal::from(40));
    assert_relative_eq!(plan.savings_ratio(), 0.75, epsilon = 1e-12);
}
