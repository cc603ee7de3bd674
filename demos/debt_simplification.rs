//! Debt simplification across several settlements.
//!
//! Four flatmates create overlapping settlements. The optimizer then
//! collapses the outstanding transactions into fewer direct transfers.

use expense_settlement::prelude::*;
use rust_decimal_macros::dec;

fn equal(members: &[&str]) -> SplitPolicy {
    SplitPolicy::Equal {
        participants: members.iter().map(|m| ParticipantRef::new(*m)).collect(),
    }
}

fn main() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║  expense-settlement: Debt Simplification     ║");
    println!("╚══════════════════════════════════════════════╝\n");

    let engine = SettlementEngine::new(InMemoryLedgerStore::new());
    let expenses = [
        ("ada", "Rent top-up", dec!(120.00), &["ada", "bo", "cam", "dee"][..]),
        ("bo", "Groceries", dec!(86.40), &["bo", "ada", "cam"][..]),
        ("cam", "Internet", dec!(60.00), &["cam", "ada", "bo", "dee"][..]),
        ("dee", "Cleaning", dec!(45.00), &["dee", "ada", "cam"][..]),
    ];

    for (creator, title, total, members) in expenses {
        engine
            .create_settlement(NewSettlement {
                title: title.to_string(),
                description: None,
                total_amount: total,
                currency: CurrencyCode::default(),
                creator_id: UserId::new(creator),
                split: equal(members),
                due_date: None,
            })
            .expect("valid settlement");
        println!("  {:<4} paid {:>7} for {}", creator, total, title);
    }
    println!();

    let optimal = engine
        .calculate_optimal_settlement(&UserId::new("ada"))
        .expect("optimization");

    println!("Outstanding debts:  {}", optimal.raw_count);
    println!("Transfers needed:   {}", optimal.optimized_count);
    println!("Transfers saved:    {}", optimal.savings);
    println!("Gross:              {}", optimal.gross_total);
    println!("Net:                {}", optimal.net_total);
    println!();
    for t in &optimal.transfers {
        println!("  {} → {}: {}", t.from, t.to, t.amount);
    }

    // The same engine works on free-standing debts too.
    println!("\n━━━ Free-standing Debts ━━━\n");
    let debts: DebtSet = vec![
        DebtEdge::new(UserId::new("ada"), UserId::new("bo"), dec!(25)),
        DebtEdge::new(UserId::new("bo"), UserId::new("cam"), dec!(25)),
        DebtEdge::new(UserId::new("cam"), UserId::new("dee"), dec!(10)),
    ]
    .into_iter()
    .collect();
    println!("{}", DebtNettingOptimizer::optimize(&debts));
}
