//! Dinner split walkthrough.
//!
//! Creates an itemized settlement for a group dinner, records payments
//! as friends pay back, and shows the status moving to completed.

use expense_settlement::prelude::*;
use expense_settlement::split::policy::{AssignedItem, SharedItem};
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  expense-settlement: Dinner Split        ║");
    println!("╚══════════════════════════════════════════╝\n");

    let engine = SettlementEngine::new(InMemoryLedgerStore::new());
    let maya = UserId::new("maya");
    let theo = UserId::new("theo");
    let ines = UserId::new("ines");

    // --- Scenario 1: Itemized bill ---
    println!("━━━ Scenario 1: Itemized Bill ━━━\n");

    let split = SplitPolicy::Itemized(ItemizedSplit {
        participants: vec![
            ParticipantRef::named("maya", "Maya"),
            ParticipantRef::named("theo", "Theo"),
            ParticipantRef::named("ines", "Inês"),
        ],
        items: vec![
            AssignedItem {
                description: "Risotto".to_string(),
                amount: dec!(18.50),
                assigned_to: maya.clone(),
            },
            AssignedItem {
                description: "Burger".to_string(),
                amount: dec!(15.00),
                assigned_to: theo.clone(),
            },
            AssignedItem {
                description: "Pasta".to_string(),
                amount: dec!(16.25),
                assigned_to: ines.clone(),
            },
        ],
        shared_items: vec![SharedItem {
            description: "Wine".to_string(),
            amount: dec!(30.00),
        }],
    });

    let created = engine
        .create_settlement(NewSettlement {
            title: "Friday dinner".to_string(),
            description: Some("Trattoria on 5th".to_string()),
            total_amount: dec!(79.75),
            currency: CurrencyCode::new("USD"),
            creator_id: maya.clone(),
            split,
            due_date: None,
        })
        .expect("valid settlement");

    println!("Total:   {} {}", created.settlement.total_amount, created.settlement.currency);
    for tx in &created.transactions {
        println!("  {:<6} owes {:>8}", tx.user_id.to_string(), tx.amount_owed);
    }
    println!();

    // --- Scenario 2: Paying back ---
    println!("━━━ Scenario 2: Paying Back ━━━\n");

    for tx in &created.transactions {
        let outcome = engine
            .record_payment(tx.id, NewPayment::new(tx.amount_owed, PaymentMethod::MobileWallet))
            .expect("payment accepted");
        println!(
            "  {:<6} paid {:>8} → settlement {}",
            tx.user_id.to_string(),
            outcome.payment.amount,
            outcome.settlement_status
        );
    }
    println!();

    let summary = engine.get_settlement_summary(&maya).expect("summary");
    println!("Maya is owed: {}", summary.total_owed_to_user);
    println!("Completed:    {}", summary.counts.completed);
}
