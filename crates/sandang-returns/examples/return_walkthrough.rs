//! # Return Walkthrough
//!
//! End-to-end demo of the return workflow against the in-memory gateway.
//!
//! ## Usage
//! ```bash
//! cargo run -p sandang-returns --example return_walkthrough
//!
//! # With workflow logs
//! RUST_LOG=sandang_returns=debug cargo run -p sandang-returns --example return_walkthrough
//! ```
//!
//! Walks one rental through all three steps: declares split conditions
//! (two kebaya fine, one badly damaged, the shawl needing an extra wash),
//! reviews the computed penalty, commits, then shows the guard refusing an
//! immediate double-submit.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sandang_core::money::Money;
use sandang_core::types::{ConditionSplit, RentalLineItem, RentalTransaction, ReturnedStatus};
use sandang_returns::{EngineError, MemoryGateway, ReturnEngine};

fn rental_fixture() -> RentalTransaction {
    RentalTransaction {
        transaction_code: "TRX-20260822-0031".to_string(),
        customer_name: Some("Ibu Sari".to_string()),
        lines: vec![
            RentalLineItem {
                line_id: "line-1".to_string(),
                product_name: "Kebaya Modern".to_string(),
                quantity_taken_out: 3,
                already_returned_status: ReturnedStatus::None,
                unit_original_cost: Some(Money::from_rupiah(150_000)),
                expected_return_date: Some(Utc::now() - Duration::days(2)),
            },
            RentalLineItem {
                line_id: "line-2".to_string(),
                product_name: "Selendang Batik".to_string(),
                quantity_taken_out: 1,
                already_returned_status: ReturnedStatus::None,
                unit_original_cost: Some(Money::from_rupiah(80_000)),
                expected_return_date: Some(Utc::now() - Duration::days(2)),
            },
        ],
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sandang_returns=info".into()),
        )
        .init();

    println!("👗 Sandang POS Return Walkthrough");
    println!("=================================");
    println!();

    let gateway = Arc::new(MemoryGateway::new().with_transaction(rental_fixture()));
    let engine = ReturnEngine::new(gateway.clone());

    // The customer hands the garments over the counter, two days late.
    let transaction = engine.load_transaction("TRX-20260822-0031").await?;
    println!(
        "✓ Loaded {} for {}",
        transaction.transaction_code,
        transaction
            .customer_name
            .as_deref()
            .unwrap_or("walk-in customer"),
    );

    let mut session = engine.create_session(transaction);

    // Step 1: declare conditions. Two kebaya fine, one came back torn.
    session.set_condition_split(
        "line-1",
        0,
        ConditionSplit::new("Baik - tidak ada kerusakan", 2),
    )?;
    session.add_condition_split("line-1")?;
    session.set_condition_split(
        "line-1",
        1,
        ConditionSplit::new("Buruk - kerusakan besar", 1),
    )?;
    session.set_condition_split(
        "line-2",
        0,
        ConditionSplit::new("Kotor - perlu cuci ekstra", 1),
    )?;
    println!("✓ Conditions declared");

    // Step 2: review what the shop will charge.
    let returned_at = Utc::now();
    session.advance_step(returned_at)?;
    if let Some(result) = session.last_result() {
        println!();
        println!("Penalty review:");
        for item in &result.breakdowns {
            println!(
                "  {} x{} [{}] {} => {}",
                item.product_name, item.quantity, item.condition_label, item.description,
                item.total,
            );
        }
        println!("  Total: {}", result.total_penalty);
        println!();
    }

    // Step 3: confirm and commit.
    session.advance_step(returned_at)?;
    let outcome = engine
        .commit_return(&mut session, "sabuk belum dikembalikan")
        .await?;
    println!("✓ {}", outcome.message);

    // An impatient second click is refused by the guard.
    match engine
        .commit_return(&mut session, "sabuk belum dikembalikan")
        .await
    {
        Err(EngineError::DuplicateSubmission { retry_after_secs }) => {
            println!("⚠ Double-submit blocked; retry allowed in {retry_after_secs}s");
        }
        other => println!("unexpected outcome: {other:?}"),
    }

    println!();
    println!("Gateway saw {} commit call(s)", gateway.commit_calls().await);

    Ok(())
}
