use crate::domain::LedgerTransaction;
use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use std::fs::File;
use std::path::Path;

const DESCRIPTIONS: [&str; 4] = [
    "Monthly salary",
    "Performance bonus",
    "Overtime",
    "Reimbursement",
];

/// Generate a demo ledger export: monthly salaries for a handful of
/// employees over the past months, plus occasional extras, net of a 10% tax.
pub fn generator(output: &Path, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let num_employees = (count / 12).clamp(1, 100) as u64;
    let now = Utc::now();

    let mut rng = rand::rng();
    let mut transactions = Vec::with_capacity(count);

    for id in 1..=count as u64 {
        let employee_id = rng.random_range(1..=num_employees);
        let description = if rng.random_bool(0.7) {
            DESCRIPTIONS[0]
        } else {
            DESCRIPTIONS[rng.random_range(1..DESCRIPTIONS.len())]
        };
        let gross = Decimal::from(rng.random_range(5_000u32..80_000));
        let tax = gross / Decimal::TEN;
        let age =
            Duration::days(rng.random_range(0..180)) + Duration::hours(rng.random_range(0..24));

        transactions.push(LedgerTransaction {
            id,
            employee_id,
            amount: gross - tax,
            tax_amount: tax,
            description: description.to_string(),
            timestamp: now - age,
        });
    }

    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    super::write_ledger(File::create(output)?, &transactions)?;
    tracing::info!(
        "Generated {} ledger rows for {} employees to {}",
        transactions.len(),
        num_employees,
        output.display()
    );
    Ok(())
}
