use crate::domain::{
    LedgerTransaction, MonthBucket, ledger_total, monthly_buckets, monthly_income,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Read a ledger export (`id,employee_id,amount,tax_amount,description,timestamp`).
pub fn read_ledger(path: &Path) -> Result<Vec<LedgerTransaction>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut transactions = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let tx: LedgerTransaction =
            result.map_err(|e| format!("{}: row {}: {}", path.display(), line + 1, e))?;
        transactions.push(tx);
    }
    Ok(transactions)
}

pub fn write_ledger<W: Write>(
    writer: W,
    transactions: &[LedgerTransaction],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "id",
        "employee_id",
        "amount",
        "tax_amount",
        "description",
        "timestamp",
    ])?;
    for tx in transactions {
        wtr.write_record([
            tx.id.to_string(),
            tx.employee_id.to_string(),
            tx.amount.to_string(),
            tx.tax_amount.to_string(),
            tx.description.clone(),
            tx.timestamp.to_rfc3339(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Totals over an exported ledger, in the currency of record.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub count: usize,
    pub total_net: Decimal,
    pub total_tax: Decimal,
    pub this_month: Decimal,
    pub months: Vec<MonthBucket>,
}

impl LedgerSummary {
    pub fn compute(transactions: &[LedgerTransaction], now: DateTime<Utc>) -> Self {
        Self {
            count: transactions.len(),
            total_net: ledger_total(transactions),
            total_tax: transactions.iter().map(|t| t.tax_amount).sum(),
            this_month: monthly_income(transactions, now),
            months: monthly_buckets(transactions),
        }
    }

    pub fn output_csv<W: Write>(&self, writer: W) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["month", "income"])?;
        for bucket in &self.months {
            wtr.write_record([bucket.label.as_str(), &format!("{:.2}", bucket.income)])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
