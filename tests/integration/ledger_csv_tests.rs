use crate::context::{ledger_tx, now};
use payroll::service::mock::generator;
use payroll::service::{LedgerSummary, read_ledger, write_ledger};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_written_ledger_reads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ledger.csv");

    let mut salary = ledger_tx(1, dec!(4500), 0);
    salary.tax_amount = dec!(500);
    salary.description = "Salary, January".to_string();
    let bonus = ledger_tx(2, dec!(1200.50), 10);
    let txs = vec![salary, bonus];

    write_ledger(File::create(&path).unwrap(), &txs).unwrap();
    let loaded = read_ledger(&path).unwrap();

    assert_eq!(loaded, txs);
}

#[test]
fn test_malformed_row_names_file_and_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "id,employee_id,amount,tax_amount,description,timestamp").unwrap();
    writeln!(file, "1,1,100,10,Salary,2025-12-01T00:00:00Z").unwrap();
    writeln!(file, "2,1,lots,10,Salary,2025-12-02T00:00:00Z").unwrap();
    drop(file);

    let err = read_ledger(&path).unwrap_err().to_string();
    assert!(err.contains("broken.csv"));
    assert!(err.contains("row 2"));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(read_ledger(&dir.path().join("absent.csv")).is_err());
}

#[test]
fn test_summary_totals_and_month_csv() {
    let mut january = ledger_tx(1, dec!(4500), 0);
    january.tax_amount = dec!(500);
    let mut december = ledger_tx(2, dec!(3000), 3);
    december.tax_amount = dec!(300);
    let txs = vec![january, december];

    let summary = LedgerSummary::compute(&txs, now());
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total_net, dec!(7500));
    assert_eq!(summary.total_tax, dec!(800));
    assert_eq!(summary.this_month, dec!(4500));

    let mut out = Vec::new();
    summary.output_csv(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "month,income\nDec 2025,3000.00\nJan 2026,4500.00\n"
    );
}

#[test]
fn test_generator_produces_readable_ledger() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("generated.csv");

    generator(&path, 24).unwrap();
    let txs = read_ledger(&path).unwrap();

    assert_eq!(txs.len(), 24);
    assert!(txs.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    for tx in &txs {
        assert!((1..=2).contains(&tx.employee_id));
        assert!(tx.tax_amount > Decimal::ZERO);
        assert_eq!(tx.amount, tx.tax_amount * Decimal::from(9));
    }
}
