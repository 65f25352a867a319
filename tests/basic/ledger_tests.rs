use crate::context::{ledger_tx, now};
use chrono::Duration;
use payroll::domain::{
    LedgerTransaction, ledger_total, monthly_buckets, monthly_income, recent_activity, search,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_monthly_income_only_counts_current_month() {
    let txs = vec![
        ledger_tx(1, dec!(500), 0),
        ledger_tx(2, dec!(700), 1),
        ledger_tx(3, dec!(900), 40),
    ];
    assert_eq!(monthly_income(&txs, now()), dec!(500));
    assert_eq!(ledger_total(&txs), dec!(2100));
}

#[test]
fn test_recent_activity_takes_first_entries_in_order() {
    let txs: Vec<LedgerTransaction> = (1..=8).map(|i| ledger_tx(i, dec!(10), i as i64)).collect();
    let recent = recent_activity(&txs, 5, now());

    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].title, "Payment 1");
    assert_eq!(recent[0].time, "1 days ago");
    assert_eq!(recent[4].title, "Payment 5");
}

#[test]
fn test_recent_activity_labels() {
    let mut fresh = ledger_tx(1, dec!(10), 0);
    fresh.timestamp = now() - Duration::minutes(5);
    let mut hours = ledger_tx(2, dec!(10), 0);
    hours.timestamp = now() - Duration::hours(3);
    let old = ledger_tx(3, dec!(10), 30);

    let recent = recent_activity(&[fresh, hours, old], 5, now());
    assert_eq!(recent[0].time, "Just now");
    assert_eq!(recent[1].time, "3 hours ago");
    assert_eq!(recent[2].time, "2025-12-02");
}

#[test]
fn test_empty_description_is_titled_payment() {
    let mut tx = ledger_tx(1, dec!(10), 0);
    tx.description.clear();
    assert_eq!(recent_activity(&[tx], 5, now())[0].title, "Payment");
}

#[test]
fn test_monthly_buckets_ascending_with_labels() {
    let txs = vec![
        ledger_tx(1, dec!(100), 0),
        ledger_tx(2, dec!(50), 1),
        ledger_tx(3, dec!(25), 5),
    ];
    let buckets = monthly_buckets(&txs);

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].label, "Dec 2025");
    assert_eq!(buckets[0].income, dec!(75));
    assert_eq!(buckets[1].label, "Jan 2026");
    assert_eq!(buckets[1].income, dec!(100));
}

#[test]
fn test_empty_ledger_has_no_data_bucket() {
    let buckets = monthly_buckets(&[]);
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].label, "No data");
    assert_eq!(buckets[0].income, Decimal::ZERO);
}

#[test]
fn test_search_is_case_insensitive() {
    let mut bonus = ledger_tx(1, dec!(10), 0);
    bonus.description = "Performance Bonus".to_string();
    let salary = ledger_tx(2, dec!(10), 0);
    let txs = vec![bonus, salary];

    let hits = search(&txs, "bonus");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 1);
    assert_eq!(search(&txs, "  ").len(), 2);
}

#[test]
fn test_backend_json_with_naive_timestamp() {
    let tx: LedgerTransaction = serde_json::from_str(
        r#"{"id": 4, "amount": "4500.00", "tax_amount": 500, "description": "Salary", "timestamp": "2025-12-15T09:30:00"}"#,
    )
    .unwrap();
    assert_eq!(tx.amount, dec!(4500));
    assert_eq!(tx.tax_amount, dec!(500));
    assert_eq!(tx.employee_id, 0);
    assert_eq!(monthly_buckets(&[tx])[0].label, "Dec 2025");
}
