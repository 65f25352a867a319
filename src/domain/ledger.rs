use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A salary or bonus payment recorded by the backend.
///
/// `amount` is net of tax, in the currency of record (INR). There is no link
/// to any on-chain withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: u64,
    #[serde(default)]
    pub employee_id: u64,
    pub amount: Decimal,
    #[serde(default)]
    pub tax_amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl LedgerTransaction {
    pub fn title(&self) -> &str {
        if self.description.is_empty() {
            "Payment"
        } else {
            &self.description
        }
    }
}

/// The backend emits naive ISO timestamps; accept both naive and offset forms.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {raw}: {e}"))
}

pub fn ledger_total(transactions: &[LedgerTransaction]) -> Decimal {
    transactions.iter().map(|t| t.amount).sum()
}

/// Sum of amounts falling in `now`'s calendar month.
pub fn monthly_income(transactions: &[LedgerTransaction], now: DateTime<Utc>) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.timestamp.year() == now.year() && t.timestamp.month() == now.month())
        .map(|t| t.amount)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    pub title: String,
    pub amount: Decimal,
    pub time: String,
}

/// First `limit` entries in backend order, labelled with a relative time.
pub fn recent_activity(
    transactions: &[LedgerTransaction],
    limit: usize,
    now: DateTime<Utc>,
) -> Vec<Activity> {
    transactions
        .iter()
        .take(limit)
        .map(|t| Activity {
            title: t.title().to_string(),
            amount: t.amount,
            time: time_ago(t.timestamp, now),
        })
        .collect()
}

pub fn time_ago(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - ts;
    if diff < Duration::hours(1) {
        return "Just now".to_string();
    }
    if diff < Duration::hours(24) {
        return format!("{} hours ago", diff.num_hours());
    }
    if diff < Duration::days(7) {
        return format!("{} days ago", diff.num_days());
    }
    ts.format("%Y-%m-%d").to_string()
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub label: String,
    pub income: Decimal,
}

/// Income per calendar month, oldest first. An empty ledger produces a
/// single "No data" bucket so charts always have a point.
pub fn monthly_buckets(transactions: &[LedgerTransaction]) -> Vec<MonthBucket> {
    let mut by_month: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for t in transactions {
        *by_month
            .entry((t.timestamp.year(), t.timestamp.month()))
            .or_insert(Decimal::ZERO) += t.amount;
    }

    if by_month.is_empty() {
        return vec![MonthBucket {
            label: "No data".to_string(),
            income: Decimal::ZERO,
        }];
    }

    by_month
        .into_iter()
        .map(|((year, month), income)| MonthBucket {
            label: format!("{} {}", MONTH_NAMES[(month - 1) as usize], year),
            income,
        })
        .collect()
}

/// Case-insensitive description search. An empty term matches everything.
pub fn search<'a>(transactions: &'a [LedgerTransaction], term: &str) -> Vec<&'a LedgerTransaction> {
    let needle = term.trim().to_lowercase();
    transactions
        .iter()
        .filter(|t| needle.is_empty() || t.title().to_lowercase().contains(&needle))
        .collect()
}
