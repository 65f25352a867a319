use crate::domain::{Reading, StreamState, TokenAmount};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// 30-day month used for rate projections.
pub const SECONDS_PER_MONTH: u64 = 30 * 24 * 3600;

/// Elapsed seconds since `last_withdraw_time`, clamped at zero for stale
/// snapshots or clock skew.
pub fn elapsed_seconds(last_withdraw_time: u64, now: i64) -> u64 {
    if now < 0 {
        return 0;
    }
    (now as u64).saturating_sub(last_withdraw_time)
}

/// `accrued + (active ? rate * max(0, elapsed) : 0)` in 256-bit arithmetic,
/// saturating at `U256::MAX`.
pub fn accrue(accrued: U256, rate_per_second: U256, elapsed: i64, is_active: bool) -> U256 {
    if !is_active || elapsed <= 0 {
        return accrued;
    }
    let streamed = rate_per_second.saturating_mul(U256::from(elapsed as u64));
    accrued.saturating_add(streamed)
}

/// Locally recomputed claimable amount for a snapshot at `now` (Unix seconds).
pub fn claimable_at(stream: &StreamState, now: i64) -> TokenAmount {
    let elapsed = elapsed_seconds(stream.last_withdraw_time, now);
    TokenAmount::from_wei(accrue(
        stream.accrued_balance,
        stream.rate_per_second,
        i64::try_from(elapsed).unwrap_or(i64::MAX),
        stream.is_active,
    ))
}

/// Projection of a per-second rate over one 30-day month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum MonthlyRate {
    /// Rate is zero. Rendered as its own state, never as a zero amount.
    NoActiveRate,
    Projected(TokenAmount),
}

pub fn monthly_projection(rate_per_second: U256) -> MonthlyRate {
    if rate_per_second.is_zero() {
        return MonthlyRate::NoActiveRate;
    }
    MonthlyRate::Projected(TokenAmount::from_wei(
        rate_per_second.saturating_mul(U256::from(SECONDS_PER_MONTH)),
    ))
}

/// Per-second rate for a monthly amount, truncating toward zero.
pub fn rate_from_monthly(monthly: TokenAmount) -> U256 {
    monthly.wei() / U256::from(SECONDS_PER_MONTH)
}

/// Where a displayed claimable figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimableSource {
    /// The contract's own `claimableAmount` view.
    Contract,
    /// Recomputed from a `streams` snapshot.
    Local,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualPreview {
    pub claimable: Reading<TokenAmount>,
    pub source: ClaimableSource,
    pub monthly: Reading<MonthlyRate>,
}

impl AccrualPreview {
    /// Combine the contract oracle and the raw stream snapshot. The oracle wins
    /// whenever it was read successfully.
    pub fn compute(
        stream: Reading<StreamState>,
        oracle: Reading<TokenAmount>,
        now: i64,
    ) -> Self {
        let monthly = stream.map(|s| monthly_projection(s.rate_per_second));

        let (claimable, source) = match (oracle, stream) {
            (Reading::Known(amount), _) => (Reading::Known(amount), ClaimableSource::Contract),
            (Reading::Unknown, Reading::Known(s)) => {
                (Reading::Known(claimable_at(&s, now)), ClaimableSource::Local)
            }
            (Reading::Unknown, Reading::Unknown) => (Reading::Unknown, ClaimableSource::None),
        };

        Self {
            claimable,
            source,
            monthly,
        }
    }

    pub fn unknown() -> Self {
        Self {
            claimable: Reading::Unknown,
            source: ClaimableSource::None,
            monthly: Reading::Unknown,
        }
    }

    pub fn claimable_label(&self, places: u32, ticker: &str) -> String {
        match self.claimable {
            Reading::Known(amount) => format!("{} {}", amount.to_fixed(places), ticker),
            Reading::Unknown => "unknown".to_string(),
        }
    }

    pub fn monthly_label(&self, places: u32, ticker: &str) -> String {
        match self.monthly {
            Reading::Known(MonthlyRate::Projected(amount)) => {
                format!("{} {}/month (projected)", amount.to_fixed(places), ticker)
            }
            Reading::Known(MonthlyRate::NoActiveRate) => "no active rate".to_string(),
            Reading::Unknown => "unknown".to_string(),
        }
    }
}
