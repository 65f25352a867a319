use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Per-employee salary stream as reported by the CorePayroll `streams` view.
///
/// Only ever a snapshot: the contract owns this state and mutates it on
/// `startStream`, `stopStream` and `withdraw`. Nothing here persists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    /// Smallest token unit per second; zero means no active rate.
    pub rate_per_second: U256,
    /// Unix seconds of the last withdrawal or of stream start.
    pub last_withdraw_time: u64,
    /// Credited but not yet claimed, excluding time-based accrual.
    pub accrued_balance: U256,
    pub is_active: bool,
}

impl StreamState {
    pub fn inactive() -> Self {
        Self {
            rate_per_second: U256::ZERO,
            last_withdraw_time: 0,
            accrued_balance: U256::ZERO,
            is_active: false,
        }
    }
}

/// A value fetched from an external system that may have failed to load.
///
/// `Unknown` and `Known(zero)` are different states and must render differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Reading<T> {
    Known(T),
    Unknown,
}

impl<T> Reading<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Reading::Known(v) => Some(v),
            Reading::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Reading::Unknown)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Reading::Known(v) => Reading::Known(f(v)),
            Reading::Unknown => Reading::Unknown,
        }
    }
}

impl<T, E> From<Result<T, E>> for Reading<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Reading::Known(v),
            Err(_) => Reading::Unknown,
        }
    }
}
