use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Decimals of the chain's native token (HLUSD follows the 18-decimal convention).
pub const TOKEN_DECIMALS: u32 = 18;

fn scale() -> U256 {
    U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

/// An amount in the token's smallest unit.
///
/// All arithmetic stays in 256-bit integers; conversion to a decimal string
/// happens only when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(U256::ZERO);

    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a human decimal token string such as `"0.0001"` into wei.
    ///
    /// Fractional digits beyond 18 are rejected rather than rounded.
    pub fn parse_tokens(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("empty amount".to_string());
        }

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        if frac.len() > TOKEN_DECIMALS as usize {
            return Err(format!(
                "too many fractional digits in {trimmed} (max {TOKEN_DECIMALS})"
            ));
        }

        let digits_ok = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !digits_ok(whole) || !digits_ok(frac) || (whole.is_empty() && frac.is_empty()) {
            return Err(format!("not a token amount: {trimmed}"));
        }

        let whole_wei = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10)
                .map_err(|e| format!("invalid whole part {whole}: {e}"))?
                .checked_mul(scale())
                .ok_or_else(|| format!("amount overflows 256 bits: {trimmed}"))?
        };

        let frac_wei = if frac.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{frac:0<width$}", width = TOKEN_DECIMALS as usize);
            U256::from_str_radix(&padded, 10)
                .map_err(|e| format!("invalid fractional part {frac}: {e}"))?
        };

        whole_wei
            .checked_add(frac_wei)
            .map(Self)
            .ok_or_else(|| format!("amount overflows 256 bits: {trimmed}"))
    }

    /// Full-precision decimal rendering with trailing zeros trimmed
    /// (`1.5`, `259.2`, `0`).
    pub fn to_token_string(&self) -> String {
        let (whole, frac) = self.0.div_rem(scale());
        if frac.is_zero() {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }

    /// Fixed-precision rendering, truncating (never rounding up) past `places`.
    pub fn to_fixed(&self, places: u32) -> String {
        let places = places.min(TOKEN_DECIMALS);
        let (whole, frac) = self.0.div_rem(scale());
        if places == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS as usize);
        format!("{}.{}", whole, &frac[..places as usize])
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_token_string())
    }
}

impl From<U256> for TokenAmount {
    fn from(wei: U256) -> Self {
        Self(wei)
    }
}
