use crate::domain::{Reading, TokenAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Illustrative INR per USD divisor for the cosmetic conversion card.
pub const ILLUSTRATIVE_INR_PER_USD: u32 = 83;

/// Off-chain side of the dashboard, in the currency of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPanel {
    pub total_inr: Decimal,
    /// `total_inr / divisor`, rounded to two places. Cosmetic only.
    pub approx_usd: Decimal,
}

impl LedgerPanel {
    pub fn new(total_inr: Decimal, inr_per_usd: Decimal) -> Self {
        let approx_usd = if inr_per_usd.is_zero() {
            Decimal::ZERO
        } else {
            (total_inr / inr_per_usd).round_dp(2)
        };
        Self {
            total_inr,
            approx_usd,
        }
    }
}

/// On-chain side of the dashboard, in token units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPanel {
    pub claimable: Reading<TokenAmount>,
}

/// Two independent ledgers shown side by side.
///
/// Nothing here relates one side to the other: each setter replaces only its
/// own panel, and no total across both is ever computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationView {
    ledger: LedgerPanel,
    chain: ChainPanel,
    inr_per_usd: Decimal,
}

impl ReconciliationView {
    pub fn new(ledger_total: Decimal, claimable: Reading<TokenAmount>, inr_per_usd: Decimal) -> Self {
        Self {
            ledger: LedgerPanel::new(ledger_total, inr_per_usd),
            chain: ChainPanel { claimable },
            inr_per_usd,
        }
    }

    pub fn with_ledger_total(mut self, total_inr: Decimal) -> Self {
        self.ledger = LedgerPanel::new(total_inr, self.inr_per_usd);
        self
    }

    pub fn with_claimable(mut self, claimable: Reading<TokenAmount>) -> Self {
        self.chain = ChainPanel { claimable };
        self
    }

    pub fn ledger(&self) -> &LedgerPanel {
        &self.ledger
    }

    pub fn chain(&self) -> &ChainPanel {
        &self.chain
    }

    pub fn render(&self, places: u32, ticker: &str) -> Vec<(String, String)> {
        let claimable = match self.chain.claimable {
            Reading::Known(amount) => format!("{} {}", amount.to_fixed(places), ticker),
            Reading::Unknown => "unknown".to_string(),
        };
        vec![
            ("Ledger total (INR)".to_string(), format!("₹{}", self.ledger.total_inr)),
            ("Approx. USD".to_string(), format!("${}", self.ledger.approx_usd)),
            ("On-chain claimable".to_string(), claimable),
        ]
    }
}
