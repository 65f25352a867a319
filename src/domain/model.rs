use crate::domain::{LedgerTransaction, ledger::deserialize_timestamp};
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// `/api/me/profile` for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub role: String,
    pub employee: Option<EmployeeSummary>,
    #[serde(default)]
    pub total_earned: Decimal,
}

impl Profile {
    pub fn expected_wallet(&self) -> Option<&str> {
        self.employee
            .as_ref()
            .and_then(|e| e.wallet_address.as_deref())
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub is_streaming: bool,
    #[serde(default)]
    pub use_custom_tax: bool,
    #[serde(default)]
    pub custom_tax_rate: Option<Decimal>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub transactions: Vec<LedgerTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletLink {
    pub wallet_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeTaxUpdate {
    pub use_custom_tax: bool,
    pub custom_tax_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamToggle {
    pub success: bool,
    pub employee_id: u64,
    pub is_streaming: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub employee_id: u64,
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBonus {
    pub employee_id: u64,
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonus {
    pub id: u64,
    pub employee_id: u64,
    pub amount: Decimal,
    pub reason: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treasury {
    pub id: u64,
    pub total_balance: Decimal,
    pub onchain_balance: Decimal,
    #[serde(default)]
    pub last_tx_hash: Option<String>,
    #[serde(default)]
    pub last_synced_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryAction {
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalPayout {
    pub total_paid_net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalTax {
    pub total_tax_collected: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStreams {
    pub active_streams: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEarner {
    pub name: String,
    pub total_net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub income: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyTax {
    pub default_tax_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub id: u64,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTaxSlab {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub tax_rate: Decimal,
}

/// `/api/blockchain/config`: where the CorePayroll contract lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainConfig {
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub abi: Vec<String>,
    #[serde(default)]
    pub hela_rpc_url: Option<String>,
}

impl BlockchainConfig {
    /// The configured contract, or `None` when blank, unparsable, or the zero
    /// address (the backend's "not deployed" marker).
    pub fn contract(&self) -> Option<Address> {
        self.contract_address
            .trim()
            .parse::<Address>()
            .ok()
            .filter(|addr| *addr != Address::ZERO)
    }
}
