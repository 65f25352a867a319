use crate::adapter::ReceiptPolicy;
use crate::domain::{ConfigError, DEFAULT_PREVIEW_RATE, ILLUSTRATIVE_INR_PER_USD, TaxPolicy};
use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_API_URL: &str = "PAYROLL_API_URL";
pub const ENV_RPC_URL: &str = "PAYROLL_RPC_URL";
pub const ENV_CONTRACT_ADDRESS: &str = "PAYROLL_CONTRACT_ADDRESS";
pub const ENV_TOKEN: &str = "PAYROLL_TOKEN";

/// Client configuration, loaded from TOML with environment overrides.
///
/// Every field has a default, so an empty file (or no file) yields a
/// working configuration against a local backend and the HeLa testnet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    pub api: ApiConfig,
    pub chain: ChainConfig,
    pub tax: TaxConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub ticker: String,
    /// Overrides the address advertised by `/api/blockchain/config`.
    pub contract_address: Option<String>,
    pub receipt_poll_ms: u64,
    pub receipt_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://testnet-rpc.helachain.com".to_string(),
            chain_id: 666888,
            ticker: "HLUSD".to_string(),
            contract_address: None,
            receipt_poll_ms: 1000,
            receipt_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    /// Flat rate for the employee-side preview.
    pub preview_rate: Decimal,
    /// Rate assumed when neither the employee nor the company sets one.
    pub fallback_rate: Decimal,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            preview_rate: Decimal::from(DEFAULT_PREVIEW_RATE),
            fallback_rate: Decimal::from(DEFAULT_PREVIEW_RATE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub decimals: u32,
    pub inr_per_usd: Decimal,
    pub recent_activity: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            decimals: 6,
            inr_per_usd: Decimal::from(ILLUSTRATIVE_INR_PER_USD),
            recent_activity: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl PayrollConfig {
    /// Read `path` when given, apply process environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `PAYROLL_*` overrides from `lookup`; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api.base_url = url;
        }
        if let Some(url) = get(ENV_RPC_URL) {
            self.chain.rpc_url = url;
        }
        if let Some(address) = get(ENV_CONTRACT_ADDRESS) {
            self.chain.contract_address = Some(address);
        }
        if let Some(token) = get(ENV_TOKEN) {
            self.api.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.chain.receipt_poll_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "chain.receipt_poll_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.display.inr_per_usd <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "display.inr_per_usd",
                reason: "must be positive".to_string(),
            });
        }
        self.contract_address()?;
        Ok(())
    }

    /// The configured contract override. The zero address counts as unset.
    pub fn contract_address(&self) -> Result<Option<Address>, ConfigError> {
        let Some(raw) = self.chain.contract_address.as_deref() else {
            return Ok(None);
        };
        let address = raw
            .trim()
            .parse::<Address>()
            .map_err(|e| ConfigError::Invalid {
                field: "chain.contract_address",
                reason: e.to_string(),
            })?;
        Ok(Some(address).filter(|a| *a != Address::ZERO))
    }

    pub fn receipt_policy(&self) -> ReceiptPolicy {
        ReceiptPolicy {
            poll_interval: Duration::from_millis(self.chain.receipt_poll_ms),
            timeout: Duration::from_secs(self.chain.receipt_timeout_secs),
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn tax_policy(&self) -> TaxPolicy {
        TaxPolicy::new(self.tax.fallback_rate)
    }
}
