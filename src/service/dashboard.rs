use crate::domain::{
    AccrualPreview, Activity, BlockchainConfig, ContractError, LedgerTransaction, MonthBucket,
    PayrollError, Profile, Reading, ReconciliationView, SessionError, TaxPreview, TokenAmount,
    WalletHandle, YieldPreview, monthly_buckets, monthly_income, recent_activity,
};
use crate::port::{Clock, ContractBinder, EmployeeApi, PayrollContract};
use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Display knobs for the employee dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub preview_tax_rate: Decimal,
    pub decimals: u32,
    pub inr_per_usd: Decimal,
    pub recent_activity: usize,
    pub ticker: String,
    /// Takes precedence over the backend-advertised contract address.
    pub contract_override: Option<Address>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            preview_tax_rate: Decimal::from(crate::domain::DEFAULT_PREVIEW_RATE),
            decimals: 6,
            inr_per_usd: Decimal::from(crate::domain::ILLUSTRATIVE_INR_PER_USD),
            recent_activity: 5,
            ticker: "HLUSD".to_string(),
            contract_override: None,
        }
    }
}

/// How the connected wallet relates to the one HR linked to the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WalletStatus {
    NotConnected,
    Connected { address: Address },
    Mismatch { expected: String, connected: String },
}

/// Everything one dashboard render needs, fetched in one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub profile: Profile,
    pub transactions: Vec<LedgerTransaction>,
    pub monthly_income: Decimal,
    pub recent_activity: Vec<Activity>,
    pub monthly_buckets: Vec<MonthBucket>,
    pub contract: Option<Address>,
    pub wallet: WalletStatus,
    pub accrual: AccrualPreview,
    pub reconciliation: ReconciliationView,
    pub fetched_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Replace only the on-chain side after a fresh claimable read.
    pub fn with_claimable(mut self, claimable: Reading<TokenAmount>) -> Self {
        self.accrual = AccrualPreview {
            claimable,
            source: match claimable {
                Reading::Known(_) => crate::domain::ClaimableSource::Contract,
                Reading::Unknown => crate::domain::ClaimableSource::None,
            },
            monthly: self.accrual.monthly,
        };
        self.reconciliation = self.reconciliation.with_claimable(claimable);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub tx_hash: B256,
    /// Claimable amount re-read from the contract after the withdrawal mined.
    pub claimable: Reading<TokenAmount>,
}

/// The employee portal's data loading and actions.
///
/// Ledger reads failing abort a refresh. Contract reads failing only turn
/// the on-chain figures into `Unknown`.
pub struct EmployeeDashboard {
    api: Arc<dyn EmployeeApi>,
    contracts: Arc<dyn ContractBinder>,
    clock: Arc<dyn Clock>,
    settings: DashboardSettings,
}

impl EmployeeDashboard {
    pub fn new(
        api: Arc<dyn EmployeeApi>,
        contracts: Arc<dyn ContractBinder>,
        clock: Arc<dyn Clock>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            api,
            contracts,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn tax_preview(&self, input: Option<&str>) -> TaxPreview {
        TaxPreview::from_input(input, self.settings.preview_tax_rate)
    }

    pub fn yield_preview(
        &self,
        principal: Option<&str>,
        apy_percent: Option<&str>,
        months: Option<&str>,
    ) -> YieldPreview {
        YieldPreview::from_input(principal, apy_percent, months, self.settings.preview_tax_rate)
    }

    pub async fn refresh(
        &self,
        wallet: Option<&WalletHandle>,
    ) -> Result<DashboardSnapshot, PayrollError> {
        let (profile, transactions, config) = tokio::join!(
            self.api.my_profile(),
            self.api.my_transactions(),
            self.api.blockchain_config(),
        );
        let profile = profile?;
        let transactions = transactions?;

        let contract = self.resolve_contract(config.ok().as_ref());
        let wallet_status = wallet_status(wallet, &profile);
        let employee = read_address(wallet, &profile);

        let now = self.clock.now_unix();
        let accrual = match (contract, employee) {
            (Some(contract), Some(employee)) => self.read_accrual(contract, employee, now).await,
            _ => AccrualPreview::unknown(),
        };

        let today = DateTime::from_timestamp(now, 0).unwrap_or_else(Utc::now);
        let reconciliation = ReconciliationView::new(
            profile.total_earned,
            accrual.claimable,
            self.settings.inr_per_usd,
        );

        tracing::debug!(
            "Dashboard refreshed for {}: {} transactions, contract {:?}",
            profile.email,
            transactions.len(),
            contract
        );

        Ok(DashboardSnapshot {
            monthly_income: monthly_income(&transactions, today),
            recent_activity: recent_activity(&transactions, self.settings.recent_activity, today),
            monthly_buckets: monthly_buckets(&transactions),
            profile,
            transactions,
            contract,
            wallet: wallet_status,
            accrual,
            reconciliation,
            fetched_at: today,
        })
    }

    /// Withdraw everything claimable and re-read the contract's figure.
    ///
    /// Nothing in `snapshot` changes on failure; on success the caller gets
    /// the new claimable reading to apply with `with_claimable`.
    pub async fn withdraw(
        &self,
        snapshot: &DashboardSnapshot,
        wallet: &WalletHandle,
    ) -> Result<WithdrawReceipt, PayrollError> {
        wallet.ensure_live()?;
        wallet.verify_expected(snapshot.profile.expected_wallet())?;
        let address = snapshot.contract.ok_or(ContractError::NotConfigured)?;
        let contract = self.contracts.bind(address)?;
        let employee = wallet.address()?;

        let tx_hash = contract.withdraw(wallet).await?;
        tracing::info!("Withdrawal mined: {}", tx_hash);

        let claimable = Reading::from(contract.claimable_amount(employee).await);
        Ok(WithdrawReceipt { tx_hash, claimable })
    }

    fn resolve_contract(&self, config: Option<&BlockchainConfig>) -> Option<Address> {
        self.settings
            .contract_override
            .or_else(|| config.and_then(BlockchainConfig::contract))
    }

    async fn read_accrual(&self, contract: Address, employee: Address, now: i64) -> AccrualPreview {
        let contract: Arc<dyn PayrollContract> = match self.contracts.bind(contract) {
            Ok(contract) => contract,
            Err(e) => {
                tracing::warn!("Contract unavailable: {}", e);
                return AccrualPreview::unknown();
            }
        };

        let (claimable, stream) = tokio::join!(
            contract.claimable_amount(employee),
            contract.stream(employee),
        );
        if let Err(e) = &claimable {
            tracing::warn!("claimableAmount({}) failed: {}", employee, e);
        }
        if let Err(e) = &stream {
            tracing::warn!("streams({}) failed: {}", employee, e);
        }

        AccrualPreview::compute(Reading::from(stream), Reading::from(claimable), now)
    }
}

fn wallet_status(wallet: Option<&WalletHandle>, profile: &Profile) -> WalletStatus {
    let Some(wallet) = wallet.filter(|w| w.is_live()) else {
        return WalletStatus::NotConnected;
    };
    match wallet.verify_expected(profile.expected_wallet()) {
        Ok(()) => match wallet.address() {
            Ok(address) => WalletStatus::Connected { address },
            Err(_) => WalletStatus::NotConnected,
        },
        Err(SessionError::WalletMismatch {
            expected,
            connected,
        }) => WalletStatus::Mismatch {
            expected,
            connected,
        },
        Err(_) => WalletStatus::NotConnected,
    }
}

/// Whose stream to read: the live wallet, else the wallet on file.
fn read_address(wallet: Option<&WalletHandle>, profile: &Profile) -> Option<Address> {
    wallet
        .and_then(|w| w.address().ok())
        .or_else(|| profile.expected_wallet().and_then(|w| w.parse().ok()))
}
