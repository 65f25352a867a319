use super::{DashboardSettings, EmployeeDashboard, EmployerConsole, ViewRegistry};
use crate::adapter::{
    HttpPayrollClient, JsonRpcTransport, RpcContractBinder, RpcWalletConnector, TokenStore,
};
use crate::config::PayrollConfig;
use crate::domain::{ContractError, PayrollError};
use crate::port::{ChainRpc, ContractBinder, EmployeeApi, SystemClock};
use alloy_primitives::Address;
use std::sync::Arc;

/// Live clients wired from configuration.
///
/// Owns the session token store and the RPC transport; everything built from
/// it shares those two and nothing else.
pub struct PayrollContext {
    pub config: PayrollConfig,
    pub api: Arc<HttpPayrollClient>,
    pub rpc: Arc<JsonRpcTransport>,
    pub contracts: Arc<dyn ContractBinder>,
}

impl PayrollContext {
    /// Prefer the configured contract, else ask the backend where it lives.
    pub async fn contract_address(&self) -> Result<Address, PayrollError> {
        if let Some(address) = self.config.contract_address()? {
            return Ok(address);
        }
        let remote = self.api.blockchain_config().await?;
        Ok(remote.contract().ok_or(ContractError::NotConfigured)?)
    }

    pub fn wallet_connector(&self) -> RpcWalletConnector {
        RpcWalletConnector::new(self.rpc.clone(), self.config.chain.chain_id)
    }

    pub fn dashboard(&self) -> Result<EmployeeDashboard, PayrollError> {
        let settings = DashboardSettings {
            preview_tax_rate: self.config.tax.preview_rate,
            decimals: self.config.display.decimals,
            inr_per_usd: self.config.display.inr_per_usd,
            recent_activity: self.config.display.recent_activity,
            ticker: self.config.chain.ticker.clone(),
            contract_override: self.config.contract_address()?,
        };
        Ok(EmployeeDashboard::new(
            self.api.clone(),
            self.contracts.clone(),
            Arc::new(SystemClock),
            settings,
        ))
    }

    pub fn views(&self) -> Result<ViewRegistry, PayrollError> {
        Ok(ViewRegistry::new(Arc::new(self.dashboard()?)))
    }

    pub async fn employer(&self) -> Result<EmployerConsole, PayrollError> {
        let address = self.contract_address().await?;
        Ok(EmployerConsole::new(
            self.api.clone(),
            self.contracts.bind(address)?,
            self.config.tax_policy(),
        ))
    }
}

/// Build the HTTP and RPC clients described by `config`.
pub fn boot(config: PayrollConfig) -> Result<PayrollContext, PayrollError> {
    let tokens = Arc::new(match &config.api.token {
        Some(token) => TokenStore::with_token(token.clone()),
        None => TokenStore::new(),
    });
    let api = Arc::new(HttpPayrollClient::new(
        config.api.base_url.clone(),
        tokens,
        config.api_timeout(),
    )?);
    let rpc = Arc::new(JsonRpcTransport::new(
        config.chain.rpc_url.clone(),
        config.api_timeout(),
    )?);
    let contracts: Arc<dyn ContractBinder> = Arc::new(RpcContractBinder::new(
        rpc.clone() as Arc<dyn ChainRpc>,
        config.receipt_policy(),
    ));

    if config.api.token.is_none() {
        tracing::debug!("No session token configured; sign in before protected calls");
    }
    tracing::info!(
        "Payroll client initialized: api={} rpc={} chain={}",
        config.api.base_url,
        config.chain.rpc_url,
        config.chain.chain_id
    );

    Ok(PayrollContext {
        config,
        api,
        rpc,
        contracts,
    })
}
