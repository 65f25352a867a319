use crate::domain::{ContractError, StreamState, TokenAmount, WalletHandle};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::sync::Arc;

/// The fixed CorePayroll contract interface.
///
/// Reads never require a wallet. Writes take the caller's session handle and
/// return only after the transaction has been mined successfully.
#[async_trait]
pub trait PayrollContract: Send + Sync {
    async fn claimable_amount(&self, employee: Address) -> Result<TokenAmount, ContractError>;

    async fn stream(&self, employee: Address) -> Result<StreamState, ContractError>;

    /// Contract-side withholding rate, in percent.
    async fn tax_rate(&self) -> Result<U256, ContractError>;

    async fn tax_vault(&self) -> Result<Address, ContractError>;

    async fn treasury_balance(&self) -> Result<TokenAmount, ContractError>;

    async fn withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError>;

    async fn start_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
        rate_per_second: U256,
    ) -> Result<B256, ContractError>;

    async fn stop_stream(&self, wallet: &WalletHandle, employee: Address)
    -> Result<B256, ContractError>;

    async fn emergency_withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError>;
}

/// Produces a contract client for an address learned at runtime, usually from
/// `/api/blockchain/config`.
pub trait ContractBinder: Send + Sync {
    fn bind(&self, address: Address) -> Result<Arc<dyn PayrollContract>, ContractError>;
}
