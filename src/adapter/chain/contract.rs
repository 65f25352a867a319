use super::abi;
use crate::domain::{ContractError, StreamState, TokenAmount, WalletHandle};
use crate::port::{ChainRpc, ContractBinder, PayrollContract};
use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Receipt polling policy for write calls.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Binds `CorePayrollClient`s over one shared RPC transport.
pub struct RpcContractBinder {
    rpc: Arc<dyn ChainRpc>,
    receipts: ReceiptPolicy,
}

impl RpcContractBinder {
    pub fn new(rpc: Arc<dyn ChainRpc>, receipts: ReceiptPolicy) -> Self {
        Self { rpc, receipts }
    }
}

impl ContractBinder for RpcContractBinder {
    fn bind(&self, address: Address) -> Result<Arc<dyn PayrollContract>, ContractError> {
        let client = CorePayrollClient::new(self.rpc.clone(), address, self.receipts)?;
        Ok(Arc::new(client))
    }
}

/// CorePayroll bound to one deployed address and one RPC endpoint.
pub struct CorePayrollClient {
    rpc: Arc<dyn ChainRpc>,
    address: Address,
    receipts: ReceiptPolicy,
}

impl CorePayrollClient {
    /// Fails with `NotConfigured` for the zero address.
    pub fn new(
        rpc: Arc<dyn ChainRpc>,
        address: Address,
        receipts: ReceiptPolicy,
    ) -> Result<Self, ContractError> {
        if address == Address::ZERO {
            return Err(ContractError::NotConfigured);
        }
        Ok(Self {
            rpc,
            address,
            receipts,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read(&self, data: Bytes) -> Result<Bytes, ContractError> {
        self.rpc.call(self.address, data).await
    }

    /// Submit from the session's address and block until mined.
    async fn write(
        &self,
        wallet: &WalletHandle,
        method: &'static str,
        data: Bytes,
    ) -> Result<B256, ContractError> {
        let from = wallet.address().map_err(ContractError::Session)?;

        let hash = self.rpc.send_transaction(from, self.address, data).await?;
        tracing::info!("{} submitted from {}: {}", method, from, hash);

        let deadline = tokio::time::Instant::now() + self.receipts.timeout;
        loop {
            if let Some(receipt) = self.rpc.transaction_receipt(hash).await? {
                if receipt.success {
                    tracing::info!(
                        "{} mined in block {:?}: {}",
                        method,
                        receipt.block_number,
                        hash
                    );
                    return Ok(hash);
                }
                tracing::warn!("{} reverted: {}", method, hash);
                return Err(ContractError::Reverted(format!("{method} ({hash})")));
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(ContractError::ReceiptTimeout(hash.to_string()));
            }
            tokio::time::sleep(self.receipts.poll_interval).await;
        }
    }
}

#[async_trait]
impl PayrollContract for CorePayrollClient {
    async fn claimable_amount(&self, employee: Address) -> Result<TokenAmount, ContractError> {
        let data = self.read(abi::encode_claimable_amount(employee)).await?;
        abi::decode_claimable_amount(&data)
    }

    async fn stream(&self, employee: Address) -> Result<StreamState, ContractError> {
        let data = self.read(abi::encode_streams(employee)).await?;
        abi::decode_streams(&data)
    }

    async fn tax_rate(&self) -> Result<U256, ContractError> {
        let data = self.read(abi::encode_tax_rate()).await?;
        abi::decode_tax_rate(&data)
    }

    async fn tax_vault(&self) -> Result<Address, ContractError> {
        let data = self.read(abi::encode_tax_vault()).await?;
        abi::decode_tax_vault(&data)
    }

    async fn treasury_balance(&self) -> Result<TokenAmount, ContractError> {
        let data = self.read(abi::encode_treasury_balance()).await?;
        abi::decode_treasury_balance(&data)
    }

    async fn withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError> {
        self.write(wallet, "withdraw", abi::encode_withdraw()).await
    }

    async fn start_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
        rate_per_second: U256,
    ) -> Result<B256, ContractError> {
        self.write(
            wallet,
            "startStream",
            abi::encode_start_stream(employee, rate_per_second),
        )
        .await
    }

    async fn stop_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
    ) -> Result<B256, ContractError> {
        self.write(wallet, "stopStream", abi::encode_stop_stream(employee))
            .await
    }

    async fn emergency_withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError> {
        self.write(
            wallet,
            "emergencyWithdraw",
            abi::encode_emergency_withdraw(),
        )
        .await
    }
}
