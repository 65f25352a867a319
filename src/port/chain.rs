use crate::domain::ContractError;
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Minimal Ethereum JSON-RPC surface the contract client needs.
///
/// Signing is delegated to the node or wallet behind the endpoint
/// (`eth_sendTransaction`); no key material passes through this crate.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `eth_call` against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ContractError>;

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<B256, ContractError>;

    /// `None` while the transaction is still pending.
    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ContractError>;

    async fn accounts(&self) -> Result<Vec<Address>, ContractError>;

    async fn chain_id(&self) -> Result<u64, ContractError>;
}
