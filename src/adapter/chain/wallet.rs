use crate::domain::{ContractError, PayrollError, SessionError, WalletHandle};
use crate::port::{ChainRpc, WalletConnector};
use async_trait::async_trait;
use std::sync::Arc;

/// Connects to the first account the RPC endpoint manages, after checking
/// that the endpoint serves the expected chain.
pub struct RpcWalletConnector {
    rpc: Arc<dyn ChainRpc>,
    expected_chain_id: u64,
}

impl RpcWalletConnector {
    pub fn new(rpc: Arc<dyn ChainRpc>, expected_chain_id: u64) -> Self {
        Self {
            rpc,
            expected_chain_id,
        }
    }
}

#[async_trait]
impl WalletConnector for RpcWalletConnector {
    async fn connect(&self) -> Result<WalletHandle, PayrollError> {
        let chain_id = self.rpc.chain_id().await?;
        if chain_id != self.expected_chain_id {
            return Err(ContractError::UnsupportedChain {
                expected: self.expected_chain_id,
                actual: chain_id,
            }
            .into());
        }

        let accounts = self.rpc.accounts().await?;
        let address = accounts
            .first()
            .copied()
            .ok_or(PayrollError::Session(SessionError::NoAccounts))?;

        tracing::info!("Wallet connected: {} on chain {}", address, chain_id);
        Ok(WalletHandle::new(address, chain_id))
    }
}
