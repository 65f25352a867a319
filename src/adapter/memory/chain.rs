use crate::domain::{
    ContractError, PayrollError, SessionError, StreamState, TokenAmount, WalletHandle, accrue,
    elapsed_seconds,
};
use crate::port::{Clock, ContractBinder, PayrollContract, WalletConnector};
use alloy_primitives::{Address, B256, U256, keccak256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use tokio::sync::RwLock;

/// What the simulated contract paid out on a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawalRecord {
    pub employee: Address,
    pub net: U256,
    pub tax: U256,
}

struct ChainData {
    streams: HashMap<Address, StreamState>,
    treasury: U256,
    tax_vault_balance: U256,
    withdrawals: Vec<WithdrawalRecord>,
}

/// In-process stand-in for a deployed CorePayroll.
///
/// Follows the contract's observable rules closely enough for tests and the
/// CLI demo: accrual by rate and elapsed time, a one-way tax split on
/// withdraw, employer-only stream control, and a treasury that must cover
/// every payout.
pub struct InMemoryChain {
    data: Arc<RwLock<ChainData>>,
    employer: Address,
    tax_vault: Address,
    tax_rate: U256,
    chain_id: u64,
    now: AtomicI64,
    connected_account: RwLock<Option<Address>>,
    fail_reads: AtomicBool,
    tx_counter: AtomicU64,
}

impl InMemoryChain {
    pub fn new(employer: Address, tax_vault: Address, tax_rate: u64, now: i64) -> Self {
        Self {
            data: Arc::new(RwLock::new(ChainData {
                streams: HashMap::new(),
                treasury: U256::ZERO,
                tax_vault_balance: U256::ZERO,
                withdrawals: Vec::new(),
            })),
            employer,
            tax_vault,
            tax_rate: U256::from(tax_rate),
            chain_id: 666888,
            now: AtomicI64::new(now),
            connected_account: RwLock::new(None),
            fail_reads: AtomicBool::new(false),
            tx_counter: AtomicU64::new(0),
        }
    }

    pub fn set_time(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    /// Make every read fail as if the RPC endpoint were unreachable.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Account handed out by `connect`.
    pub async fn set_connected_account(&self, account: Address) {
        *self.connected_account.write().await = Some(account);
    }

    pub async fn fund(&self, amount: U256) {
        let mut data = self.data.write().await;
        data.treasury = data.treasury.saturating_add(amount);
    }

    pub async fn tax_vault_balance(&self) -> U256 {
        self.data.read().await.tax_vault_balance
    }

    pub async fn withdrawals(&self) -> Vec<WithdrawalRecord> {
        self.data.read().await.withdrawals.clone()
    }

    fn check_reads(&self) -> Result<(), ContractError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(ContractError::Rpc("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn next_hash(&self) -> B256 {
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        keccak256(n.to_be_bytes())
    }

    fn require_employer(&self, wallet: &WalletHandle) -> Result<Address, ContractError> {
        let sender = wallet.address().map_err(ContractError::Session)?;
        if sender != self.employer {
            return Err(ContractError::Reverted("Only employer".to_string()));
        }
        Ok(sender)
    }

    fn settled(&self, stream: &StreamState) -> U256 {
        let elapsed = elapsed_seconds(stream.last_withdraw_time, self.now());
        accrue(
            stream.accrued_balance,
            stream.rate_per_second,
            elapsed as i64,
            stream.is_active,
        )
    }
}

#[async_trait]
impl PayrollContract for InMemoryChain {
    async fn claimable_amount(&self, employee: Address) -> Result<TokenAmount, ContractError> {
        self.check_reads()?;
        let data = self.data.read().await;
        let claimable = data
            .streams
            .get(&employee)
            .map(|s| self.settled(s))
            .unwrap_or(U256::ZERO);
        Ok(TokenAmount::from_wei(claimable))
    }

    async fn stream(&self, employee: Address) -> Result<StreamState, ContractError> {
        self.check_reads()?;
        let data = self.data.read().await;
        Ok(data
            .streams
            .get(&employee)
            .copied()
            .unwrap_or_else(StreamState::inactive))
    }

    async fn tax_rate(&self) -> Result<U256, ContractError> {
        self.check_reads()?;
        Ok(self.tax_rate)
    }

    async fn tax_vault(&self) -> Result<Address, ContractError> {
        self.check_reads()?;
        Ok(self.tax_vault)
    }

    async fn treasury_balance(&self) -> Result<TokenAmount, ContractError> {
        self.check_reads()?;
        Ok(TokenAmount::from_wei(self.data.read().await.treasury))
    }

    async fn withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError> {
        let employee = wallet.address().map_err(ContractError::Session)?;
        let now = self.now().max(0) as u64;
        let mut data = self.data.write().await;

        let stream = data
            .streams
            .get(&employee)
            .copied()
            .ok_or_else(|| ContractError::Reverted("No stream".to_string()))?;
        let claimable = self.settled(&stream);
        if claimable.is_zero() {
            return Err(ContractError::Reverted("Nothing to withdraw".to_string()));
        }
        if data.treasury < claimable {
            return Err(ContractError::Reverted("Insufficient treasury".to_string()));
        }

        let tax = claimable * self.tax_rate / U256::from(100u64);
        let net = claimable - tax;

        data.treasury -= claimable;
        data.tax_vault_balance = data.tax_vault_balance.saturating_add(tax);
        data.streams.insert(
            employee,
            StreamState {
                accrued_balance: U256::ZERO,
                last_withdraw_time: now,
                ..stream
            },
        );
        data.withdrawals.push(WithdrawalRecord { employee, net, tax });

        Ok(self.next_hash())
    }

    async fn start_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
        rate_per_second: U256,
    ) -> Result<B256, ContractError> {
        self.require_employer(wallet)?;
        if rate_per_second.is_zero() {
            return Err(ContractError::Reverted("Rate must be positive".to_string()));
        }
        let now = self.now().max(0) as u64;
        let mut data = self.data.write().await;

        let accrued = data
            .streams
            .get(&employee)
            .map(|s| self.settled(s))
            .unwrap_or(U256::ZERO);
        data.streams.insert(
            employee,
            StreamState {
                rate_per_second,
                last_withdraw_time: now,
                accrued_balance: accrued,
                is_active: true,
            },
        );
        Ok(self.next_hash())
    }

    async fn stop_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
    ) -> Result<B256, ContractError> {
        self.require_employer(wallet)?;
        let now = self.now().max(0) as u64;
        let mut data = self.data.write().await;

        let stream = data
            .streams
            .get(&employee)
            .copied()
            .filter(|s| s.is_active)
            .ok_or_else(|| ContractError::Reverted("Stream not active".to_string()))?;
        let accrued = self.settled(&stream);
        data.streams.insert(
            employee,
            StreamState {
                rate_per_second: stream.rate_per_second,
                last_withdraw_time: now,
                accrued_balance: accrued,
                is_active: false,
            },
        );
        Ok(self.next_hash())
    }

    async fn emergency_withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError> {
        self.require_employer(wallet)?;
        self.data.write().await.treasury = U256::ZERO;
        Ok(self.next_hash())
    }
}

impl Clock for InMemoryChain {
    fn now_unix(&self) -> i64 {
        self.now()
    }
}

#[async_trait]
impl WalletConnector for InMemoryChain {
    async fn connect(&self) -> Result<WalletHandle, PayrollError> {
        let account = (*self.connected_account.read().await)
            .ok_or(PayrollError::Session(SessionError::NoAccounts))?;
        Ok(WalletHandle::new(account, self.chain_id))
    }
}

/// Hands out the same simulated contract for every non-zero address.
pub struct InMemoryContractBinder(pub Arc<InMemoryChain>);

impl ContractBinder for InMemoryContractBinder {
    fn bind(&self, address: Address) -> Result<Arc<dyn PayrollContract>, ContractError> {
        if address == Address::ZERO {
            return Err(ContractError::NotConfigured);
        }
        Ok(self.0.clone())
    }
}
