use crate::context::{TestContext, employee};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use payroll::adapter::{InMemoryChain, InMemoryContractBinder, InMemoryPayrollApi};
use payroll::domain::{
    AccessToken, ApiError, BlockchainConfig, ContractError, LedgerTransaction, PayrollError,
    Profile, Reading, SessionError, StreamState, TokenAmount, ViewError, WalletHandle,
};
use payroll::port::{ContractBinder, EmployeeApi, PayrollContract};
use payroll::service::{DashboardSettings, EmployeeDashboard, ViewRegistry};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Holds the first `held` profile requests until `release` is notified.
struct GatedApi {
    inner: Arc<InMemoryPayrollApi>,
    held: usize,
    release: Notify,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl GatedApi {
    fn new(inner: Arc<InMemoryPayrollApi>, held: usize) -> Self {
        Self {
            inner,
            held,
            release: Notify::new(),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmployeeApi for GatedApi {
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        self.inner.login(email, password).await
    }

    async fn my_profile(&self) -> Result<Profile, ApiError> {
        let n = self.started.fetch_add(1, Ordering::SeqCst);
        if n < self.held {
            self.release.notified().await;
        }
        let profile = self.inner.my_profile().await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        profile
    }

    async fn my_transactions(&self) -> Result<Vec<LedgerTransaction>, ApiError> {
        self.inner.my_transactions().await
    }

    async fn blockchain_config(&self) -> Result<BlockchainConfig, ApiError> {
        self.inner.blockchain_config().await
    }
}

/// Reads claimable normally, but parks the `hold_call`-th read after it has
/// its value until `release` is notified.
#[derive(Clone)]
struct HeldClaimable {
    chain: Arc<InMemoryChain>,
    gate: Arc<ClaimableGate>,
}

struct ClaimableGate {
    hold_call: usize,
    calls: AtomicUsize,
    parked: AtomicUsize,
    release: Notify,
}

impl HeldClaimable {
    fn new(chain: Arc<InMemoryChain>, hold_call: usize) -> Self {
        Self {
            chain,
            gate: Arc::new(ClaimableGate {
                hold_call,
                calls: AtomicUsize::new(0),
                parked: AtomicUsize::new(0),
                release: Notify::new(),
            }),
        }
    }
}

#[async_trait]
impl PayrollContract for HeldClaimable {
    async fn claimable_amount(&self, employee: Address) -> Result<TokenAmount, ContractError> {
        let n = self.gate.calls.fetch_add(1, Ordering::SeqCst);
        let amount = self.chain.claimable_amount(employee).await;
        if n == self.gate.hold_call {
            self.gate.parked.fetch_add(1, Ordering::SeqCst);
            self.gate.release.notified().await;
        }
        amount
    }

    async fn stream(&self, employee: Address) -> Result<StreamState, ContractError> {
        self.chain.stream(employee).await
    }

    async fn tax_rate(&self) -> Result<U256, ContractError> {
        self.chain.tax_rate().await
    }

    async fn tax_vault(&self) -> Result<Address, ContractError> {
        self.chain.tax_vault().await
    }

    async fn treasury_balance(&self) -> Result<TokenAmount, ContractError> {
        self.chain.treasury_balance().await
    }

    async fn withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError> {
        self.chain.withdraw(wallet).await
    }

    async fn start_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
        rate_per_second: U256,
    ) -> Result<B256, ContractError> {
        self.chain.start_stream(wallet, employee, rate_per_second).await
    }

    async fn stop_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
    ) -> Result<B256, ContractError> {
        self.chain.stop_stream(wallet, employee).await
    }

    async fn emergency_withdraw(&self, wallet: &WalletHandle) -> Result<B256, ContractError> {
        self.chain.emergency_withdraw(wallet).await
    }
}

impl ContractBinder for HeldClaimable {
    fn bind(&self, _address: Address) -> Result<Arc<dyn PayrollContract>, ContractError> {
        Ok(Arc::new(self.clone()))
    }
}

fn gated_registry(ctx: &TestContext, held: usize) -> (ViewRegistry, Arc<GatedApi>) {
    let api = Arc::new(GatedApi::new(ctx.api.clone(), held));
    let dashboard = Arc::new(EmployeeDashboard::new(
        api.clone(),
        Arc::new(InMemoryContractBinder(ctx.chain.clone())),
        ctx.chain.clone(),
        DashboardSettings::default(),
    ));
    let registry = ViewRegistry::with_namespace(
        dashboard,
        format!("gated-{}", uuid::Uuid::new_v4()),
    );
    (registry, api)
}

async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 2s");
}

#[tokio::test]
async fn test_mount_and_refresh() {
    let ctx = TestContext::new().await;
    ctx.stream_to_employee(U256::from(10u64)).await;
    ctx.chain.advance(5);
    let registry = ctx.registry();

    registry
        .mount("home", Some(ctx.employee_wallet()))
        .await
        .unwrap();
    registry.refresh("home").unwrap();
    let state = registry.settled("home").await.unwrap();

    assert!(state.last_error.is_none());
    let snapshot = state.snapshot.unwrap();
    assert_eq!(
        snapshot.accrual.claimable,
        Reading::Known(TokenAmount::from_wei(U256::from(50u64)))
    );

    registry.unmount_all().await;
}

#[tokio::test]
async fn test_mount_is_idempotent() {
    let ctx = TestContext::new().await;
    let registry = ctx.registry();

    let first = registry.mount("home", None).await.unwrap();
    let second = registry.mount("home", None).await.unwrap();
    assert_eq!(first.get_id(), second.get_id());

    registry.unmount("home").await.unwrap();
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let ctx = TestContext::new().await;
    let registry = ctx.registry();
    registry.mount("home", None).await.unwrap();

    registry.refresh("home").unwrap();
    let loaded = registry.settled("home").await.unwrap();
    assert!(loaded.snapshot.is_some());

    ctx.api.set_fail_transactions(true);
    registry.refresh("home").unwrap();
    let failed = registry.settled("home").await.unwrap();

    assert_eq!(failed.snapshot, loaded.snapshot);
    assert_eq!(
        failed.last_error,
        Some(PayrollError::Api(ApiError::Transport(
            "connection reset".to_string()
        )))
    );

    registry.unmount_all().await;
}

#[tokio::test]
async fn test_unmount_cancels_in_flight_refresh() {
    let ctx = TestContext::new().await;
    let (registry, api) = gated_registry(&ctx, 1);
    registry.mount("home", None).await.unwrap();

    registry.refresh("home").unwrap();
    wait_until(|| api.started.load(Ordering::SeqCst) == 1).await;

    registry.unmount("home").await.unwrap();
    wait_until(|| registry.lookup("home").is_none()).await;

    api.release.notify_waiters();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(api.completed.load(Ordering::SeqCst), 0);
    assert!(matches!(
        registry.state("home").await,
        Err(PayrollError::View(ViewError::NotMounted(_)))
    ));
}

#[tokio::test]
async fn test_newer_refresh_supersedes_older() {
    let ctx = TestContext::new().await;
    let (registry, api) = gated_registry(&ctx, 1);
    registry.mount("home", None).await.unwrap();

    registry.refresh("home").unwrap();
    wait_until(|| api.started.load(Ordering::SeqCst) == 1).await;
    registry.refresh("home").unwrap();

    let state = registry.settled("home").await.unwrap();
    assert!(state.snapshot.is_some());
    assert_eq!(api.completed.load(Ordering::SeqCst), 1);

    api.release.notify_waiters();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(api.started.load(Ordering::SeqCst), 2);
    assert_eq!(api.completed.load(Ordering::SeqCst), 1);

    registry.unmount_all().await;
}

#[tokio::test]
async fn test_withdraw_updates_chain_side() {
    let ctx = TestContext::new().await;
    ctx.stream_to_employee(U256::from(1_000u64)).await;
    ctx.chain.advance(20);
    let registry = ctx.registry();

    registry
        .mount("home", Some(ctx.employee_wallet()))
        .await
        .unwrap();
    registry.refresh("home").unwrap();
    let before = registry.settled("home").await.unwrap().snapshot.unwrap();

    let receipt = registry.withdraw("home").await.unwrap();
    assert_eq!(receipt.claimable, Reading::Known(TokenAmount::ZERO));

    let after = registry.state("home").await.unwrap().snapshot.unwrap();
    assert_eq!(after.accrual.claimable, Reading::Known(TokenAmount::ZERO));
    assert_eq!(after.reconciliation.ledger(), before.reconciliation.ledger());

    let records = ctx.chain.withdrawals().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].employee, employee());

    registry.unmount_all().await;
}

#[tokio::test]
async fn test_refresh_started_before_withdraw_does_not_restore_old_claimable() {
    let ctx = TestContext::new().await;
    ctx.stream_to_employee(U256::from(1_000u64)).await;
    ctx.chain.advance(20);

    let contract = HeldClaimable::new(ctx.chain.clone(), 1);
    let dashboard = Arc::new(EmployeeDashboard::new(
        ctx.api.clone(),
        Arc::new(contract.clone()),
        ctx.chain.clone(),
        DashboardSettings::default(),
    ));
    let registry =
        ViewRegistry::with_namespace(dashboard, format!("held-{}", uuid::Uuid::new_v4()));

    registry
        .mount("home", Some(ctx.employee_wallet()))
        .await
        .unwrap();
    registry.refresh("home").unwrap();
    let loaded = registry.settled("home").await.unwrap().snapshot.unwrap();
    assert_eq!(
        loaded.accrual.claimable,
        Reading::Known(TokenAmount::from_wei(U256::from(20_000u64)))
    );

    // Second refresh has read the pre-withdrawal figure and is parked.
    registry.refresh("home").unwrap();
    wait_until(|| contract.gate.parked.load(Ordering::SeqCst) == 1).await;

    let receipt = registry.withdraw("home").await.unwrap();
    assert_eq!(receipt.claimable, Reading::Known(TokenAmount::ZERO));

    contract.gate.release.notify_one();
    let state = registry.settled("home").await.unwrap();

    assert!(state.last_error.is_none());
    assert_eq!(
        state.snapshot.unwrap().accrual.claimable,
        Reading::Known(TokenAmount::ZERO)
    );
    assert_eq!(ctx.chain.withdrawals().await.len(), 1);

    registry.unmount_all().await;
}

#[tokio::test]
async fn test_withdraw_requires_wallet_and_snapshot() {
    let ctx = TestContext::new().await;
    let registry = ctx.registry();
    registry.mount("home", None).await.unwrap();

    assert_eq!(
        registry.withdraw("home").await.unwrap_err(),
        PayrollError::Session(SessionError::NotConnected)
    );

    registry
        .set_wallet("home", Some(ctx.employee_wallet()))
        .unwrap();
    assert_eq!(
        registry.withdraw("home").await.unwrap_err(),
        PayrollError::View(ViewError::NotLoaded)
    );

    registry.unmount_all().await;
}

#[tokio::test]
async fn test_unknown_view_is_not_mounted() {
    let ctx = TestContext::new().await;
    let registry = ctx.registry();

    assert!(matches!(
        registry.refresh("missing"),
        Err(PayrollError::View(ViewError::NotMounted(_)))
    ));
    assert!(matches!(
        registry.unmount("missing").await,
        Err(PayrollError::View(ViewError::NotMounted(_)))
    ));
}

#[tokio::test]
async fn test_unmount_all_stops_every_view() {
    let ctx = TestContext::new().await;
    let registry = ctx.registry();
    registry.mount("home", None).await.unwrap();
    registry.mount("history", None).await.unwrap();

    registry.unmount_all().await;

    wait_until(|| registry.lookup("home").is_none() && registry.lookup("history").is_none())
        .await;
}
