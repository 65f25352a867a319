use super::{DashboardSnapshot, EmployeeDashboard, WithdrawReceipt};
use crate::domain::{
    PayrollError, Reading, SessionError, TokenAmount, ViewError, WalletHandle,
};
use async_trait::async_trait;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What a mounted dashboard currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub snapshot: Option<DashboardSnapshot>,
    pub last_error: Option<PayrollError>,
    pub loading: bool,
}

pub enum DashboardMessage {
    /// Start a fetch; any fetch still in flight is cancelled.
    Refresh,
    Snapshot(RpcReplyPort<ViewState>),
    Withdraw(RpcReplyPort<Result<WithdrawReceipt, PayrollError>>),
    SetWallet(Option<WalletHandle>),
    /// Cancel every in-flight task and stop the view.
    Unmount,
    RefreshCompleted(u64, Box<Result<DashboardSnapshot, PayrollError>>),
    WithdrawCompleted(Reading<TokenAmount>),
}

pub struct DashboardArguments {
    pub name: String,
    pub dashboard: Arc<EmployeeDashboard>,
    pub wallet: Option<WalletHandle>,
}

pub struct DashboardActorState {
    pub name: String,
    pub dashboard: Arc<EmployeeDashboard>,
    pub wallet: Option<WalletHandle>,
    pub view: ViewState,
    /// Bumped on every refresh. A completion carrying an older value is
    /// stale and dropped.
    pub generation: u64,
    pub refresh_task: Option<JoinHandle<()>>,
    pub withdrawals: Vec<JoinHandle<()>>,
    pub mounted: bool,
}

impl DashboardActorState {
    fn cancel_all(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
        for task in self.withdrawals.drain(..) {
            task.abort();
        }
    }
}

/// One mounted employee dashboard.
///
/// All view state is owned here and mutated only from `handle`, so a fetch
/// finishing after `Unmount` has nowhere to write.
pub struct DashboardActor;

#[async_trait]
impl Actor for DashboardActor {
    type Msg = DashboardMessage;
    type State = DashboardActorState;
    type Arguments = DashboardArguments;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Dashboard view {} mounted", args.name);
        Ok(DashboardActorState {
            name: args.name,
            dashboard: args.dashboard,
            wallet: args.wallet,
            view: ViewState::default(),
            generation: 0,
            refresh_task: None,
            withdrawals: Vec::new(),
            mounted: true,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DashboardMessage::Refresh => {
                if !state.mounted {
                    return Ok(());
                }
                if let Some(previous) = state.refresh_task.take() {
                    previous.abort();
                }
                state.generation += 1;
                let generation = state.generation;
                state.view.loading = true;

                let dashboard = state.dashboard.clone();
                let wallet = state.wallet.clone();
                let reply_to = myself.clone();
                state.refresh_task = Some(tokio::spawn(async move {
                    let result = dashboard.refresh(wallet.as_ref()).await;
                    let _ = reply_to.cast(DashboardMessage::RefreshCompleted(
                        generation,
                        Box::new(result),
                    ));
                }));
            }

            DashboardMessage::RefreshCompleted(generation, result) => {
                if !state.mounted || generation != state.generation {
                    tracing::debug!(
                        "View {} dropped stale refresh (generation {}, current {})",
                        state.name,
                        generation,
                        state.generation
                    );
                    return Ok(());
                }
                state.view.loading = false;
                state.refresh_task = None;
                match *result {
                    Ok(snapshot) => {
                        state.view.snapshot = Some(snapshot);
                        state.view.last_error = None;
                    }
                    Err(e) => {
                        tracing::warn!("View {} refresh failed: {}", state.name, e);
                        state.view.last_error = Some(e);
                    }
                }
            }

            DashboardMessage::Snapshot(reply) => {
                let _ = reply.send(state.view.clone());
            }

            DashboardMessage::SetWallet(wallet) => {
                state.wallet = wallet;
            }

            DashboardMessage::Withdraw(reply) => {
                let Some(wallet) = state.wallet.clone() else {
                    let _ = reply.send(Err(SessionError::NotConnected.into()));
                    return Ok(());
                };
                let Some(snapshot) = state.view.snapshot.clone() else {
                    let _ = reply.send(Err(ViewError::NotLoaded.into()));
                    return Ok(());
                };

                state.withdrawals.retain(|t| !t.is_finished());
                let dashboard = state.dashboard.clone();
                let reply_to = myself.clone();
                state.withdrawals.push(tokio::spawn(async move {
                    let result = dashboard.withdraw(&snapshot, &wallet).await;
                    if let Ok(receipt) = &result {
                        let _ =
                            reply_to.cast(DashboardMessage::WithdrawCompleted(receipt.claimable));
                    }
                    let _ = reply.send(result);
                }));
            }

            DashboardMessage::WithdrawCompleted(claimable) => {
                if !state.mounted {
                    return Ok(());
                }
                // A fetch started before the withdrawal mined carries the old
                // claimable figure.
                state.generation += 1;
                if let Some(stale) = state.refresh_task.take() {
                    stale.abort();
                    let _ = myself.cast(DashboardMessage::Refresh);
                }
                if let Some(snapshot) = state.view.snapshot.take() {
                    state.view.snapshot = Some(snapshot.with_claimable(claimable));
                }
            }

            DashboardMessage::Unmount => {
                state.mounted = false;
                state.cancel_all();
                tracing::info!("Dashboard view {} unmounted", state.name);
                myself.stop(None);
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.mounted = false;
        state.cancel_all();
        Ok(())
    }
}

pub type DashboardRef = ActorRef<DashboardMessage>;
