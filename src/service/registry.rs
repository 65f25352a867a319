use super::{
    DashboardActor, DashboardArguments, DashboardMessage, DashboardRef, EmployeeDashboard,
    ViewState, WithdrawReceipt,
};
use crate::domain::{PayrollError, ViewError, WalletHandle};
use ractor::{Actor, ActorRef, rpc::CallResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Mounts and unmounts dashboard views by name, using ractor's named-actor
/// registry for lookup.
#[derive(Clone)]
pub struct ViewRegistry {
    mounted: Arc<Mutex<HashSet<String>>>,
    dashboard: Arc<EmployeeDashboard>,
    /// Prefix for actor names so parallel tests do not collide.
    namespace: String,
    call_timeout: Duration,
}

impl ViewRegistry {
    pub fn new(dashboard: Arc<EmployeeDashboard>) -> Self {
        Self::with_namespace(dashboard, String::new())
    }

    pub fn with_namespace(dashboard: Arc<EmployeeDashboard>, namespace: String) -> Self {
        Self {
            mounted: Arc::new(Mutex::new(HashSet::new())),
            dashboard,
            namespace,
            call_timeout: Duration::from_secs(150),
        }
    }

    fn actor_name(&self, view: &str) -> String {
        if self.namespace.is_empty() {
            format!("dashboard-{view}")
        } else {
            format!("{}-dashboard-{}", self.namespace, view)
        }
    }

    pub fn lookup(&self, view: &str) -> Option<DashboardRef> {
        ActorRef::<DashboardMessage>::where_is(self.actor_name(view))
    }

    /// Mount `view`, or return the already-mounted actor with that name.
    pub async fn mount(
        &self,
        view: &str,
        wallet: Option<WalletHandle>,
    ) -> Result<DashboardRef, PayrollError> {
        if let Some(actor) = self.lookup(view) {
            return Ok(actor);
        }

        let name = self.actor_name(view);
        let args = DashboardArguments {
            name: name.clone(),
            dashboard: self.dashboard.clone(),
            wallet,
        };

        let actor = match Actor::spawn(Some(name.clone()), DashboardActor, args).await {
            Ok((actor, _handle)) => actor,
            Err(e) => match self.lookup(view) {
                Some(actor) => actor,
                None => return Err(ViewError::Spawn(format!("{name}: {e}")).into()),
            },
        };

        self.mounted.lock().await.insert(view.to_string());
        Ok(actor)
    }

    fn require(&self, view: &str) -> Result<DashboardRef, PayrollError> {
        self.lookup(view)
            .ok_or_else(|| ViewError::NotMounted(view.to_string()).into())
    }

    pub fn refresh(&self, view: &str) -> Result<(), PayrollError> {
        self.require(view)?
            .cast(DashboardMessage::Refresh)
            .map_err(|e| ViewError::Call(e.to_string()).into())
    }

    pub fn set_wallet(&self, view: &str, wallet: Option<WalletHandle>) -> Result<(), PayrollError> {
        self.require(view)?
            .cast(DashboardMessage::SetWallet(wallet))
            .map_err(|e| ViewError::Call(e.to_string()).into())
    }

    pub async fn state(&self, view: &str) -> Result<ViewState, PayrollError> {
        let actor = self.require(view)?;
        match actor
            .call(DashboardMessage::Snapshot, Some(Duration::from_secs(5)))
            .await
        {
            Ok(CallResult::Success(state)) => Ok(state),
            Ok(CallResult::Timeout) => Err(ViewError::Timeout.into()),
            Ok(CallResult::SenderError) => Err(ViewError::Call("sender dropped".to_string()).into()),
            Err(e) => Err(ViewError::Call(e.to_string()).into()),
        }
    }

    /// Poll until the view is no longer loading.
    pub async fn settled(&self, view: &str) -> Result<ViewState, PayrollError> {
        loop {
            let state = self.state(view).await?;
            if !state.loading {
                return Ok(state);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn withdraw(&self, view: &str) -> Result<WithdrawReceipt, PayrollError> {
        let actor = self.require(view)?;
        match actor
            .call(DashboardMessage::Withdraw, Some(self.call_timeout))
            .await
        {
            Ok(CallResult::Success(result)) => result,
            Ok(CallResult::Timeout) => Err(ViewError::Timeout.into()),
            Ok(CallResult::SenderError) => {
                Err(ViewError::Call("withdrawal cancelled".to_string()).into())
            }
            Err(e) => Err(ViewError::Call(e.to_string()).into()),
        }
    }

    pub async fn unmount(&self, view: &str) -> Result<(), PayrollError> {
        self.mounted.lock().await.remove(view);
        self.require(view)?
            .cast(DashboardMessage::Unmount)
            .map_err(|e| ViewError::Call(e.to_string()).into())
    }

    pub async fn unmount_all(&self) {
        let views: Vec<String> = self.mounted.lock().await.drain().collect();
        for view in views {
            if let Some(actor) = self.lookup(&view) {
                let _ = actor.cast(DashboardMessage::Unmount);
            }
        }
    }
}
