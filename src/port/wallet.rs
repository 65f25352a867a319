use crate::domain::{PayrollError, WalletHandle};
use async_trait::async_trait;

/// Bridge to whatever wallet infrastructure produces a signer
/// (embedded-wallet login, a node-managed account, a test double).
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Establish a session and hand back its handle.
    async fn connect(&self) -> Result<WalletHandle, PayrollError>;

    /// End the session; the handle and all its clones become unusable.
    async fn disconnect(&self, handle: &WalletHandle) -> Result<(), PayrollError> {
        handle.disconnect();
        Ok(())
    }
}
