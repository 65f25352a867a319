use crate::domain::SessionError;
use alloy_primitives::Address;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A connected wallet.
///
/// Handles are cheap to clone and all clones share one lifecycle: once
/// `disconnect` is called on any of them, every clone refuses further use.
/// There is no process-wide wallet; whoever connects owns the handle and
/// passes it to the operations that need a signer.
#[derive(Debug, Clone)]
pub struct WalletHandle {
    address: Address,
    chain_id: u64,
    live: Arc<AtomicBool>,
}

impl WalletHandle {
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self {
            address,
            chain_id,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// The signing address, if the session is still live.
    pub fn address(&self) -> Result<Address, SessionError> {
        self.ensure_live()?;
        Ok(self.address)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn ensure_live(&self) -> Result<(), SessionError> {
        if self.is_live() {
            Ok(())
        } else {
            Err(SessionError::Disconnected)
        }
    }

    pub fn disconnect(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            tracing::info!("Wallet session {} disconnected", self.address);
        }
    }

    /// Reject a wallet that differs from the one HR linked to the profile.
    pub fn verify_expected(&self, expected: Option<&str>) -> Result<(), SessionError> {
        let Some(expected) = expected else {
            return Ok(());
        };
        let connected = self.address()?.to_string();
        if expected.trim().eq_ignore_ascii_case(&connected) {
            Ok(())
        } else {
            Err(SessionError::WalletMismatch {
                expected: expected.trim().to_string(),
                connected: short_address(&connected),
            })
        }
    }
}

/// `0x12345678...9abcdef0` style abbreviation for user-facing messages.
pub fn short_address(address: &str) -> String {
    if address.len() <= 18 {
        return address.to_string();
    }
    format!("{}...{}", &address[..10], &address[address.len() - 8..])
}
