use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Failures talking to the off-chain REST backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Unauthorized: session token cleared")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed response body: {0}")]
    Decode(String),
}

/// Failures reading from or writing to the CorePayroll contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("No contract address configured")]
    NotConfigured,
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("ABI decode failed for {method}: {reason}")]
    Decode { method: &'static str, reason: String },
    #[error("Transaction reverted: {0}")]
    Reverted(String),
    #[error("Timed out waiting for receipt of {0}")]
    ReceiptTimeout(String),
    #[error("Unsupported chain: expected {expected}, connected to {actual}")]
    UnsupportedChain { expected: u64, actual: u64 },
    #[error("Wallet unavailable: {0}")]
    Session(SessionError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures of the wallet session lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Wallet session has been disconnected")]
    Disconnected,
    #[error("No wallet connected")]
    NotConnected,
    #[error("Wallet provider returned no accounts")]
    NoAccounts,
    #[error("Wallet mismatch: expected {expected}, connected {connected}")]
    WalletMismatch { expected: String, connected: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("Cannot parse config: {0}")]
    Parse(String),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures of the per-view actors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Failed to spawn view {0}")]
    Spawn(String),
    #[error("View {0} is not mounted")]
    NotMounted(String),
    #[error("View has not loaded yet")]
    NotLoaded,
    #[error("View call timed out")]
    Timeout,
    #[error("View call failed: {0}")]
    Call(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayrollError {
    Api(ApiError),
    Contract(ContractError),
    Session(SessionError),
    Config(ConfigError),
    View(ViewError),
}

impl Display for PayrollError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PayrollError::Api(e) => e.fmt(f),
            PayrollError::Contract(e) => e.fmt(f),
            PayrollError::Session(e) => e.fmt(f),
            PayrollError::Config(e) => e.fmt(f),
            PayrollError::View(e) => e.fmt(f),
        }
    }
}

impl From<ApiError> for PayrollError {
    fn from(e: ApiError) -> Self {
        PayrollError::Api(e)
    }
}

impl From<ContractError> for PayrollError {
    fn from(e: ContractError) -> Self {
        PayrollError::Contract(e)
    }
}

impl From<SessionError> for PayrollError {
    fn from(e: SessionError) -> Self {
        PayrollError::Session(e)
    }
}

impl From<ConfigError> for PayrollError {
    fn from(e: ConfigError) -> Self {
        PayrollError::Config(e)
    }
}

impl From<ViewError> for PayrollError {
    fn from(e: ViewError) -> Self {
        PayrollError::View(e)
    }
}
