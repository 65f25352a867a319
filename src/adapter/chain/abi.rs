//! Typed boundary to the CorePayroll ABI.
//!
//! Calldata is produced from generated call structs and return data is decoded
//! strictly: a payload of the wrong shape is an error, never a default.

use crate::domain::{ContractError, StreamState, TokenAmount};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};

sol! {
    interface ICorePayroll {
        function getTreasuryBalance() external view returns (uint256 balance);
        function startStream(address employee, uint256 ratePerSecond) external;
        function stopStream(address employee) external;
        function claimableAmount(address employee) external view returns (uint256 amount);
        function streams(address employee) external view returns (
            uint256 ratePerSecond,
            uint256 lastWithdrawTime,
            uint256 accruedBalance,
            bool isActive
        );
        function TAX_RATE() external view returns (uint256 rate);
        function taxVault() external view returns (address vault);
        function withdraw() external;
        function emergencyWithdraw() external;
    }
}

fn decode_error(method: &'static str, err: impl std::fmt::Display) -> ContractError {
    ContractError::Decode {
        method,
        reason: err.to_string(),
    }
}

pub fn encode_claimable_amount(employee: Address) -> Bytes {
    ICorePayroll::claimableAmountCall { employee }.abi_encode().into()
}

pub fn decode_claimable_amount(data: &[u8]) -> Result<TokenAmount, ContractError> {
    ICorePayroll::claimableAmountCall::abi_decode_returns(data, true)
        .map(|ret| TokenAmount::from_wei(ret.amount))
        .map_err(|e| decode_error("claimableAmount", e))
}

pub fn encode_streams(employee: Address) -> Bytes {
    ICorePayroll::streamsCall { employee }.abi_encode().into()
}

pub fn decode_streams(data: &[u8]) -> Result<StreamState, ContractError> {
    let ret = ICorePayroll::streamsCall::abi_decode_returns(data, true)
        .map_err(|e| decode_error("streams", e))?;

    let last_withdraw_time = u64::try_from(ret.lastWithdrawTime).map_err(|_| {
        decode_error(
            "streams",
            format!("lastWithdrawTime {} exceeds u64", ret.lastWithdrawTime),
        )
    })?;

    Ok(StreamState {
        rate_per_second: ret.ratePerSecond,
        last_withdraw_time,
        accrued_balance: ret.accruedBalance,
        is_active: ret.isActive,
    })
}

pub fn encode_tax_rate() -> Bytes {
    ICorePayroll::TAX_RATECall {}.abi_encode().into()
}

pub fn decode_tax_rate(data: &[u8]) -> Result<U256, ContractError> {
    ICorePayroll::TAX_RATECall::abi_decode_returns(data, true)
        .map(|ret| ret.rate)
        .map_err(|e| decode_error("TAX_RATE", e))
}

pub fn encode_tax_vault() -> Bytes {
    ICorePayroll::taxVaultCall {}.abi_encode().into()
}

pub fn decode_tax_vault(data: &[u8]) -> Result<Address, ContractError> {
    ICorePayroll::taxVaultCall::abi_decode_returns(data, true)
        .map(|ret| ret.vault)
        .map_err(|e| decode_error("taxVault", e))
}

pub fn encode_treasury_balance() -> Bytes {
    ICorePayroll::getTreasuryBalanceCall {}.abi_encode().into()
}

pub fn decode_treasury_balance(data: &[u8]) -> Result<TokenAmount, ContractError> {
    ICorePayroll::getTreasuryBalanceCall::abi_decode_returns(data, true)
        .map(|ret| TokenAmount::from_wei(ret.balance))
        .map_err(|e| decode_error("getTreasuryBalance", e))
}

pub fn encode_withdraw() -> Bytes {
    ICorePayroll::withdrawCall {}.abi_encode().into()
}

pub fn encode_start_stream(employee: Address, rate_per_second: U256) -> Bytes {
    ICorePayroll::startStreamCall {
        employee,
        ratePerSecond: rate_per_second,
    }
    .abi_encode()
    .into()
}

pub fn encode_stop_stream(employee: Address) -> Bytes {
    ICorePayroll::stopStreamCall { employee }.abi_encode().into()
}

pub fn encode_emergency_withdraw() -> Bytes {
    ICorePayroll::emergencyWithdrawCall {}.abi_encode().into()
}
