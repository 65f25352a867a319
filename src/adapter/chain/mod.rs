pub mod abi;
mod contract;
mod rpc;
mod wallet;

pub use contract::*;
pub use rpc::*;
pub use wallet::*;
