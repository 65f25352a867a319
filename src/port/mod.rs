mod api;
mod chain;
mod clock;
mod contract;
mod wallet;

pub use api::*;
pub use chain::*;
pub use clock::*;
pub use contract::*;
pub use wallet::*;
