mod api;
mod chain;

pub use api::*;
pub use chain::*;
