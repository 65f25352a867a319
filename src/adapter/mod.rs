mod chain;
mod http;
mod memory;

pub use chain::*;
pub use http::*;
pub use memory::*;
