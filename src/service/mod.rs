mod boot;
mod dashboard;
mod employer;
mod ledger;
pub mod mock;
mod registry;
mod view;

pub use boot::*;
pub use dashboard::*;
pub use employer::*;
pub use ledger::*;
pub use registry::*;
pub use view::*;
