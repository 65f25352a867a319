mod accrual;
mod amount;
mod error;
mod ledger;
mod model;
mod reconciliation;
mod session;
mod stream;
mod tax;

pub use accrual::*;
pub use amount::*;
pub use error::*;
pub use ledger::*;
pub use model::*;
pub use reconciliation::*;
pub use session::*;
pub use stream::*;
pub use tax::*;
