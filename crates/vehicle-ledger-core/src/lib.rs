pub mod ledger;
pub mod snapshot;

pub use ledger::*;
pub use snapshot::*;
