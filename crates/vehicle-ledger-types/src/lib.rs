pub mod error;
pub mod event;
pub mod identity;
pub mod record;

pub use error::*;
pub use event::*;
pub use identity::*;
pub use record::*;
