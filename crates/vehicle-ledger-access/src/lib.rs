pub mod recorders;
pub mod registry;

pub use recorders::*;
pub use registry::*;
