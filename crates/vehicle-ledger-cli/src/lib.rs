pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod persistence;
pub mod session;

pub use cli::*;
pub use config::*;
pub use persistence::*;
pub use session::*;
