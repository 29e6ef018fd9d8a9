use tracing_subscriber::EnvFilter;

use crate::config::LedgerConfig;

/// Install the global subscriber. Logs go to stderr so command output stays clean.
pub fn init(config: &LedgerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
}
