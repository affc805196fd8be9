use crate::config::LoggingConfig;
use env_logger::{Builder, Env};

/// Diagnostics go to stderr; stdout is reserved for progress lines.
/// `RUST_LOG` overrides the configured level, `--verbose` forces debug.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    if let Err(err) = Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .try_init()
    {
        log::debug!("logger already initialized: {}", err);
    }
}
