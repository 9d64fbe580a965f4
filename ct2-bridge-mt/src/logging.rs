use crate::config::Logging;
use crate::error::{MtError, MtResult};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Map a configured level to an `EnvFilter` directive, `warn` when unknown
pub fn level_directive(level: &str) -> &'static str {
    match level.to_ascii_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARN" => "warn",
        "ERROR" => "error",
        _ => "warn",
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level; `verbose` raises the
/// configured level to `debug`. Logs go to stderr unless a path is set.
pub fn init_logging(logging: &Logging, verbose: bool) -> MtResult<()> {
    if !logging.enable && !verbose {
        return Ok(());
    }

    let level = if verbose {
        "debug"
    } else {
        level_directive(&logging.level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = match logging.path.as_deref().filter(|p| !p.is_empty()) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|e| MtError::Config(format!("Failed to initialize logging: {}", e)))
}
