//! Logging setup.

use crate::error::LoggingError;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`. `json` switches to one JSON
/// object per line for log shipping.
///
/// # Examples
/// ```no_run
/// dmlabel::logging::init_logging("info", false)?;
/// # Ok::<(), dmlabel::error::LoggingError>(())
/// ```
pub fn init_logging(level: &str, json: bool) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| LoggingError::Init(e.to_string()))
}
