//! This module provides the logging hooks for native calls.
//!
//! Every dispatched call can be traced as one structured key-value line through
//! the `log` facade. `init_logging` installs an `env_logger` backend once per
//! process; embedders that install their own logger simply skip it.

use crate::config::LogConfig;
use crate::error::KhivaError;
use std::fs::OpenOptions;
use std::sync::Once;

/// Logs a structured key-value line at trace level.
///
/// The fragments are only formatted when trace logging is enabled.
///
/// # Example
/// ```ignore
/// log_call!("event"="invoke", "entry"=entry.name, "inputs"=inputs.len());
/// ```
macro_rules! log_call {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(log::Level::Trace) {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            log::trace!("KHIVA_CALL: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs the process-wide `env_logger` backend.
///
/// The level comes from `config`; a `KHIVA_LOG` environment variable, if set,
/// overrides it with `env_logger` filter syntax. Only the first call has any
/// effect.
pub fn init_logging(config: &LogConfig) -> Result<(), KhivaError> {
    let target = match &config.file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };
    let level = config.level.into();

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);
        if let Ok(filters) = std::env::var("KHIVA_LOG") {
            builder.parse_filters(&filters);
        }

        // Custom formatter: just print the level and message
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
