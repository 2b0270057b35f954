//! Logging initialization for the vulnsync binary.
//!
//! Configures `tracing-subscriber` from the `[general]` section of
//! `VulnsyncConfig`. `RUST_LOG` takes precedence over the configured level.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vulnsync_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros are used.
/// Logs go to stderr so that stdout carries only command output.
///
/// # Formats
///
/// * `"json"` - Machine-parseable JSON lines (CI log collectors)
/// * `"pretty"` - Human-readable multi-line output
/// * `"compact"` - Single-line human-readable output
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let fmt_layer = match config.log_format.as_str() {
        "json" => fmt_layer.json().boxed(),
        "pretty" => fmt_layer.pretty().boxed(),
        "compact" => fmt_layer.compact().boxed(),
        other => {
            return Err(anyhow::anyhow!(
                "unknown log format '{}', expected 'json', 'pretty' or 'compact'",
                other
            ));
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| {
            anyhow::anyhow!(
                "failed to initialize {} tracing subscriber: {}",
                config.log_format,
                e
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_format_is_rejected() {
        let config = GeneralConfig {
            log_level: "info".to_owned(),
            log_format: "xml".to_owned(),
        };
        let err = init_tracing(&config).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_compact_format_installs_subscriber() {
        let config = GeneralConfig {
            log_level: "debug".to_owned(),
            log_format: "compact".to_owned(),
        };
        init_tracing(&config).expect("first initialization succeeds");
        let err = init_tracing(&config).unwrap_err();
        assert!(err.to_string().contains("compact"));
    }
}
