//! Tracing subscriber bootstrap.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this more
/// than once returns an error from the second call on.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(settings, from_env.as_deref())?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    result.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!(
        target: "bookshelf-telemetry",
        format = ?settings.log_format,
        "tracing initialized"
    );
    Ok(())
}

/// Parse `from_env` when it is a valid filter, otherwise the configured one.
fn build_filter(
    settings: &TelemetrySettings,
    from_env: Option<&str>,
) -> anyhow::Result<EnvFilter> {
    if let Some(filter) = from_env.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return Ok(filter);
    }

    EnvFilter::try_new(&settings.filter)
        .map_err(|e| anyhow!("invalid log filter '{}': {e}", settings.filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn with_filter(filter: &str) -> TelemetrySettings {
        TelemetrySettings {
            filter: filter.to_string(),
            ..TelemetrySettings::default()
        }
    }

    #[test]
    fn configured_filter_is_used_without_env_override() {
        let filter = build_filter(&with_filter("debug,sqlx=warn"), None).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn env_override_takes_precedence() {
        let filter = build_filter(&with_filter("trace"), Some("error")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn unparseable_env_override_falls_back_to_configured_filter() {
        let filter = build_filter(&with_filter("warn"), Some("sqlx=loudest")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn invalid_configured_filter_is_an_error() {
        let err = build_filter(&with_filter("sqlx=loudest"), None).unwrap_err();
        assert!(err.to_string().contains("invalid log filter 'sqlx=loudest'"));
    }

    #[test]
    fn init_twice_fails_the_second_time() {
        let settings = TelemetrySettings::default();
        let _ = init(&settings);
        assert!(init(&settings).is_err());
    }
}
