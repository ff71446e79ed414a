//! Tracing initialisation for the auto-release binary.
//!
//! Call [`init_tracing`] once at startup. Later calls are ignored because the
//! global subscriber can only be set once per process.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::LoggingSettings;

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `settings.level`. With `settings.json`
/// set, log lines are newline-delimited JSON.
pub fn init_tracing(settings: &LoggingSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    if settings.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let settings = LoggingSettings::default();
        init_tracing(&settings);
        init_tracing(&LoggingSettings {
            json: true,
            ..settings
        });
        tracing::info!("tracing initialised");
    }
}
