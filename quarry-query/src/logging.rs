//! Environment-driven `tracing` setup.
//!
//! | Variable | Values | Effect |
//! |----------|--------|--------|
//! | `QUARRY_DEBUG` | `true`, `1`, `yes` | log at `debug` |
//! | `QUARRY_LOG_LEVEL` | `trace` .. `error` | explicit level, wins over `QUARRY_DEBUG` |
//! | `QUARRY_LOG_FORMAT` | `json`, `pretty`, `compact` | output format, `json` by default |
//!
//! ```rust,no_run
//! quarry_query::logging::init();
//! ```
//!
//! A subscriber is only installed with the `tracing-subscriber` feature. Without it the
//! crate's events go to whatever subscriber the application sets up.

use std::env;
use std::str::FromStr;
use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human-oriented.
    Pretty,
    /// Single-line.
    Compact,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            _ => Err(()),
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Most verbose level emitted for quarry targets.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Read settings from the environment.
    ///
    /// Returns `None` when neither `QUARRY_DEBUG` nor a valid `QUARRY_LOG_LEVEL` is set,
    /// meaning logging was not asked for.
    pub fn from_env() -> Option<Self> {
        let debug = env::var("QUARRY_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        let explicit = env::var("QUARRY_LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse::<Level>().ok());

        let level = match (explicit, debug) {
            (Some(level), _) => level,
            (None, true) => Level::DEBUG,
            (None, false) => return None,
        };
        let format = env::var("QUARRY_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Some(Self { level, format })
    }

    /// `EnvFilter` directive limiting output to the quarry crates.
    pub fn directive(&self) -> String {
        let level = self.level.as_str().to_ascii_lowercase();
        ["quarry", "quarry_query", "quarry_sqlite", "quarry_mysql"]
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install a subscriber from the environment, if logging was asked for.
///
/// Only the first call of [`init`] or [`init_with`] has an effect.
pub fn init() {
    if let Some(settings) = LogSettings::from_env() {
        init_with(settings);
    }
}

/// Install a subscriber with explicit settings.
///
/// Leaves an already installed global subscriber in place.
pub fn init_with(settings: LogSettings) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::new(settings.directive());
            let registry = tracing_subscriber::registry().with(filter);
            let installed = match settings.format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = %settings.level,
                    format = ?settings.format,
                    "quarry logging initialized"
                );
            }
        }
        #[cfg(not(feature = "tracing-subscriber"))]
        let _ = settings;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse(), Ok(LogFormat::Json));
        assert_eq!("compact".parse(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_directive_covers_every_crate() {
        let settings = LogSettings {
            level: Level::TRACE,
            format: LogFormat::Pretty,
        };
        assert_eq!(
            settings.directive(),
            "quarry=trace,quarry_query=trace,quarry_sqlite=trace,quarry_mysql=trace"
        );
    }

    // The only test that touches these variables, so parallel tests never race on them.
    #[test]
    fn test_settings_from_env() {
        // SAFETY: no other test in this crate reads or writes QUARRY_* variables.
        unsafe {
            env::remove_var("QUARRY_DEBUG");
            env::remove_var("QUARRY_LOG_LEVEL");
            env::remove_var("QUARRY_LOG_FORMAT");
        }
        assert_eq!(LogSettings::from_env(), None);

        unsafe { env::set_var("QUARRY_DEBUG", "YES") };
        assert_eq!(
            LogSettings::from_env(),
            Some(LogSettings {
                level: Level::DEBUG,
                format: LogFormat::Json,
            })
        );

        unsafe {
            env::set_var("QUARRY_LOG_LEVEL", "Trace");
            env::set_var("QUARRY_LOG_FORMAT", "compact");
        }
        let settings = LogSettings::from_env().unwrap();
        assert_eq!(settings.level, Level::TRACE);
        assert_eq!(settings.format, LogFormat::Compact);

        // An unparsable level falls back to QUARRY_DEBUG.
        unsafe { env::set_var("QUARRY_LOG_LEVEL", "loud") };
        assert_eq!(LogSettings::from_env().unwrap().level, Level::DEBUG);

        unsafe {
            env::remove_var("QUARRY_DEBUG");
            env::remove_var("QUARRY_LOG_LEVEL");
            env::remove_var("QUARRY_LOG_FORMAT");
        }
    }
}
