//! Logging setup with optional file rotation
//!
//! Output goes to stderr by default so that command output on stdout stays
//! machine readable. A daily-rotated log file and JSON formatting can be
//! enabled through [`LogConfig`].
//!
//! Filtering follows `RUST_LOG` when it is set, otherwise the configured
//! level. `--debug` ([`LogConfig::with_debug`]) adds a global debug directive
//! on top of `RUST_LOG`, so only more specific per-target directives in
//! `RUST_LOG` still apply.

use crate::config::LoggingConfig;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Default log file name when the configured path has none
const DEFAULT_LOG_FILE: &str = "site-compliance.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Default level when `RUST_LOG` gives no directive
    pub level: Level,

    /// Log to a daily-rotated file
    pub file_path: Option<PathBuf>,

    /// Log to stderr
    pub stderr: bool,

    /// Emit JSON lines instead of human readable text
    pub json: bool,

    /// Include thread IDs
    pub thread_ids: bool,

    /// Apply `level` even when `RUST_LOG` is set
    pub force_level: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_path: None,
            stderr: true,
            json: false,
            thread_ids: false,
            force_level: false,
        }
    }
}

fn parse_level(value: &str) -> Option<Level> {
    let value = value.to_lowercase();
    if value.contains("trace") {
        Some(Level::TRACE)
    } else if value.contains("debug") {
        Some(Level::DEBUG)
    } else if value.contains("info") {
        Some(Level::INFO)
    } else if value.contains("warn") {
        Some(Level::WARN)
    } else if value.contains("error") {
        Some(Level::ERROR)
    } else {
        None
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|value| !matches!(value.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
}

impl LogConfig {
    /// Create config from environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Start from file settings, then let the environment override them
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        let mut config = Self {
            level: parse_level(&settings.level).unwrap_or(Level::INFO),
            file_path: settings.file.clone(),
            stderr: settings.stderr,
            json: settings.json_format,
            thread_ids: settings.thread_ids,
            force_level: false,
        };
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Some(level) = std::env::var("RUST_LOG").ok().as_deref().and_then(parse_level) {
            self.level = level;
        }

        if let Ok(log_file) = std::env::var("SITE_COMPLIANCE_LOG_FILE") {
            self.file_path = Some(PathBuf::from(log_file));
        }

        if let Some(stderr) = env_flag("SITE_COMPLIANCE_LOG_STDERR") {
            self.stderr = stderr;
        }

        if let Some(json) = env_flag("SITE_COMPLIANCE_LOG_JSON") {
            self.json = json;
        }

        if let Some(thread_ids) = env_flag("SITE_COMPLIANCE_LOG_THREAD_IDS") {
            self.thread_ids = thread_ids;
        }
    }

    /// Force debug level, used by `--debug`; wins over a global `RUST_LOG` level
    pub fn with_debug(mut self, debug: bool) -> Self {
        if debug {
            self.level = Level::DEBUG;
            self.force_level = true;
        }
        self
    }

    /// Filter built from `RUST_LOG`, defaulting to `level`
    pub fn env_filter(&self) -> EnvFilter {
        let filter = EnvFilter::builder()
            .with_default_directive(self.level.into())
            .from_env_lossy();

        if self.force_level {
            filter.add_directive(self.level.into())
        } else {
            filter
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn output_layer<W>(writer: W, ansi: bool, config: &LogConfig) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids);

    if config.json {
        layer.json().boxed()
    } else {
        layer.with_ansi(ansi).boxed()
    }
}

/// Initialize logging with the given configuration
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = config.env_filter();

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.stderr {
        layers.push(output_layer(std::io::stderr, true, &config));
    }

    if let Some(file_path) = &config.file_path {
        let directory = match file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&directory)?;

        let file_name = file_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.into());

        let file_appender = tracing_appender::rolling::daily(directory, file_name);
        layers.push(output_layer(file_appender, false, &config));
    }

    let subscriber = tracing_subscriber::registry().with(layers).with(env_filter);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("site_compliance=trace"), Some(Level::TRACE));
        assert_eq!(parse_level("WARN"), Some(Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("RUST_LOG", Some("debug")),
                ("SITE_COMPLIANCE_LOG_FILE", Some("/tmp/site-compliance/run.log")),
                ("SITE_COMPLIANCE_LOG_STDERR", Some("false")),
                ("SITE_COMPLIANCE_LOG_JSON", Some("true")),
            ],
            || {
                let config = LogConfig::from_env();
                assert_eq!(config.level, Level::DEBUG);
                assert_eq!(
                    config.file_path,
                    Some(PathBuf::from("/tmp/site-compliance/run.log"))
                );
                assert!(!config.stderr);
                assert!(config.json);
            },
        );
    }

    #[test]
    #[serial]
    fn test_settings_are_overridden_by_env() {
        let settings = LoggingConfig {
            level: "warn".to_string(),
            json_format: true,
            file: None,
            stderr: true,
            thread_ids: true,
        };
        temp_env::with_vars(
            [
                ("RUST_LOG", None::<&str>),
                ("SITE_COMPLIANCE_LOG_FILE", None),
                ("SITE_COMPLIANCE_LOG_STDERR", None),
                ("SITE_COMPLIANCE_LOG_JSON", Some("off")),
                ("SITE_COMPLIANCE_LOG_THREAD_IDS", None),
            ],
            || {
                let config = LogConfig::from_settings(&settings).with_debug(false);
                assert_eq!(config.level, Level::WARN);
                assert!(!config.json);
                assert!(config.stderr);
                assert!(config.thread_ids);
                assert!(!config.force_level);
            },
        );
    }

    #[test]
    #[serial]
    fn test_thread_ids_from_env() {
        temp_env::with_var("SITE_COMPLIANCE_LOG_THREAD_IDS", Some("1"), || {
            assert!(LogConfig::from_env().thread_ids);
        });
        temp_env::with_var("SITE_COMPLIANCE_LOG_THREAD_IDS", None::<&str>, || {
            assert!(!LogConfig::from_env().thread_ids);
        });
    }

    #[test]
    #[serial]
    fn test_debug_flag_wins_over_rust_log() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let plain = LogConfig::from_env();
            assert_eq!(plain.env_filter().max_level_hint(), Some(LevelFilter::WARN));

            let debug = LogConfig::from_env().with_debug(true);
            assert_eq!(debug.env_filter().max_level_hint(), Some(LevelFilter::DEBUG));
        });
    }

    #[test]
    #[serial]
    fn test_level_is_default_without_rust_log() {
        temp_env::with_var("RUST_LOG", None::<&str>, || {
            let config = LogConfig {
                level: Level::ERROR,
                ..LogConfig::default()
            };
            assert_eq!(config.env_filter().max_level_hint(), Some(LevelFilter::ERROR));
        });
    }
}
