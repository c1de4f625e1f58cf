//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default filter when neither settings nor environment specify one.
const DEFAULT_FILTER: &str = "warn";

/// Filter used when `--verbose` is passed.
const VERBOSE_FILTER: &str = "gemhook=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, defaulting to pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive.
    pub directive: String,
    /// Log file (stderr when unset).
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    ///
    /// Precedence for the filter: `GEMHOOK_LOG`, then `--verbose`, then the
    /// config file `level`, then `warn`.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::from_settings_with(settings, verbose, |name| std::env::var(name).ok())
    }

    /// Same as [`LoggingConfig::from_settings`] with an explicit environment lookup.
    #[must_use]
    pub fn from_settings_with<F>(settings: Option<&LoggingSettings>, verbose: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let format = lookup("GEMHOOK_LOG_FORMAT")
            .or_else(|| settings.and_then(|s| s.format.clone()))
            .map(|f| LogFormat::parse(&f))
            .unwrap_or_default();

        let directive = lookup("GEMHOOK_LOG")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| verbose.then(|| VERBOSE_FILTER.to_string()))
            .or_else(|| settings.and_then(|s| s.level.clone()))
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let file = lookup("GEMHOOK_LOG_FILE")
            .or_else(|| settings.and_then(|s| s.file.clone()))
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            format,
            directive,
            file,
        }
    }

    /// Builds the subscriber filter, falling back to the default on a bad directive.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(format: &str, level: &str) -> LoggingSettings {
        LoggingSettings {
            format: Some(format.to_string()),
            level: Some(level.to_string()),
            file: None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_settings_with(None, false, |_| None);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.directive, "warn");
        assert!(config.file.is_none());
    }

    #[test]
    fn test_verbose_beats_settings() {
        let s = settings("json", "error");
        let config = LoggingConfig::from_settings_with(Some(&s), true, |_| None);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.directive, "gemhook=debug,info");
    }

    #[test]
    fn test_env_beats_everything() {
        let s = settings("json", "error");
        let config = LoggingConfig::from_settings_with(Some(&s), true, |name| match name {
            "GEMHOOK_LOG" => Some("trace".to_string()),
            "GEMHOOK_LOG_FORMAT" => Some("pretty".to_string()),
            "GEMHOOK_LOG_FILE" => Some("/tmp/gemhook.log".to_string()),
            _ => None,
        });
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.directive, "trace");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/gemhook.log")));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Pretty);
    }
}
