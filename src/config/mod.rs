//! Configuration management.

mod credentials;

pub use credentials::{default_credentials_path, read_api_key};

use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default registry host.
pub const DEFAULT_HOST: &str = "https://rubygems.org";

/// Environment variable overriding the registry host.
pub const HOST_ENV: &str = "RUBYGEMS_HOST";

/// Environment variable carrying the API key.
pub const API_KEY_ENV: &str = "GEM_HOST_API_KEY";

/// Environment variable overriding the request timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "GEMHOOK_TIMEOUT_MS";

/// Environment variable overriding the connect timeout in milliseconds.
pub const CONNECT_TIMEOUT_ENV: &str = "GEMHOOK_CONNECT_TIMEOUT_MS";

/// Environment variable overriding the HTTP proxy.
pub const HTTP_PROXY_ENV: &str = "GEMHOOK_HTTP_PROXY";

/// Main configuration for gemhook.
#[derive(Debug, Clone)]
pub struct GemhookConfig {
    /// Registry base URL, without the `/api/v1` suffix.
    pub host: String,
    /// API key set explicitly (flag, environment, or config file).
    pub api_key: Option<SecretString>,
    /// Credentials file consulted when no explicit key is set.
    pub credentials_path: Option<PathBuf>,
    /// HTTP transport settings.
    pub http: HttpSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// HTTP transport settings from the config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct HttpSettings {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: Option<u64>,
    /// Proxy URL for all registry requests.
    pub proxy: Option<String>,
    /// Whether proxy environment variables are honored.
    pub system_proxy: Option<bool>,
}

/// Logging settings from the config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// Filter directive, e.g. "info" or "gemhook=debug".
    pub level: Option<String>,
    /// Log file path (logs go to stderr when unset).
    pub file: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Registry host.
    pub host: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Credentials file path.
    pub credentials_path: Option<String>,
    /// HTTP settings.
    pub http: Option<HttpSettings>,
    /// Logging settings.
    pub logging: Option<LoggingSettings>,
}

impl Default for GemhookConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_key: None,
            credentials_path: None,
            http: HttpSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl GemhookConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/gemhook/` on macOS)
    /// 2. XDG config dir (`~/.config/gemhook/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("gemhook").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("gemhook")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `GemhookConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(host) = file.host {
            config.host = host;
        }
        config.api_key = file.api_key.map(SecretString::from);
        config.credentials_path = file.credentials_path.map(PathBuf::from);
        if let Some(http) = file.http {
            config.http = http;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        config
    }

    /// Applies process environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an environment lookup.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV).filter(|v| !v.trim().is_empty()) {
            self.host = host;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(SecretString::from(key));
        }
        if let Some(timeout_ms) = lookup(TIMEOUT_ENV).and_then(|v| v.trim().parse().ok()) {
            self.http.timeout_ms = Some(timeout_ms);
        }
        if let Some(connect_timeout_ms) =
            lookup(CONNECT_TIMEOUT_ENV).and_then(|v| v.trim().parse().ok())
        {
            self.http.connect_timeout_ms = Some(connect_timeout_ms);
        }
        if let Some(proxy) = lookup(HTTP_PROXY_ENV).filter(|v| !v.trim().is_empty()) {
            self.http.proxy = Some(proxy);
        }
        self
    }

    /// Sets the registry host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Sets the HTTP proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.http.proxy = Some(proxy.into());
        self
    }

    /// Sets the credentials file.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }

    /// Resolves the API key used for the `Authorization` header.
    ///
    /// An explicitly configured key wins; otherwise the credentials file is
    /// consulted for a key scoped to `host`, then for the default registry key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] if no key can be found, or
    /// [`Error::OperationFailed`] if the credentials file is unreadable.
    pub fn resolve_api_key(&self) -> Result<SecretString> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }

        let path = self
            .credentials_path
            .clone()
            .or_else(default_credentials_path);

        if let Some(path) = path {
            if let Some(key) = read_api_key(&path, &self.host)? {
                tracing::debug!(path = %path.display(), "Using API key from credentials file");
                return Ok(key);
            }
        }

        Err(Error::Unauthorized(format!(
            "no API key found for {}; pass --key, set {API_KEY_ENV}, or add one to ~/.gem/credentials",
            self.host
        )))
    }
}
