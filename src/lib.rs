//! # Gemhook
//!
//! Manage package-registry webhooks from the command line.
//!
//! A webhook is a URL the registry POSTs a JSON payload to whenever a gem is
//! updated. Webhooks can be registered for a single gem or, with the `*`
//! wildcard, for every gem the caller owns.
//!
//! ## Features
//!
//! - Add, remove, and test-fire webhooks for a gem (or `*`)
//! - List every registered webhook grouped the way the registry groups them
//! - API key resolution from flags, environment, config file, or `~/.gem/credentials`
//! - Pluggable transport so the command can be driven without a network
//!
//! ## Example
//!
//! ```rust,ignore
//! use gemhook::cli::WebhookCommand;
//! use gemhook::transport::HttpTransport;
//! use gemhook::webhooks::{WebhookAction, WebhookOptions};
//!
//! let action = WebhookAction::resolve(WebhookOptions {
//!     gem_names: vec!["rails".to_string()],
//!     add: Some("https://ci.example.com/hook".to_string()),
//!     ..Default::default()
//! })?;
//! let command = WebhookCommand::new(HttpTransport::new(&config)?, api_key);
//! command.execute(&action, &mut std::io::stdout())?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod observability;
pub mod transport;
pub mod webhooks;

// Re-exports for convenience
pub use cli::WebhookCommand;
pub use config::GemhookConfig;
pub use transport::{HttpTransport, RegistryTransport};
pub use webhooks::{WebhookAction, WebhookOptions, WebhookRequest, WebhookResponse};

/// Error type for gemhook operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Conflicting action flags, missing or extra gem names, bad URLs |
/// | `OperationFailed` | Transport errors, config file I/O or parse errors, log setup |
/// | `Unauthorized` | No API key could be resolved |
/// | `RequestFailed` | The registry answered with a non-2xx status |
/// | `ParseFailed` | A successful list response was not hook-group shaped |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The registry cannot be reached (connect error, timeout)
    /// - A config or credentials file cannot be read or parsed
    /// - Logging cannot be initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// No usable API key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The registry rejected the request.
    ///
    /// The response body has already been shown to the user.
    #[error("registry returned HTTP {status}")]
    RequestFailed {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The webhook list could not be decoded.
    ///
    /// The parse-problem message has already been shown to the user.
    #[error("could not parse webhook list: {cause}")]
    ParseFailed {
        /// Decoder error description.
        cause: String,
    },
}

impl Error {
    /// Returns true when the command already printed the failure detail.
    ///
    /// The binary uses this to terminate without repeating the message.
    #[must_use]
    pub const fn already_reported(&self) -> bool {
        matches!(self, Self::RequestFailed { .. } | Self::ParseFailed { .. })
    }
}

/// Result type alias for gemhook operations.
pub type Result<T> = std::result::Result<T, Error>;
