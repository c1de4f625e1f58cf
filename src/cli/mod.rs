//! CLI command implementations.
//!
//! This module provides the library side of the `gemhook` command line. The
//! binary parses arguments and hands a resolved action to a command here.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `webhook` | Add, remove, test-fire, or list registry webhooks |
//!
//! # Example Usage
//!
//! ```bash
//! # List all webhooks
//! gemhook webhook
//!
//! # Register a webhook for one gem
//! gemhook webhook rails --add https://ci.example.com/hooks/rails
//!
//! # Register a webhook for every gem you own
//! gemhook webhook '*' --add https://ci.example.com/hooks/all
//!
//! # Test-fire, then remove
//! gemhook webhook rails --fire https://ci.example.com/hooks/rails
//! gemhook webhook rails --remove https://ci.example.com/hooks/rails
//! ```

pub mod webhook;

pub use webhook::WebhookCommand;
