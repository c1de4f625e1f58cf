//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `webhook.rs`: Webhook add/remove/fire/list

mod webhook;

use clap::Args;
use gemhook::WebhookOptions;

// Re-export command functions
pub use webhook::cmd_webhook;

/// Arguments for the webhook command.
#[derive(Args, Debug)]
pub struct WebhookArgs {
    /// Name of gem to register webhook for. Use '*' for all gems. Or, omit
    /// to list all webhooks.
    #[arg(value_name = "GEM_NAME")]
    pub gem_names: Vec<String>,

    /// The URL of the webhook to add.
    #[arg(short, long, value_name = "URL")]
    pub add: Option<String>,

    /// The URL of the webhook to remove.
    #[arg(short, long, value_name = "URL")]
    pub remove: Option<String>,

    /// The URL of the webhook to test fire.
    #[arg(short, long, value_name = "URL")]
    pub fire: Option<String>,
}

impl From<WebhookArgs> for WebhookOptions {
    fn from(args: WebhookArgs) -> Self {
        Self {
            gem_names: args.gem_names,
            add: args.add,
            remove: args.remove,
            fire: args.fire,
        }
    }
}
