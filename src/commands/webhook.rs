//! Webhook CLI command handler.

use gemhook::config::GemhookConfig;
use gemhook::transport::HttpTransport;
use gemhook::{Result, WebhookAction, WebhookCommand};

use super::WebhookArgs;

/// Handles the webhook command.
///
/// The action is resolved before the API key so that usage errors surface
/// without touching the credentials file.
///
/// # Errors
///
/// Returns an error if the options are invalid, no API key is available, the
/// request cannot be sent, or the registry reports a failure.
pub fn cmd_webhook(args: WebhookArgs, config: &GemhookConfig) -> Result<()> {
    let action = WebhookAction::resolve(args.into())?;
    let api_key = config.resolve_api_key()?;
    let transport = HttpTransport::new(config)?;

    let command = WebhookCommand::new(transport, api_key);
    let stdout = std::io::stdout();
    command.execute(&action, &mut stdout.lock())
}
