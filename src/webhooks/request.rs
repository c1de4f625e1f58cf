//! Request construction for the registry's webhook endpoints.

use super::action::WebhookAction;
use secrecy::SecretString;
use std::fmt;

/// Endpoint for registering, removing, and listing webhooks.
pub const WEB_HOOKS_PATH: &str = "web_hooks";

/// Endpoint for test-firing a webhook.
pub const FIRE_PATH: &str = "web_hooks/fire";

/// HTTP methods used by the webhook endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated request against the registry API.
///
/// `path` is relative to the API root (`<host>/api/v1/`). Form fields are
/// present for add, remove, and fire, and absent for list.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    method: HttpMethod,
    path: &'static str,
    form_fields: Vec<(&'static str, String)>,
    authorization: SecretString,
}

impl WebhookRequest {
    /// Builds the request for an action.
    #[must_use]
    pub fn for_action(action: &WebhookAction, api_key: SecretString) -> Self {
        let (method, path) = match action {
            WebhookAction::Add { .. } => (HttpMethod::Post, WEB_HOOKS_PATH),
            WebhookAction::Remove { .. } => (HttpMethod::Delete, WEB_HOOKS_PATH),
            WebhookAction::Fire { .. } => (HttpMethod::Post, FIRE_PATH),
            WebhookAction::List => (HttpMethod::Get, WEB_HOOKS_PATH),
        };

        let form_fields = action
            .target()
            .map(|(gem_name, url)| {
                vec![("gem_name", gem_name.to_string()), ("url", url.to_string())]
            })
            .unwrap_or_default();

        Self {
            method,
            path,
            form_fields,
            authorization: api_key,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Endpoint path relative to the API root.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Form-encoded body fields, in wire order.
    #[must_use]
    pub fn form_fields(&self) -> &[(&'static str, String)] {
        &self.form_fields
    }

    /// Returns the value of a form field.
    #[must_use]
    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.form_fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if the request carries a form body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.form_fields.is_empty()
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub const fn authorization(&self) -> &SecretString {
        &self.authorization
    }
}
