//! Webhook CLI command.
//!
//! Runs one webhook action against the registry and renders the outcome:
//! - Add, remove, fire: print the response body verbatim
//! - List: print each group and its hook URLs
//!
//! A non-2xx response or an unparseable list ends the command as a failure
//! after the user has been shown why.

use crate::transport::RegistryTransport;
use crate::webhooks::{
    HookGroups, PARSE_PROBLEM_MESSAGE, WebhookAction, WebhookRequest, WebhookResponse,
    render_groups,
};
use crate::{Error, Result};
use secrecy::SecretString;
use std::io::Write;

/// Webhook command handler.
pub struct WebhookCommand<T> {
    transport: T,
    api_key: SecretString,
}

impl<T: RegistryTransport> WebhookCommand<T> {
    /// Creates a new webhook command.
    #[must_use]
    pub const fn new(transport: T, api_key: SecretString) -> Self {
        Self { transport, api_key }
    }

    /// Executes an action, writing all user-facing output to `out`.
    ///
    /// # Errors
    ///
    /// - [`Error::RequestFailed`] if the registry answers with a non-2xx status
    ///   (the body has been written to `out`)
    /// - [`Error::ParseFailed`] if a list body cannot be decoded (the
    ///   parse-problem message has been written to `out`)
    /// - [`Error::OperationFailed`] if the transport fails or `out` cannot be
    ///   written
    pub fn execute<W: Write>(&self, action: &WebhookAction, out: &mut W) -> Result<()> {
        if let Some(notice) = action.notice() {
            say(out, notice)?;
        }

        let request = WebhookRequest::for_action(action, self.api_key.clone());
        tracing::info!(
            action = action.as_str(),
            method = %request.method(),
            path = request.path(),
            all_gems = action.is_all_gems(),
            "Running webhook command"
        );

        let response = self.transport.send(&request)?;

        match action {
            WebhookAction::Add { .. } | WebhookAction::Remove { .. } | WebhookAction::Fire { .. } => {
                Self::render_mutation(&response, out)
            },
            WebhookAction::List => Self::render_list(&response, out),
        }
    }

    /// Renders the outcome of add, remove, or fire.
    fn render_mutation<W: Write>(response: &WebhookResponse, out: &mut W) -> Result<()> {
        say(out, &response.body)?;
        if response.is_success() {
            Ok(())
        } else {
            Self::request_failed(response)
        }
    }

    /// Renders the outcome of list.
    fn render_list<W: Write>(response: &WebhookResponse, out: &mut W) -> Result<()> {
        if !response.is_success() {
            say(out, &response.body)?;
            return Self::request_failed(response);
        }

        match HookGroups::parse(&response.body) {
            Ok(groups) => {
                tracing::debug!(
                    groups = groups.groups().len(),
                    hooks = groups.hook_count(),
                    "Listing webhooks"
                );
                for line in render_groups(&groups) {
                    say(out, &line)?;
                }
                Ok(())
            },
            Err(Error::ParseFailed { cause }) => {
                tracing::warn!(error = %cause, "Webhook list response was not valid");
                say(out, PARSE_PROBLEM_MESSAGE)?;
                say(out, &cause)?;
                Err(Error::ParseFailed { cause })
            },
            Err(other) => Err(other),
        }
    }

    fn request_failed(response: &WebhookResponse) -> Result<()> {
        tracing::warn!(status = response.status, "Registry rejected webhook request");
        Err(Error::RequestFailed {
            status: response.status,
        })
    }
}

/// Writes one line of user-facing output.
fn say<W: Write>(out: &mut W, line: &str) -> Result<()> {
    writeln!(out, "{line}").map_err(|e| Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Transport that records requests and replays a canned response.
    struct StubTransport {
        response: WebhookResponse,
        sent: RefCell<Vec<WebhookRequest>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                response: WebhookResponse::new(status, body),
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl RegistryTransport for StubTransport {
        fn send(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
            self.sent.borrow_mut().push(request.clone());
            Ok(self.response.clone())
        }
    }

    struct FailingTransport;

    impl RegistryTransport for FailingTransport {
        fn send(&self, _request: &WebhookRequest) -> Result<WebhookResponse> {
            Err(Error::OperationFailed {
                operation: "registry_request".to_string(),
                cause: "connect error: connection refused".to_string(),
            })
        }
    }

    fn key() -> SecretString {
        SecretString::from("key".to_string())
    }

    fn run<T: RegistryTransport>(transport: T, action: &WebhookAction) -> (Result<()>, String) {
        let command = WebhookCommand::new(transport, key());
        let mut out = Vec::new();
        let result = command.execute(action, &mut out);
        (result, String::from_utf8(out).expect("utf8"))
    }

    fn add() -> WebhookAction {
        WebhookAction::Add {
            gem_name: "rails".to_string(),
            url: "http://a.test/hook".to_string(),
        }
    }

    #[test]
    fn test_add_success_prints_notice_and_body() {
        let transport = StubTransport::new(201, "Successfully created webhook for rails");
        let (result, output) = run(&transport, &add());

        assert!(result.is_ok());
        assert_eq!(
            output,
            "Adding webhook...\nSuccessfully created webhook for rails\n"
        );
        assert_eq!(transport.sent.borrow().len(), 1);
    }

    #[test]
    fn test_fire_failure_prints_body_and_fails() {
        let transport = StubTransport::new(404, "gem not found");
        let action = WebhookAction::Fire {
            gem_name: "missing".to_string(),
            url: "http://a.test/hook".to_string(),
        };
        let (result, output) = run(&transport, &action);

        assert!(matches!(result, Err(Error::RequestFailed { status: 404 })));
        assert_eq!(output, "Test firing webhook...\ngem not found\n");
    }

    #[test]
    fn test_mutation_body_is_not_parsed() {
        let transport = StubTransport::new(200, "{not json");
        let (result, output) = run(&transport, &add());

        assert!(result.is_ok());
        assert!(output.ends_with("{not json\n"));
    }

    #[test]
    fn test_list_renders_groups() {
        let transport = StubTransport::new(200, r#"{"all":[{"url":"http://a.test/hook"}]}"#);
        let (result, output) = run(&transport, &WebhookAction::List);

        assert!(result.is_ok());
        assert_eq!(output, "all:\n- http://a.test/hook\n");
    }

    #[test]
    fn test_list_parse_failure() {
        let transport = StubTransport::new(200, "<html>oops</html>");
        let (result, output) = run(&transport, &WebhookAction::List);

        assert!(matches!(result, Err(Error::ParseFailed { .. })));
        assert!(output.starts_with("There was a problem parsing the data:\n"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_list_http_failure() {
        let transport = StubTransport::new(401, "Access Denied. Please sign up for an account");
        let (result, output) = run(&transport, &WebhookAction::List);

        assert!(matches!(result, Err(Error::RequestFailed { status: 401 })));
        assert_eq!(output, "Access Denied. Please sign up for an account\n");
    }

    #[test]
    fn test_transport_failure_propagates() {
        let (result, output) = run(FailingTransport, &add());

        let err = result.expect_err("should fail");
        assert!(!err.already_reported());
        assert_eq!(output, "Adding webhook...\n");
    }
}
