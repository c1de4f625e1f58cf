//! Registry transport trait and blocking HTTP implementation.
//!
//! The webhook command only talks to the [`RegistryTransport`] trait, so it
//! can be driven by an in-memory transport in tests. [`HttpTransport`] sends
//! real requests to `<host>/api/v1/<path>` with `reqwest`.
//!
//! # Error Handling
//!
//! - Connect errors, timeouts, and unreadable bodies: `Error::OperationFailed`
//! - Any HTTP status, 2xx or not: returned as a [`WebhookResponse`] for the
//!   caller to interpret
//!
//! No retries are attempted.

use crate::config::{GemhookConfig, HttpSettings};
use crate::webhooks::{HttpMethod, WebhookRequest, WebhookResponse};
use crate::{Error, Result};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use std::time::Duration;

/// API path prefix appended to the registry host.
pub const API_PREFIX: &str = "api/v1";

/// Trait for sending webhook requests to the registry.
pub trait RegistryTransport {
    /// Sends a request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained. A response with a
    /// non-2xx status is not an error at this layer.
    fn send(&self, request: &WebhookRequest) -> Result<WebhookResponse>;
}

impl<T: RegistryTransport + ?Sized> RegistryTransport for &T {
    fn send(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
        (**self).send(request)
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
    /// Whether `HTTP_PROXY`/`HTTPS_PROXY` from the environment are honored
    /// when no explicit proxy is set.
    pub system_proxy: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
            proxy: None,
            system_proxy: true,
        }
    }
}

impl HttpConfig {
    /// Loads HTTP configuration from config file settings.
    #[must_use]
    pub fn from_settings(settings: &HttpSettings) -> Self {
        let mut config = Self::default();
        if let Some(timeout_ms) = settings.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = settings.connect_timeout_ms {
            config.connect_timeout_ms = connect_timeout_ms;
        }
        config.proxy.clone_from(&settings.proxy);
        if let Some(system_proxy) = settings.system_proxy {
            config.system_proxy = system_proxy;
        }
        config
    }
}

/// Builds a blocking HTTP client with configured timeouts and proxy.
///
/// # Errors
///
/// Returns an error if the proxy URL is invalid or the client cannot be built.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::Client::builder()
        .user_agent(format!("gemhook/{}", env!("CARGO_PKG_VERSION")));
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }
    if let Some(proxy) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| Error::InvalidInput(format!("invalid HTTP proxy '{proxy}': {e}")))?;
        builder = builder.proxy(proxy);
    } else if !config.system_proxy {
        builder = builder.no_proxy();
    }

    builder.build().map_err(|e| Error::OperationFailed {
        operation: "build_http_client".to_string(),
        cause: e.to_string(),
    })
}

/// Joins the registry host, API prefix, and endpoint path.
#[must_use]
pub fn api_url(host: &str, path: &str) -> String {
    format!(
        "{}/{API_PREFIX}/{}",
        host.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Blocking HTTP transport using reqwest.
pub struct HttpTransport {
    /// Registry base URL.
    host: String,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport for the configured host and HTTP settings.
    ///
    /// Environment overrides are expected to be folded into `config` already
    /// (see [`GemhookConfig::with_env_overrides`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an absolute URL or the HTTP client
    /// cannot be built.
    pub fn new(config: &GemhookConfig) -> Result<Self> {
        let http = HttpConfig::from_settings(&config.http);
        Self::with_http_config(&config.host, &http)
    }

    /// Creates a transport with explicit HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not an absolute URL or the HTTP client
    /// cannot be built.
    pub fn with_http_config(host: &str, http: &HttpConfig) -> Result<Self> {
        let parsed = reqwest::Url::parse(host)
            .map_err(|e| Error::InvalidInput(format!("invalid registry host '{host}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "registry host must use http or https: {host}"
            )));
        }

        Ok(Self {
            host: host.to_string(),
            client: build_http_client(http)?,
        })
    }

    /// Registry base URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn authorization(request: &WebhookRequest) -> Result<HeaderValue> {
        let mut value =
            HeaderValue::from_str(request.authorization().expose_secret()).map_err(|_| {
                Error::InvalidInput("API key contains invalid header characters".to_string())
            })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl RegistryTransport for HttpTransport {
    fn send(&self, request: &WebhookRequest) -> Result<WebhookResponse> {
        let url = api_url(&self.host, request.path());
        tracing::debug!(method = %request.method(), url = %url, "Sending registry request");

        let mut builder = self
            .client
            .request(Self::method(request.method()), &url)
            .header(AUTHORIZATION, Self::authorization(request)?);
        if request.has_body() {
            builder = builder.form(request.form_fields());
        }

        let response = builder.send().map_err(|e| {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connect"
            } else if e.is_request() {
                "request"
            } else {
                "unknown"
            };
            tracing::error!(
                method = %request.method(),
                url = %url,
                error = %e,
                error_kind = error_kind,
                "Registry request failed"
            );
            Error::OperationFailed {
                operation: "registry_request".to_string(),
                cause: format!("{error_kind} error: {e}"),
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().map_err(|e| Error::OperationFailed {
            operation: "registry_request".to_string(),
            cause: format!("failed to read response body: {e}"),
        })?;

        tracing::debug!(status, bytes = body.len(), "Registry responded");
        Ok(WebhookResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhooks::WebhookAction;
    use secrecy::SecretString;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Raw request captured by the one-shot server.
    struct CapturedRequest {
        request_line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl CapturedRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        }
    }

    /// Serves exactly one request with the given status and body.
    fn serve_once(status: u16, body: &'static str) -> (String, mpsc::Receiver<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let host = format!("http://{}", listener.local_addr().expect("addr"));
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));

            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");

            let mut headers = Vec::new();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((key, value)) = line.split_once(':') {
                    headers.push((key.trim().to_string(), value.trim().to_string()));
                }
            }

            let length = headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.parse::<usize>().ok())
                .unwrap_or(0);
            let mut request_body = vec![0; length];
            reader.read_exact(&mut request_body).expect("body");

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status} Status\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .expect("respond");

            tx.send(CapturedRequest {
                request_line: request_line.trim_end().to_string(),
                headers,
                body: String::from_utf8(request_body).expect("utf8"),
            })
            .expect("send");
        });

        (host, rx)
    }

    fn key() -> SecretString {
        SecretString::from("rubygems_secret".to_string())
    }

    fn local_transport(host: &str) -> HttpTransport {
        let http = HttpConfig {
            timeout_ms: 5_000,
            system_proxy: false,
            ..HttpConfig::default()
        };
        HttpTransport::with_http_config(host, &http).expect("transport")
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            api_url("https://rubygems.org", "web_hooks"),
            "https://rubygems.org/api/v1/web_hooks"
        );
        assert_eq!(
            api_url("https://rubygems.org/", "/web_hooks/fire"),
            "https://rubygems.org/api/v1/web_hooks/fire"
        );
    }

    #[test]
    fn test_http_config_from_settings() {
        let settings = HttpSettings {
            timeout_ms: Some(1_000),
            connect_timeout_ms: None,
            proxy: Some("http://proxy.local:8080".to_string()),
            system_proxy: Some(false),
        };
        let config = HttpConfig::from_settings(&settings);

        assert_eq!(config.timeout_ms, 1_000);
        assert_eq!(config.connect_timeout_ms, 3_000);
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.local:8080"));
        assert!(!config.system_proxy);
    }

    #[test]
    fn test_rejects_invalid_host() {
        let err = HttpTransport::with_http_config("rubygems.org", &HttpConfig::default())
            .err()
            .expect("should fail");
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = HttpTransport::with_http_config("ftp://rubygems.org", &HttpConfig::default())
            .err()
            .expect("should fail");
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_rejects_invalid_proxy() {
        let http = HttpConfig {
            proxy: Some("http://[::1".to_string()),
            ..HttpConfig::default()
        };
        let err = HttpTransport::with_http_config("https://rubygems.org", &http)
            .err()
            .expect("should fail");
        assert!(err.to_string().contains("invalid HTTP proxy"));
    }

    #[test]
    fn test_add_sends_form_and_authorization() {
        let (host, rx) = serve_once(200, "Successfully created webhook for rails");
        let transport = local_transport(&host);
        let action = WebhookAction::Add {
            gem_name: "rails".to_string(),
            url: "http://a.test/hook".to_string(),
        };

        let response = transport
            .send(&WebhookRequest::for_action(&action, key()))
            .expect("send");
        let captured = rx.recv().expect("captured");

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "Successfully created webhook for rails");
        assert_eq!(captured.request_line, "POST /api/v1/web_hooks HTTP/1.1");
        assert_eq!(captured.header("authorization"), Some("rubygems_secret"));
        assert_eq!(
            captured.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(captured.body, "gem_name=rails&url=http%3A%2F%2Fa.test%2Fhook");
    }

    #[test]
    fn test_remove_sends_delete_with_form() {
        let (host, rx) = serve_once(200, "removed");
        let transport = local_transport(&host);
        let action = WebhookAction::Remove {
            gem_name: "*".to_string(),
            url: "https://hooks.test".to_string(),
        };

        transport
            .send(&WebhookRequest::for_action(&action, key()))
            .expect("send");
        let captured = rx.recv().expect("captured");

        assert_eq!(captured.request_line, "DELETE /api/v1/web_hooks HTTP/1.1");
        assert_eq!(captured.body, "gem_name=*&url=https%3A%2F%2Fhooks.test");
    }

    #[test]
    fn test_list_sends_get_without_body() {
        let (host, rx) = serve_once(200, "{}");
        let transport = local_transport(&host);

        let response = transport
            .send(&WebhookRequest::for_action(&WebhookAction::List, key()))
            .expect("send");
        let captured = rx.recv().expect("captured");

        assert_eq!(response.body, "{}");
        assert_eq!(captured.request_line, "GET /api/v1/web_hooks HTTP/1.1");
        assert!(captured.body.is_empty());
        assert!(captured.header("content-type").is_none());
        assert_eq!(captured.header("authorization"), Some("rubygems_secret"));
    }

    #[test]
    fn test_non_success_status_is_not_an_error() {
        let (host, _rx) = serve_once(404, "gem not found");
        let transport = local_transport(&host);
        let action = WebhookAction::Fire {
            gem_name: "nope".to_string(),
            url: "https://hooks.test".to_string(),
        };

        let response = transport
            .send(&WebhookRequest::for_action(&action, key()))
            .expect("send");

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "gem not found");
        assert!(!response.is_success());
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let host = format!("http://{}", listener.local_addr().expect("addr"));
        drop(listener);

        let transport = local_transport(&host);
        let err = transport
            .send(&WebhookRequest::for_action(&WebhookAction::List, key()))
            .expect_err("should fail");

        assert!(err.to_string().contains("registry_request"));
    }
}
