//! HTTP transport types and the reqwest-backed [`Transport`](crate::concepts::Transport).

use std::{fmt::Display, time::Duration};

use bon::Builder;
use http::{HeaderMap, StatusCode};

/// The outcome of a completed HTTP request, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// Response headers; empty when header capture is disabled.
    pub headers: HeaderMap,
    pub body: String,
}

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The overall or connect timeout elapsed.
    Timeout,
    /// The connection could not be established (DNS, refused, TLS).
    Connect,
    /// Too many redirects, or a redirect loop.
    Redirect,
    /// The response body could not be read.
    Body,
    /// The HTTP client or request could not be built.
    Builder,
    /// The request failed while being sent.
    Request,
    Other,
}

impl Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Redirect => "redirect",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Builder => "builder",
            TransportErrorKind::Request => "request",
            TransportErrorKind::Other => "other",
        };
        write!(f, "{name}")
    }
}

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        TransportError {
            kind,
            message: message.into(),
        }
    }
}

/// HTTP client settings.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// `User-Agent` header sent with every request.
    #[builder(into, default = default_user_agent())]
    pub user_agent: String,
    /// Overall request timeout.
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,
    /// Connection establishment timeout.
    #[builder(default = Duration::from_secs(10))]
    pub connect_timeout: Duration,
    #[builder(default = true)]
    pub follow_redirects: bool,
    /// Redirect limit when `follow_redirects` is set.
    #[builder(default = 10)]
    pub max_redirects: usize,
    /// Keep response headers in [`HttpResponse::headers`].
    #[builder(default = true)]
    pub capture_headers: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::builder().build()
    }
}

fn default_user_agent() -> String {
    format!("paypal-nvp/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(feature = "http-client")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "http-client")]
mod reqwest_transport {
    use url::Url;

    use super::{HttpResponse, TransportConfig, TransportError, TransportErrorKind};
    use crate::concepts::Transport;

    /// A [`Transport`] backed by a [`reqwest::Client`].
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        pub client: reqwest::Client,
        pub config: TransportConfig,
    }

    impl ReqwestTransport {
        pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
            let redirect = if config.follow_redirects {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            };

            let client = reqwest::Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(config.timeout)
                .connect_timeout(config.connect_timeout)
                .redirect(redirect)
                .build()?;

            Ok(ReqwestTransport { client, config })
        }
    }

    impl From<reqwest::Error> for TransportError {
        fn from(err: reqwest::Error) -> Self {
            let kind = if err.is_timeout() {
                TransportErrorKind::Timeout
            } else if err.is_connect() {
                TransportErrorKind::Connect
            } else if err.is_redirect() {
                TransportErrorKind::Redirect
            } else if err.is_body() || err.is_decode() {
                TransportErrorKind::Body
            } else if err.is_builder() {
                TransportErrorKind::Builder
            } else if err.is_request() {
                TransportErrorKind::Request
            } else {
                TransportErrorKind::Other
            };

            // The request URL carries the credentials, so it never reaches the message.
            let err = err.without_url();
            let mut message = err.to_string();
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }

            TransportError::new(kind, message)
        }
    }

    impl Transport for ReqwestTransport {
        async fn execute(&self, url: &Url) -> Result<HttpResponse, TransportError> {
            let response = self.client.get(url.clone()).send().await?;

            let status = response.status();
            let headers = if self.config.capture_headers {
                response.headers().clone()
            } else {
                Default::default()
            };
            let body = response.text().await?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
