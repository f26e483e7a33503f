//! Authenticated NVP API client.
//!
//! Every call injects the credential fields (`USER`, `PWD`, `SIGNATURE` or `CERTIFICATE`),
//! `VERSION` and `METHOD`, sends the request as a query string and decodes the
//! form-urlencoded answer into an [`NvpResponse`].

use std::{
    fmt::Display,
    sync::{PoisonError, RwLock},
};

use http::{HeaderMap, StatusCode};
use url::Url;

use crate::{
    concepts::{NvpApi, Transport},
    config::{Auth, Credentials, DEFAULT_API_VERSION, Environment, NvpConfig},
    endpoints::resolve_endpoint,
    errors::{Error, Result},
    transport::HttpResponse,
    types::{Fields, decode_fields, group_indexed, with_query},
};

/// Fields the client always sets itself. Caller parameters with these names are dropped.
pub const RESERVED_FIELDS: [&str; 6] = [
    "USER",
    "PWD",
    "VERSION",
    "SIGNATURE",
    "CERTIFICATE",
    "METHOD",
];

/// Acknowledgement status of an NVP response, from the `ACK` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ack {
    Success,
    SuccessWithWarning,
    Failure,
    FailureWithWarning,
    /// Any value PayPal is not documented to send.
    Other(String),
}

impl Ack {
    pub fn parse(value: &str) -> Self {
        match value {
            "Success" => Ack::Success,
            "SuccessWithWarning" => Ack::SuccessWithWarning,
            "Failure" => Ack::Failure,
            "FailureWithWarning" => Ack::FailureWithWarning,
            other => Ack::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Ack::Success | Ack::SuccessWithWarning)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Ack::Failure | Ack::FailureWithWarning)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Ack::Success => "Success",
            Ack::SuccessWithWarning => "SuccessWithWarning",
            Ack::Failure => "Failure",
            Ack::FailureWithWarning => "FailureWithWarning",
            Ack::Other(other) => other,
        }
    }
}

impl Display for Ack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the indexed error list (`L_SEVERITYCODEn`, `L_ERRORCODEn`,
/// `L_SHORTMESSAGEn`, `L_LONGMESSAGEn`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NvpError {
    pub index: u32,
    pub severity_code: Option<String>,
    pub error_code: Option<String>,
    pub short_message: Option<String>,
    pub long_message: Option<String>,
}

impl NvpError {
    /// Extract every error entry from a decoded response, ordered by index.
    ///
    /// An entry exists for each index that carries an `L_LONGMESSAGEn` field.
    pub fn from_fields(fields: &Fields) -> Vec<NvpError> {
        group_indexed(
            fields,
            &["L_SEVERITYCODE", "L_ERRORCODE", "L_SHORTMESSAGE", "L_LONGMESSAGE"],
        )
        .into_iter()
        .filter(|(_, group)| group.contains_key("L_LONGMESSAGE"))
        .map(|(index, group)| {
            let field = |prefix: &str| group.get(prefix).map(|v| v.to_string());
            NvpError {
                index,
                severity_code: field("L_SEVERITYCODE"),
                error_code: field("L_ERRORCODE"),
                short_message: field("L_SHORTMESSAGE"),
                long_message: field("L_LONGMESSAGE"),
            }
        })
        .collect()
    }
}

impl Display for NvpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [
            self.severity_code.clone(),
            self.error_code.clone(),
            self.short_message.as_ref().map(|m| format!("{m}.")),
            self.long_message.as_ref().map(|m| format!("{m}.")),
        ];
        let text = parts.into_iter().flatten().collect::<Vec<_>>().join(" ");
        write!(f, "{text}")
    }
}

/// A decoded NVP response.
#[derive(Debug, Clone, PartialEq)]
pub struct NvpResponse {
    /// All decoded fields, including `ACK` and the indexed lists.
    pub fields: Fields,
    /// The parsed `ACK`, absent when the response carried none.
    pub ack: Option<Ack>,
    /// Indexed error / warning entries, present regardless of the `ACK`.
    pub errors: Vec<NvpError>,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl NvpResponse {
    pub fn from_fields(fields: Fields) -> Self {
        let ack = fields.get("ACK").map(|ack| Ack::parse(ack));
        let errors = NvpError::from_fields(&fields);
        NvpResponse {
            fields,
            ack,
            errors,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    pub fn from_http(response: HttpResponse) -> Self {
        NvpResponse {
            status: response.status,
            headers: response.headers,
            ..NvpResponse::from_fields(decode_fields(&response.body))
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn ack(&self) -> Option<&Ack> {
        self.ack.as_ref()
    }

    /// Whether the `ACK` is `Success` or `SuccessWithWarning`.
    pub fn is_success(&self) -> bool {
        self.ack.as_ref().is_some_and(Ack::is_success)
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.get("CORRELATIONID")
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get("TIMESTAMP")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("VERSION")
    }

    pub fn build(&self) -> Option<&str> {
        self.get("BUILD")
    }

    /// Human readable error list: one line per indexed error, then a note for an
    /// unrecognized `ACK`.
    pub fn error_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        if let Some(Ack::Other(ack)) = &self.ack {
            messages.push(format!("Unknown ACK: {ack}"));
        }
        messages
    }
}

/// State of the most recent call made through an [`NvpClient`].
#[derive(Debug, Clone, Default)]
struct LastCall {
    response: Option<NvpResponse>,
    errors: Vec<String>,
}

/// Client for the PayPal NVP API.
///
/// The endpoint is resolved when a call is made, from the environment and credentials set at
/// that moment, unless an explicit URL was configured.
///
/// Calls take `&self` and return everything they produce. The client additionally keeps a
/// snapshot of the most recent call ([`last_response`](Self::last_response),
/// [`errors`](Self::errors)); with concurrent callers that snapshot belongs to whichever call
/// finished last.
#[derive(Debug)]
pub struct NvpClient<T> {
    transport: T,
    credentials: Credentials,
    environment: Environment,
    version: String,
    url: Option<Url>,
    last: RwLock<LastCall>,
}

impl<T: Transport> NvpClient<T> {
    pub fn new(transport: T, credentials: Credentials, environment: Environment) -> Self {
        NvpClient {
            transport,
            credentials,
            environment,
            version: DEFAULT_API_VERSION.to_string(),
            url: None,
            last: RwLock::new(LastCall::default()),
        }
    }

    /// Build a client from `{USER, PWD, SIGNATURE, CERTIFICATE, VERSION, URL}` settings.
    pub fn from_config(transport: T, config: &NvpConfig, environment: Environment) -> Result<Self> {
        let mut client = NvpClient::new(transport, config.credentials(), environment);
        client.version = config.version().to_string();
        client.url = config.url()?;
        Ok(client)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.credentials.user = Some(user.into());
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.password = Some(password.into());
    }

    pub fn set_signature(&mut self, signature: impl Into<String>) {
        self.credentials.signature = Some(signature.into());
    }

    pub fn set_certificate(&mut self, certificate: impl Into<String>) {
        self.credentials.certificate = Some(certificate.into());
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Pin the endpoint, or pass `None` to go back to automatic selection.
    pub fn set_url(&mut self, url: Option<Url>) {
        self.url = url;
    }

    /// The endpoint the next call will use.
    pub fn endpoint(&self) -> Result<Url> {
        match &self.url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(resolve_endpoint(
                self.environment,
                self.credentials.has_certificate(),
            ))?),
        }
    }

    /// The ordered request fields for `method`: credentials, `VERSION`, `METHOD`, then the
    /// caller's parameters minus any [`RESERVED_FIELDS`].
    pub fn request_fields(&self, method: &str, params: Fields) -> Vec<(String, String)> {
        let credentials = &self.credentials;
        let mut pairs = Vec::with_capacity(params.len() + 5);

        if let Some(user) = &credentials.user {
            pairs.push(("USER".to_string(), user.clone()));
        }
        if let Some(password) = &credentials.password {
            pairs.push(("PWD".to_string(), password.clone()));
        }
        pairs.push(("VERSION".to_string(), self.version.clone()));
        match credentials.auth() {
            Some(Auth::Certificate(certificate)) => {
                pairs.push(("CERTIFICATE".to_string(), certificate.to_string()))
            }
            Some(Auth::Signature(signature)) => {
                pairs.push(("SIGNATURE".to_string(), signature.to_string()))
            }
            None => {}
        }
        pairs.push(("METHOD".to_string(), method.to_string()));

        for (key, value) in params {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                #[cfg(feature = "tracing")]
                tracing::warn!("Ignoring caller parameter '{key}'; it is set by the client");
                continue;
            }
            pairs.push((key, value));
        }

        pairs
    }

    /// Send an NVP call without judging its `ACK`.
    ///
    /// Fails only with [`Error::Transport`] (or [`Error::UrlParse`] for a broken endpoint).
    pub async fn send(&self, method: &str, params: Fields) -> Result<NvpResponse> {
        self.record(LastCall::default());

        let endpoint = self.endpoint()?;
        let url = with_query(&endpoint, self.request_fields(method, params));

        #[cfg(feature = "tracing")]
        tracing::debug!("Sending NVP call: method='{method}', endpoint='{endpoint}'");

        let http_response = match self.transport.execute(&url).await {
            Ok(response) => response,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("NVP call failed: method='{method}', error='{err}'");

                self.record(LastCall {
                    response: None,
                    errors: vec![err.message.clone()],
                });
                return Err(err.into());
            }
        };

        let response = NvpResponse::from_http(http_response);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "NVP call answered: method='{method}', ack='{}', errors={}",
            response.ack().map(Ack::as_str).unwrap_or("<none>"),
            response.errors.len()
        );

        self.record(LastCall {
            errors: response.error_messages(),
            response: Some(response.clone()),
        });

        Ok(response)
    }

    /// Send an NVP call and fail with [`Error::Api`] unless the `ACK` is `Success` or
    /// `SuccessWithWarning`.
    pub async fn call(&self, method: &str, params: Fields) -> Result<NvpResponse> {
        let response = self.send(method, params).await?;

        if response.is_success() {
            return Ok(response);
        }

        let reason = if response.ack().is_some_and(Ack::is_failure) {
            "API failure."
        } else {
            "API failure, no ACK."
        };

        Err(Error::Api {
            reason: reason.to_string(),
            response: Box::new(response),
        })
    }

    /// The response of the most recent call, if it got one.
    pub fn last_response(&self) -> Option<NvpResponse> {
        self.snapshot().response
    }

    /// Whether the most recent call was acknowledged with `Success` or `SuccessWithWarning`.
    ///
    /// `false` before any call, after a transport failure, or when `ACK` was missing.
    pub fn last_was_successful(&self) -> bool {
        self.snapshot()
            .response
            .is_some_and(|response| response.is_success())
    }

    /// Errors collected during the most recent call.
    pub fn errors(&self) -> Vec<String> {
        self.snapshot().errors
    }

    fn snapshot(&self) -> LastCall {
        self.last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, last: LastCall) {
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = last;
    }
}

impl<T: Transport> NvpApi for NvpClient<T> {
    async fn send(&self, method: &str, params: Fields) -> Result<NvpResponse> {
        NvpClient::send(self, method, params).await
    }
}

impl<C: NvpApi> NvpApi for &C {
    async fn send(&self, method: &str, params: Fields) -> Result<NvpResponse> {
        (**self).send(method, params).await
    }
}
