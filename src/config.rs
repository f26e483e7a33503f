//! Credentials, environment selection and the serde configuration surface.
//!
//! [`NvpConfig`] and [`IpnConfig`] deserialize from the `{USER, PWD, SIGNATURE, CERTIFICATE,
//! VERSION, URL}` shape. An empty `VERSION` or `URL` falls back to the default.

use std::fmt;

use bon::Builder;
use serde::Deserialize;
use url::Url;

/// The NVP API version sent with every call unless configured otherwise.
pub const DEFAULT_API_VERSION: &str = "124.0";

/// Which PayPal environment requests are sent to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Live,
    Sandbox,
}

impl Environment {
    pub fn from_live(live: bool) -> Self {
        if live {
            Environment::Live
        } else {
            Environment::Sandbox
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Environment::Live)
    }
}

/// How an NVP request is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth<'a> {
    /// API signature, sent as `SIGNATURE`.
    Signature(&'a str),
    /// API certificate identifier, sent as `CERTIFICATE`.
    Certificate(&'a str),
}

/// API credentials for the NVP endpoints.
///
/// A signature and a certificate may both be set; the certificate wins.
#[derive(Builder, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// API user name, sent as `USER`.
    #[builder(into)]
    pub user: Option<String>,
    /// API password, sent as `PWD`.
    #[builder(into)]
    pub password: Option<String>,
    /// API signature, sent as `SIGNATURE`.
    #[builder(into)]
    pub signature: Option<String>,
    /// API certificate identifier, sent as `CERTIFICATE`.
    #[builder(into)]
    pub certificate: Option<String>,
}

impl Credentials {
    /// The authentication method requests will carry, if any.
    pub fn auth(&self) -> Option<Auth<'_>> {
        match (non_empty(&self.certificate), self.signature.as_deref()) {
            (Some(certificate), _) => Some(Auth::Certificate(certificate)),
            (None, Some(signature)) => Some(Auth::Signature(signature)),
            (None, None) => None,
        }
    }

    pub fn has_certificate(&self) -> bool {
        matches!(self.auth(), Some(Auth::Certificate(_)))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("signature", &redact(&self.signature))
            .field("certificate", &redact(&self.certificate))
            .finish()
    }
}

/// NVP client configuration, as found in `{USER, PWD, SIGNATURE, CERTIFICATE, VERSION, URL}`
/// style settings. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NvpConfig {
    #[serde(rename = "USER")]
    pub user: Option<String>,
    #[serde(rename = "PWD")]
    pub password: Option<String>,
    #[serde(rename = "SIGNATURE")]
    pub signature: Option<String>,
    #[serde(rename = "CERTIFICATE")]
    pub certificate: Option<String>,
    #[serde(rename = "VERSION")]
    pub version: Option<String>,
    /// Overrides endpoint selection when non-empty.
    #[serde(rename = "URL")]
    pub url: Option<String>,
}

impl NvpConfig {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
            signature: self.signature.clone(),
            certificate: self.certificate.clone(),
        }
    }

    pub fn version(&self) -> &str {
        non_empty(&self.version).unwrap_or(DEFAULT_API_VERSION)
    }

    /// The endpoint override, if one is configured.
    pub fn url(&self) -> Result<Option<Url>, url::ParseError> {
        non_empty(&self.url).map(Url::parse).transpose()
    }
}

/// IPN validator configuration. Only `URL` is recognized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IpnConfig {
    /// Overrides endpoint selection when non-empty.
    #[serde(rename = "URL")]
    pub url: Option<String>,
}

impl IpnConfig {
    pub fn url(&self) -> Result<Option<Url>, url::ParseError> {
        non_empty(&self.url).map(Url::parse).transpose()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
