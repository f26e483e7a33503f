//! Instant Payment Notification (IPN) validation.
//!
//! The fields PayPal posted to the IPN listener are echoed back, in order, with
//! `cmd=_notify-validate` in front. PayPal answers with a plain-text verdict.

use std::sync::{PoisonError, RwLock};

use http::{HeaderMap, StatusCode};
use url::Url;

use crate::{
    concepts::Transport,
    config::{Environment, IpnConfig},
    endpoints::resolve_ipn_endpoint,
    errors::Result,
    types::with_query,
};

/// Discriminator field prepended to every validation request.
pub const IPN_COMMAND: (&str, &str) = ("cmd", "_notify-validate");

/// The only verdict that validates a notification.
pub const VERIFIED: &str = "VERIFIED";

/// PayPal's answer to a validation request.
#[derive(Debug, Clone, PartialEq)]
pub struct IpnVerdict {
    /// The body with whitespace runs collapsed and trimmed, e.g. `VERIFIED` or `INVALID`.
    pub message: String,
    /// The body exactly as received.
    pub raw: String,
    pub verified: bool,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl IpnVerdict {
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

#[derive(Debug, Clone, Default)]
struct LastValidation {
    response: Option<String>,
    validated: bool,
    errors: Vec<String>,
}

/// Validates IPN notifications against PayPal. No credentials are involved.
#[derive(Debug)]
pub struct IpnValidator<T> {
    transport: T,
    environment: Environment,
    url: Option<Url>,
    last: RwLock<LastValidation>,
}

impl<T: Transport> IpnValidator<T> {
    pub fn new(transport: T, environment: Environment) -> Self {
        IpnValidator {
            transport,
            environment,
            url: None,
            last: RwLock::new(LastValidation::default()),
        }
    }

    pub fn from_config(transport: T, config: &IpnConfig, environment: Environment) -> Result<Self> {
        let mut validator = IpnValidator::new(transport, environment);
        validator.url = config.url()?;
        Ok(validator)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn set_url(&mut self, url: Option<Url>) {
        self.url = url;
    }

    pub fn endpoint(&self) -> Result<Url> {
        match &self.url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::parse(resolve_ipn_endpoint(self.environment))?),
        }
    }

    /// Ask PayPal whether the notification carrying `params` is genuine.
    ///
    /// Only transport faults fail; an `INVALID` (or any other) answer comes back as an
    /// unverified [`IpnVerdict`]. A `cmd` entry in `params` is replaced by the validation
    /// command.
    pub async fn validate<I, K, V>(&self, params: I) -> Result<IpnVerdict>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.record(LastValidation::default());

        let pairs = std::iter::once((IPN_COMMAND.0.to_string(), IPN_COMMAND.1.to_string())).chain(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(k, _)| {
                    let reserved = k == IPN_COMMAND.0;
                    #[cfg(feature = "tracing")]
                    if reserved {
                        tracing::warn!("Ignoring caller parameter '{k}'; it is set by the validator");
                    }
                    !reserved
                }),
        );
        let url = with_query(&self.endpoint()?, pairs);

        let response = match self.transport.execute(&url).await {
            Ok(response) => response,
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("IPN validation request failed: {err}");

                self.record(LastValidation {
                    errors: vec![err.message.clone()],
                    ..LastValidation::default()
                });
                return Err(err.into());
            }
        };

        let message = normalize(&response.body);
        let verified = message == VERIFIED;

        #[cfg(feature = "tracing")]
        tracing::debug!("IPN verdict: '{message}'");

        let mut errors = Vec::new();
        if !verified {
            errors.push(format!("IPN Validation Failed: {message}"));
        }
        self.record(LastValidation {
            response: Some(response.body.clone()),
            validated: verified,
            errors,
        });

        Ok(IpnVerdict {
            message,
            raw: response.body,
            verified,
            status: response.status,
            headers: response.headers,
        })
    }

    /// Raw body of the most recent validation response.
    pub fn last_response(&self) -> Option<String> {
        self.snapshot().response
    }

    /// Whether the most recent validation came back `VERIFIED`.
    pub fn validated(&self) -> bool {
        self.snapshot().validated
    }

    pub fn errors(&self) -> Vec<String> {
        self.snapshot().errors
    }

    fn snapshot(&self) -> LastValidation {
        self.last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, last: LastValidation) {
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = last;
    }
}

/// Collapse whitespace runs to single spaces and trim.
fn normalize(body: &str) -> String {
    body.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        endpoints::{IPN_LIVE, IPN_SANDBOX},
        errors::Error,
        transport::{TransportError, TransportErrorKind, mock::MockTransport},
    };

    fn notification() -> Vec<(&'static str, &'static str)> {
        vec![
            ("txn_id", "61E67681CH3238416"),
            ("payment_status", "Completed"),
            ("mc_gross", "19.95"),
        ]
    }

    #[tokio::test]
    async fn test_verified_with_surrounding_whitespace() {
        let validator =
            IpnValidator::new(MockTransport::replying(&["\r\n  VERIFIED\n\n"]), Environment::Live);

        let verdict = validator.validate(notification()).await.unwrap();

        assert!(verdict.is_verified());
        assert_eq!(verdict.message, "VERIFIED");
        assert_eq!(verdict.raw, "\r\n  VERIFIED\n\n");
        assert!(validator.validated());
        assert!(validator.errors().is_empty());
        assert_eq!(validator.last_response().as_deref(), Some("\r\n  VERIFIED\n\n"));
    }

    #[tokio::test]
    async fn test_invalid_is_not_an_error() {
        let validator = IpnValidator::new(MockTransport::replying(&["INVALID"]), Environment::Live);

        let verdict = validator.validate(notification()).await.unwrap();

        assert!(!verdict.is_verified());
        assert_eq!(verdict.message, "INVALID");
        assert!(!validator.validated());
        assert_eq!(
            validator.errors(),
            vec!["IPN Validation Failed: INVALID".to_string()]
        );
    }

    #[tokio::test]
    async fn test_error_page_is_normalized() {
        let validator = IpnValidator::new(
            MockTransport::replying(&["<html>\n  <body>Service\t Unavailable</body>\n</html>"]),
            Environment::Live,
        );

        let verdict = validator.validate(notification()).await.unwrap();

        assert_eq!(verdict.message, "<html> <body>Service Unavailable</body> </html>");
        assert!(!verdict.verified);
    }

    #[tokio::test]
    async fn test_verdict_resets_between_validations() {
        let validator = IpnValidator::new(
            MockTransport::replying(&["VERIFIED", "INVALID"]),
            Environment::Live,
        );

        validator.validate(notification()).await.unwrap();
        assert!(validator.validated());

        validator.validate(notification()).await.unwrap();
        assert!(!validator.validated());
        assert_eq!(validator.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_request_echoes_fields_in_order() {
        let validator =
            IpnValidator::new(MockTransport::replying(&["VERIFIED"]), Environment::Sandbox);

        let mut params = notification();
        params.push(("cmd", "_xclick"));
        validator.validate(params).await.unwrap();

        let sent = validator.transport().last_request();
        assert!(sent.as_str().starts_with(IPN_SANDBOX));
        let keys: Vec<(String, String)> = sent.query_pairs().into_owned().collect();
        assert_eq!(
            keys,
            vec![
                ("cmd".to_string(), "_notify-validate".to_string()),
                ("txn_id".to_string(), "61E67681CH3238416".to_string()),
                ("payment_status".to_string(), "Completed".to_string()),
                ("mc_gross".to_string(), "19.95".to_string()),
            ]
        );
    }

    #[cfg(feature = "tracing")]
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    #[cfg(feature = "tracing")]
    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[cfg(feature = "tracing")]
    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[cfg(feature = "tracing")]
    #[tokio::test]
    async fn test_caller_cmd_is_logged_when_dropped() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let validator = IpnValidator::new(MockTransport::replying(&["VERIFIED"]), Environment::Live);
        let mut params = notification();
        params.push(("cmd", "_xclick"));
        validator.validate(params).await.unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"));
        assert!(output.contains("Ignoring caller parameter 'cmd'"));
        assert!(!validator.transport().last_request().as_str().contains("_xclick"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let transport = MockTransport::default();
        transport.push(Err(TransportError::new(
            TransportErrorKind::Timeout,
            "Operation timed out after 30000 milliseconds",
        )));
        let validator = IpnValidator::new(transport, Environment::Live);

        let err = validator.validate(notification()).await.unwrap_err();

        assert!(matches!(err, Error::Transport(_)));
        assert!(!validator.validated());
        assert_eq!(
            validator.errors(),
            vec!["Operation timed out after 30000 milliseconds".to_string()]
        );
    }

    #[test]
    fn test_endpoint_selection() {
        let mut validator = IpnValidator::new(MockTransport::default(), Environment::Live);
        assert_eq!(validator.endpoint().unwrap().as_str(), IPN_LIVE);

        validator.set_environment(Environment::Sandbox);
        assert_eq!(validator.endpoint().unwrap().as_str(), IPN_SANDBOX);

        let config = IpnConfig {
            url: Some("https://ipn.example.com/validate".to_string()),
        };
        let validator =
            IpnValidator::from_config(MockTransport::default(), &config, Environment::Live).unwrap();
        assert_eq!(
            validator.endpoint().unwrap().as_str(),
            "https://ipn.example.com/validate"
        );
    }
}
