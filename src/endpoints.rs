//! Fixed PayPal endpoints.
//!
//! NVP calls go to one of four URLs, picked by environment and by whether the credentials
//! authenticate with a certificate. IPN validation goes to one of two URLs picked by
//! environment alone.

use crate::config::Environment;

pub const NVP_SIGNATURE_LIVE: &str = "https://api-3t.paypal.com/nvp";
pub const NVP_SIGNATURE_SANDBOX: &str = "https://api-3t.sandbox.paypal.com/nvp";
pub const NVP_CERTIFICATE_LIVE: &str = "https://api.paypal.com/nvp";
pub const NVP_CERTIFICATE_SANDBOX: &str = "https://api.sandbox.paypal.com/nvp";

pub const IPN_LIVE: &str = "https://www.paypal.com/cgi-bin/webscr";
pub const IPN_SANDBOX: &str = "https://www.sandbox.paypal.com/cgi-bin/webscr";

/// The NVP endpoint for `environment`, in the certificate or signature family.
pub fn resolve_endpoint(environment: Environment, has_certificate: bool) -> &'static str {
    match (environment, has_certificate) {
        (Environment::Live, true) => NVP_CERTIFICATE_LIVE,
        (Environment::Live, false) => NVP_SIGNATURE_LIVE,
        (Environment::Sandbox, true) => NVP_CERTIFICATE_SANDBOX,
        (Environment::Sandbox, false) => NVP_SIGNATURE_SANDBOX,
    }
}

/// The IPN validation endpoint for `environment`.
pub fn resolve_ipn_endpoint(environment: Environment) -> &'static str {
    match environment {
        Environment::Live => IPN_LIVE,
        Environment::Sandbox => IPN_SANDBOX,
    }
}
