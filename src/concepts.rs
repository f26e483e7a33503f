//! Core traits used across the crate.

use url::Url;

use crate::{
    errors,
    nvp::NvpResponse,
    transport::{HttpResponse, TransportError},
    types::Fields,
};

/// Issues a single HTTP GET request.
///
/// Implementations report connection-level failures (DNS, refused connections, TLS, timeouts)
/// as [`TransportError`]. A non-2xx status is *not* an error; it is returned in
/// [`HttpResponse::status`] for the caller to inspect.
pub trait Transport {
    fn execute(&self, url: &Url) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

impl<T: Transport> Transport for &T {
    fn execute(&self, url: &Url) -> impl Future<Output = Result<HttpResponse, TransportError>> {
        (**self).execute(url)
    }
}

/// Anything able to perform a raw, authenticated NVP method call.
pub trait NvpApi {
    /// Send `method` with `params` and return the decoded response.
    ///
    /// Fails only when the request could not be completed; the `ACK` of the response is
    /// left for the caller to interpret.
    fn send(
        &self,
        method: &str,
        params: Fields,
    ) -> impl Future<Output = errors::Result<NvpResponse>>;
}
