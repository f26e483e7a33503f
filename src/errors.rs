use crate::{nvp::NvpResponse, transport::TransportError};

/// Error types for NVP, IPN and Button Manager operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP request could not be completed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// PayPal answered, but the `ACK` was a failure or could not be recognized.
    ///
    /// The decoded response is kept so callers can inspect the reported error list.
    #[error("{reason}")]
    Api {
        reason: String,
        response: Box<NvpResponse>,
    },

    /// A configured endpoint override is not a valid URL.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// The decoded response attached to an [`Error::Api`] failure.
    pub fn response(&self) -> Option<&NvpResponse> {
        match self {
            Error::Api { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
