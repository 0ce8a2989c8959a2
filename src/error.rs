//! Error types for the OpenKeyval client

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

/// Boxed error used to carry an underlying network failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the store.
///
/// `InvalidKey`, `Transport` and `Server` are the only outcomes of a get or
/// set call. `InvalidUrl` and `Tls` can only come out of construction.
#[derive(Error, Debug)]
pub enum Error {
    /// The key was rejected locally; no request was sent
    #[error("Invalid key {key:?}: {detail}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why it was rejected
        detail: String,
    },

    /// The HTTP exchange could not be completed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with an error status, or with a payload that
    /// could not be decoded into the requested type
    #[error("Server error (status {status}): {}", describe_server_error(.body, .reason))]
    Server {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: Bytes,
        /// Decoding failure, when the status itself was a success
        reason: Option<String>,
    },

    /// The endpoint URL is malformed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// TLS settings could not be applied
    #[error("TLS error: {0}")]
    Tls(String),
}

fn describe_server_error(body: &Bytes, reason: &Option<String>) -> String {
    match reason {
        Some(reason) => reason.clone(),
        None => String::from_utf8_lossy(body).into_owned(),
    }
}

impl Error {
    /// Returns true if the key was rejected before any I/O.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Error::InvalidKey { .. })
    }

    /// Returns true if the request never got a complete answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns true if the service rejected or mishandled the request.
    pub fn is_server(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// HTTP status of a server error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of the HTTP exchange itself
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// DNS, connect, TLS handshake or protocol failure
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(#[source] BoxError),

    /// The exchange did not finish in time
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// No Tokio runtime was available to drive the request
    #[error("Runtime unavailable: {0}")]
    Runtime(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
