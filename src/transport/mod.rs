//! HTTP transport
//!
//! The store talks to the network only through [`Transport`]: one request in,
//! one status and body out, or a [`TransportError`]. [`HyperTransport`] is the
//! production implementation; tests substitute their own.

use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};

use crate::error::{Error, Result, TransportError};

mod http_client;
mod tls;

pub use http_client::HyperTransport;

/// A single outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute target URL
    pub url: String,
    /// Request body, if any
    pub body: Option<Bytes>,
    /// Content type of the body
    pub content_type: Option<&'static str>,
    /// Deadline for the whole exchange, body included
    pub timeout: Duration,
}

impl HttpRequest {
    /// A body-less GET.
    pub fn get(url: String, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
            content_type: None,
            timeout,
        }
    }

    /// A POST carrying `body` of type `content_type`.
    pub fn post(url: String, body: Bytes, content_type: &'static str, timeout: Duration) -> Self {
        Self {
            method: Method::POST,
            url,
            body: Some(body),
            content_type: Some(content_type),
            timeout,
        }
    }
}

/// Status and fully read body of a response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body
    pub body: Bytes,
}

/// Performs HTTP exchanges.
///
/// Implementations are stateless from the caller's point of view: no retries,
/// and each call completes exactly once with a response or an error. A
/// timeout is reported as [`TransportError::Timeout`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and reads the whole response.
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

/// Drives `future` on the current Tokio runtime and hands its result to
/// `callback`.
///
/// The callback runs exactly once. Without a runtime it runs immediately with
/// a [`TransportError::Runtime`] error, and so it does if the runtime drops
/// the task before the future completes.
pub(crate) fn complete_with<R, Fut, F>(future: Fut, callback: F)
where
    R: Send + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
    F: FnOnce(Result<R>) + Send + 'static,
{
    let guard = CallbackGuard::new(callback);
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move { guard.complete(future.await) });
        }
        Err(e) => guard.complete(Err(Error::Transport(TransportError::Runtime(e.to_string())))),
    }
}

/// Owns a pending callback; dropping it unfired reports a runtime failure.
struct CallbackGuard<R, F>
where
    F: FnOnce(Result<R>),
{
    callback: Option<F>,
    _result: PhantomData<fn(R)>,
}

impl<R, F> CallbackGuard<R, F>
where
    F: FnOnce(Result<R>),
{
    fn new(callback: F) -> Self {
        Self {
            callback: Some(callback),
            _result: PhantomData,
        }
    }

    fn complete(mut self, result: Result<R>) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<R, F> Drop for CallbackGuard<R, F>
where
    F: FnOnce(Result<R>),
{
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(Err(Error::Transport(TransportError::Runtime(
                "runtime shut down before the request completed".to_string(),
            ))));
        }
    }
}
