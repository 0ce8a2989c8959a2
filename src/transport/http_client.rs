//! hyper-based transport

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use super::tls::build_tls_config;
use super::{HttpRequest, HttpResponse, Transport};
use crate::error::{Result, TransportError};

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// Transport backed by a pooled hyper client.
///
/// Plain `http://` and `https://` URLs are both accepted; HTTP/2 is used when
/// the server offers it through ALPN, HTTP/1.1 otherwise. Cloning is cheap and
/// clones share the connection pool.
#[derive(Clone, Debug)]
pub struct HyperTransport {
    http_client: HttpClient<HttpsConnector, Full<Bytes>>,
}

impl HyperTransport {
    /// Builds a transport that verifies certificates against the webpki roots.
    ///
    /// # Errors
    /// Returns `Error::Tls` if the TLS configuration cannot be built.
    pub fn new() -> Result<Self> {
        let tls_config = build_tls_config()?;

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();

        let http_client = HttpClient::builder(TokioExecutor::new()).build(https_connector);

        Ok(Self { http_client })
    }

    async fn exchange(&self, req: Request<Full<Bytes>>) -> std::result::Result<HttpResponse, TransportError> {
        let response = self
            .http_client
            .request(req)
            .await
            .map_err(|e| TransportError::Connection(Box::new(e)))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Body(Box::new(e)))?
            .to_bytes();

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let uri: Uri = request
            .url
            .parse()
            .map_err(|e| TransportError::InvalidRequest(format!("Invalid request URL: {}", e)))?;

        let mut builder = Request::builder().method(request.method.clone()).uri(uri);
        if let Some(content_type) = request.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let req = builder
            .body(Full::new(request.body.unwrap_or_default()))
            .map_err(|e| TransportError::InvalidRequest(format!("Failed to build request: {}", e)))?;

        debug!("Sending request: {} {}", request.method, request.url);

        let response = tokio::time::timeout(request.timeout, self.exchange(req))
            .await
            .map_err(|_| TransportError::Timeout(request.timeout))??;

        debug!(
            "Received {} ({} bytes) for {} {}",
            response.status,
            response.body.len(),
            request.method,
            request.url
        );

        Ok(response)
    }
}
