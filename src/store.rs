//! OpenKeyval store client

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use tracing::debug;
use url::Url;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::key::validate_key;
use crate::serializable::{self, Serializable};
use crate::transport::{complete_with, HttpRequest, HttpResponse, HyperTransport, Transport};
use crate::wire::{form_body, item_url, FORM_CONTENT_TYPE};

/// Client for an OpenKeyval endpoint
///
/// A store is immutable once built and cheap to clone; clones share the
/// transport. Every call validates the key first and performs at most one
/// HTTP round trip. Nothing is cached.
///
/// # Example
/// ```rust,no_run
/// use openkeyval_client::Store;
///
/// #[tokio::main]
/// async fn main() -> Result<(), openkeyval_client::Error> {
///     let store = Store::standard()?;
///
///     store.set("greeting", b"hello").await?;
///     let value = store.get("greeting").await?;
///     assert_eq!(value.as_deref(), Some(&b"hello"[..]));
///
///     Ok(())
/// }
/// ```
pub struct Store<T = HyperTransport> {
    config: Arc<StoreConfig>,
    base_url: Url,
    timeout: Duration,
    transport: Arc<T>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Store<HyperTransport> {
    /// Store backed by `http://api.openkeyval.org`.
    pub fn standard() -> Result<Self> {
        Self::with_config(StoreConfig::standard())
    }

    /// Store backed by `https://secure.openkeyval.org`.
    pub fn secure() -> Result<Self> {
        Self::with_config(StoreConfig::secure())
    }

    /// Store backed by a custom endpoint.
    ///
    /// # Arguments
    /// * `base_url` - Root URL of the OpenKeyval endpoint (e.g. "http://localhost:8080")
    ///
    /// # Errors
    /// Returns `Error::InvalidUrl` if the URL is malformed or carries a query
    /// or fragment
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(StoreConfig::with_base_url(base_url))
    }

    /// Create a new store with custom configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Self::assemble(config, base_url, HyperTransport::new()?))
    }
}

impl<T: Transport + 'static> Store<T> {
    /// Create a store that sends its requests through `transport`.
    pub fn with_transport(config: StoreConfig, transport: T) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        Ok(Self::assemble(config, base_url, transport))
    }

    fn assemble(config: StoreConfig, base_url: Url, transport: T) -> Self {
        Self {
            timeout: config.timeout(),
            config: Arc::new(config),
            base_url,
            transport: Arc::new(transport),
        }
    }

    /// Root URL of the endpoint.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A copy of this store that uses another per-request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Configuration the store was built from.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Retrieve a value by key
    ///
    /// # Returns
    /// The value bytes, or None if the key has no value
    ///
    /// # Errors
    /// - `Error::InvalidKey` if the key is rejected (no request is sent)
    /// - `Error::Transport` if the exchange could not be completed
    /// - `Error::Server` if the service answered with an error status
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.fetch(key).await?.map(|(_, body)| body.to_vec()))
    }

    /// Retrieve a value and deserialize it into `S`
    ///
    /// A payload that cannot be decoded is reported as `Error::Server`
    /// carrying the response status and the raw body.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use openkeyval_client::Store;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), openkeyval_client::Error> {
    /// # let store = Store::standard()?;
    /// if let Some(note) = store.get_as::<String>("note").await? {
    ///     println!("Note: {}", note);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_as<S: Serializable>(&self, key: &str) -> Result<Option<S>> {
        let Some((status, body)) = self.fetch(key).await? else {
            return Ok(None);
        };

        match serializable::decode::<S>(body.to_vec()) {
            Ok(value) => Ok(Some(value)),
            Err(reason) => Err(Error::Server {
                status: status.as_u16(),
                body,
                reason: Some(reason),
            }),
        }
    }

    /// Retrieve a UTF-8 string value by key (convenience method)
    pub async fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get_as::<String>(key).await
    }

    /// Store a value under a key
    ///
    /// # Errors
    /// Same as [`get`](Self::get); a missing key is not a concern for writes,
    /// so a 404 is a server error here.
    pub async fn set(&self, key: &str, value: impl AsRef<[u8]>) -> Result<()> {
        validate_key(key)?;

        let request = HttpRequest::post(
            self.base_url.as_str().to_string(),
            form_body(key, value.as_ref()),
            FORM_CONTENT_TYPE,
            self.timeout,
        );
        let response = self.transport.send(request).await?;

        if response.status.is_success() {
            Ok(())
        } else {
            Err(server_error(response))
        }
    }

    /// Serialize `value` and store it under a key
    pub async fn set_value<S: Serializable>(&self, key: &str, value: &S) -> Result<()> {
        validate_key(key)?;
        self.set(key, serializable::encode(value)).await
    }

    /// Store a string value under a key (convenience method)
    pub async fn set_str(&self, key: &str, value: &str) -> Result<()> {
        self.set(key, value.as_bytes()).await
    }

    /// Like [`get`](Self::get), but delivers the result to `callback`.
    ///
    /// Returns immediately. The callback runs exactly once: inline if the key
    /// is invalid or no Tokio runtime is running, otherwise on a runtime
    /// worker once the exchange finishes. If the runtime shuts down first, it
    /// receives a `TransportError::Runtime` error while the runtime is dropped.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use openkeyval_client::Store;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), openkeyval_client::Error> {
    /// # let store = Store::standard()?;
    /// store.get_with_callback("greeting", |result| match result {
    ///     Ok(Some(value)) => println!("Got {} bytes", value.len()),
    ///     Ok(None) => println!("No value"),
    ///     Err(e) => eprintln!("Failed: {}", e),
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_with_callback<F>(&self, key: &str, callback: F)
    where
        F: FnOnce(Result<Option<Vec<u8>>>) + Send + 'static,
    {
        if let Err(e) = validate_key(key) {
            return callback(Err(e));
        }
        let store = self.clone();
        let key = key.to_string();
        complete_with(async move { store.get(&key).await }, callback);
    }

    /// Like [`get_as`](Self::get_as), but delivers the result to `callback`.
    pub fn get_as_with_callback<S, F>(&self, key: &str, callback: F)
    where
        S: Serializable + Send + 'static,
        F: FnOnce(Result<Option<S>>) + Send + 'static,
    {
        if let Err(e) = validate_key(key) {
            return callback(Err(e));
        }
        let store = self.clone();
        let key = key.to_string();
        complete_with(async move { store.get_as::<S>(&key).await }, callback);
    }

    /// Like [`set`](Self::set), but delivers the result to `callback`.
    pub fn set_with_callback<F>(&self, key: &str, value: impl Into<Vec<u8>>, callback: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        if let Err(e) = validate_key(key) {
            return callback(Err(e));
        }
        let store = self.clone();
        let key = key.to_string();
        let value = value.into();
        complete_with(async move { store.set(&key, value).await }, callback);
    }

    /// Like [`set_value`](Self::set_value), but delivers the result to `callback`.
    pub fn set_value_with_callback<S, F>(&self, key: &str, value: &S, callback: F)
    where
        S: Serializable,
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.set_with_callback(key, serializable::encode(value), callback)
    }

    /// GET a key and apply the absent-value rules.
    async fn fetch(&self, key: &str) -> Result<Option<(StatusCode, Bytes)>> {
        validate_key(key)?;

        let request = HttpRequest::get(item_url(self.base_url.as_str(), key), self.timeout);
        let response = self.transport.send(request).await?;

        if response.status == StatusCode::NOT_FOUND {
            debug!("Key {} not found", key);
            return Ok(None);
        }
        if !response.status.is_success() {
            return Err(server_error(response));
        }
        if self.is_missing_marker(&response.body) {
            debug!("Key {} has no value (status {})", key, response.status);
            return Ok(None);
        }

        Ok(Some((response.status, response.body)))
    }

    fn is_missing_marker(&self, body: &[u8]) -> bool {
        body.is_empty()
            || self
                .config
                .missing_sentinel
                .as_deref()
                .is_some_and(|sentinel| sentinel.as_bytes() == body)
    }
}

fn server_error(response: HttpResponse) -> Error {
    Error::Server {
        status: response.status.as_u16(),
        body: response.body,
        reason: None,
    }
}

/// Parse and check a base URL.
fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| Error::InvalidUrl(format!("Invalid base URL {:?}: {}", base_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl(format!(
            "Unsupported scheme {:?} in {:?}",
            url.scheme(),
            base_url
        )));
    }
    if url.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("Missing host in {:?}", base_url)));
    }
    // Keys are appended to the path
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::InvalidUrl(format!(
            "Query or fragment not allowed in base URL {:?}",
            base_url
        )));
    }

    Ok(url)
}
