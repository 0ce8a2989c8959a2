//! Synchronous store
//!
//! [`Store`] wraps the async [`crate::Store`] and blocks the calling thread
//! until each request completes or times out. It owns a single-threaded Tokio
//! runtime, so it must not be used from inside another async runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use crate::config::StoreConfig;
use crate::error::{Error, Result, TransportError};
use crate::serializable::Serializable;
use crate::transport::{HyperTransport, Transport};

/// Blocking client for an OpenKeyval endpoint
///
/// # Example
/// ```rust,no_run
/// use openkeyval_client::blocking::Store;
///
/// let store = Store::standard()?;
/// store.set_str("greeting", "hello")?;
/// assert_eq!(store.get_str("greeting")?.as_deref(), Some("hello"));
/// # Ok::<(), openkeyval_client::Error>(())
/// ```
pub struct Store<T = HyperTransport> {
    inner: crate::Store<T>,
    runtime: Arc<Runtime>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            runtime: Arc::clone(&self.runtime),
        }
    }
}

impl<T> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking::Store").field("inner", &self.inner).finish()
    }
}

impl Store<HyperTransport> {
    /// Store backed by `http://api.openkeyval.org`.
    pub fn standard() -> Result<Self> {
        Self::from_async(crate::Store::standard()?)
    }

    /// Store backed by `https://secure.openkeyval.org`.
    pub fn secure() -> Result<Self> {
        Self::from_async(crate::Store::secure()?)
    }

    /// Store backed by a custom endpoint.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_async(crate::Store::new(base_url)?)
    }

    /// Create a new store with custom configuration
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        Self::from_async(crate::Store::with_config(config)?)
    }
}

impl<T: Transport + 'static> Store<T> {
    /// Wraps an async store.
    pub fn from_async(inner: crate::Store<T>) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Transport(TransportError::Runtime(e.to_string())))?;

        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// The wrapped async store.
    pub fn as_async(&self) -> &crate::Store<T> {
        &self.inner
    }

    /// Root URL of the endpoint.
    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout()
    }

    /// Retrieve a value by key, blocking until it arrives.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.runtime.block_on(self.inner.get(key))
    }

    /// Retrieve a value and deserialize it into `S`.
    pub fn get_as<S: Serializable>(&self, key: &str) -> Result<Option<S>> {
        self.runtime.block_on(self.inner.get_as::<S>(key))
    }

    /// Retrieve a UTF-8 string value by key.
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.runtime.block_on(self.inner.get_str(key))
    }

    /// Store a value under a key.
    pub fn set(&self, key: &str, value: impl AsRef<[u8]>) -> Result<()> {
        self.runtime.block_on(self.inner.set(key, value))
    }

    /// Serialize `value` and store it under a key.
    pub fn set_value<S: Serializable>(&self, key: &str, value: &S) -> Result<()> {
        self.runtime.block_on(self.inner.set_value(key, value))
    }

    /// Store a string value under a key.
    pub fn set_str(&self, key: &str, value: &str) -> Result<()> {
        self.runtime.block_on(self.inner.set_str(key, value))
    }
}
