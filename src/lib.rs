//! A client for the OpenKeyval key-value web service
//!
//! OpenKeyval is a dead-simple RESTful key-value store: values are read with
//! `GET {base}/{key}` and written with a form-encoded `POST {base}`. This
//! library wraps those two calls with key validation, a typed error surface
//! and a small trait for storing your own types.
//!
//! # Features
//! - Standard and TLS-secured endpoint presets, or any base URL
//! - Async, callback and blocking call styles
//! - Keys validated locally before any request is sent
//! - Distinct invalid-key, transport and server errors
//! - [`Serializable`] for storing domain types directly
//! - Secure endpoints verified against the webpki root certificates
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use openkeyval_client::Store;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), openkeyval_client::Error> {
//!     let store = Store::secure()?;
//!
//!     // Store a value
//!     store.set("my-key", b"Hello, World!").await?;
//!
//!     // Retrieve a value
//!     let value = store.get("my-key").await?;
//!     println!("Retrieved: {:?}", value);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod blocking;
pub mod config;
pub mod error;
pub mod key;
pub mod serializable;
pub mod store;
pub mod transport;
pub mod wire;

pub use config::{StoreConfig, SECURE_ENDPOINT, STANDARD_ENDPOINT};
pub use error::{Error, Result, TransportError};
pub use serializable::{Representation, Serializable};
pub use store::Store;
pub use transport::{HttpRequest, HttpResponse, HyperTransport, Transport};
