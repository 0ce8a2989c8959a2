//! Storing domain types
//!
//! A type becomes storable by implementing [`Serializable`]. It picks a
//! [`Representation`] (raw bytes, [`Bytes`] or UTF-8 [`String`]) and converts
//! itself to and from it. The store never looks inside the representation.
//!
//! ```
//! use openkeyval_client::Serializable;
//!
//! #[derive(Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! impl Serializable for Point {
//!     type Repr = String;
//!     type Error = std::num::ParseIntError;
//!
//!     fn serialize(&self) -> String {
//!         format!("{},{}", self.x, self.y)
//!     }
//!
//!     fn deserialize(repr: String) -> Result<Self, Self::Error> {
//!         let (x, y) = repr.split_once(',').unwrap_or((repr.as_str(), ""));
//!         Ok(Point { x: x.parse()?, y: y.parse()? })
//!     }
//! }
//!
//! let p = Point { x: 3, y: -4 };
//! assert_eq!(Point::deserialize(p.serialize()).unwrap(), p);
//! ```

use std::convert::Infallible;

use bytes::Bytes;

use crate::error::BoxError;

/// Transport-safe form of a stored value.
pub trait Representation: Sized {
    /// Payload bytes sent to the service.
    fn into_payload(self) -> Vec<u8>;

    /// Rebuilds the representation from the bytes the service returned.
    fn from_payload(payload: Vec<u8>) -> Result<Self, BoxError>;
}

impl Representation for Vec<u8> {
    fn into_payload(self) -> Vec<u8> {
        self
    }

    fn from_payload(payload: Vec<u8>) -> Result<Self, BoxError> {
        Ok(payload)
    }
}

impl Representation for Bytes {
    fn into_payload(self) -> Vec<u8> {
        self.to_vec()
    }

    fn from_payload(payload: Vec<u8>) -> Result<Self, BoxError> {
        Ok(Bytes::from(payload))
    }
}

impl Representation for String {
    fn into_payload(self) -> Vec<u8> {
        self.into_bytes()
    }

    fn from_payload(payload: Vec<u8>) -> Result<Self, BoxError> {
        Ok(String::from_utf8(payload)?)
    }
}

/// A type that can be stored and read back through a [`Store`](crate::Store).
///
/// Implementations must round-trip: `deserialize(serialize(v))` yields a value
/// equal to `v`.
pub trait Serializable: Sized {
    /// Representation the type converts to.
    type Repr: Representation;

    /// Error raised when a representation cannot be parsed.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Converts the value into its representation.
    fn serialize(&self) -> Self::Repr;

    /// Parses a representation, usually one produced by [`serialize`](Self::serialize).
    fn deserialize(repr: Self::Repr) -> Result<Self, Self::Error>;
}

impl Serializable for Vec<u8> {
    type Repr = Vec<u8>;
    type Error = Infallible;

    fn serialize(&self) -> Vec<u8> {
        self.clone()
    }

    fn deserialize(repr: Vec<u8>) -> Result<Self, Infallible> {
        Ok(repr)
    }
}

impl Serializable for String {
    type Repr = String;
    type Error = Infallible;

    fn serialize(&self) -> String {
        self.clone()
    }

    fn deserialize(repr: String) -> Result<Self, Infallible> {
        Ok(repr)
    }
}

/// Decodes a payload into `T`, reporting why it failed.
pub(crate) fn decode<T: Serializable>(payload: Vec<u8>) -> Result<T, String> {
    let repr = T::Repr::from_payload(payload).map_err(|e| {
        format!(
            "payload is not a valid {} representation: {}",
            std::any::type_name::<T::Repr>(),
            e
        )
    })?;
    T::deserialize(repr).map_err(|e| {
        format!(
            "payload could not be deserialized into {}: {}",
            std::any::type_name::<T>(),
            e
        )
    })
}

/// Encodes `value` into payload bytes.
pub(crate) fn encode<T: Serializable>(value: &T) -> Vec<u8> {
    value.serialize().into_payload()
}
