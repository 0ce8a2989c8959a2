//! Request shapes expected by OpenKeyval
//!
//! Reads are `GET {base}/{key}`; writes are `POST {base}` with a
//! form-urlencoded body carrying `key` and `value`.

use bytes::Bytes;
use url::form_urlencoded::byte_serialize;

use crate::key::encode_key;

/// Content type of the write body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// URL of a single item: the base URL joined with the encoded key.
pub fn item_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), encode_key(key))
}

/// Form body for a write.
///
/// The payload is encoded byte by byte, so binary values survive unchanged.
pub fn form_body(key: &str, payload: &[u8]) -> Bytes {
    let mut body = String::with_capacity(key.len() + payload.len() + 16);
    body.push_str("key=");
    body.extend(byte_serialize(key.as_bytes()));
    body.push_str("&value=");
    body.extend(byte_serialize(payload));
    Bytes::from(body)
}
