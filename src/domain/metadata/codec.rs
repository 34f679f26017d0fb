//! Document codec: JSON value ↔ payload bytes, optionally encrypted.
//!
//! Values are normalized to [`serde_json::Value`]. Object maps are ordered by
//! key, so serialization is canonical with respect to key order.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::crypto::EncryptionKey;
use crate::error::DecodeError;

/// Serialize `value` to JSON bytes, encrypting them when a key is present.
pub fn encode(value: &Value, key: Option<&EncryptionKey>) -> Result<Vec<u8>, DecodeError> {
    let json = serde_json::to_vec(value).map_err(DecodeError::NotRepresentable)?;
    match key {
        Some(key) => key.encrypt(&json),
        None => Ok(json),
    }
}

/// Inverse of [`encode`].
pub fn decode(bytes: &[u8], key: Option<&EncryptionKey>) -> Result<Value, DecodeError> {
    let json = match key {
        Some(key) => key.decrypt(bytes)?,
        None => bytes.to_vec(),
    };
    serde_json::from_slice(&json).map_err(DecodeError::Json)
}

/// Immutable snapshot of any serializable value.
///
/// Fails for values with no JSON form (e.g. maps keyed by non-strings).
pub fn freeze<T: Serialize + ?Sized>(value: &T) -> Result<Arc<Value>, DecodeError> {
    serde_json::to_value(value)
        .map(Arc::new)
        .map_err(DecodeError::NotRepresentable)
}
