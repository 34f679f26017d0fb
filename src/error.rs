//! Unified error types.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Top-level metadata error.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// The response signature does not prove authorship by the key holder for
    /// this chain position. Never retried.
    #[error("Signature verification failed for {address}")]
    SignatureVerification { address: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Key derivation error: {0}")]
    Key(#[from] KeyError),

    /// Uniform failure for the fetch pipeline. The underlying cause is kept as
    /// the error source.
    #[error("Metadata fetch failed")]
    FetchFailed(#[source] Box<MetadataError>),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation task failed: {0}")]
    Task(String),
}

impl MetadataError {
    /// Whether this error (or the cause of a `FetchFailed`) is a signature
    /// verification failure.
    pub fn is_signature_failure(&self) -> bool {
        match self {
            Self::SignatureVerification { .. } => true,
            Self::FetchFailed(inner) => inner.is_signature_failure(),
            _ => false,
        }
    }

    /// The innermost error for `FetchFailed`, or `self` otherwise.
    pub fn cause(&self) -> &MetadataError {
        match self {
            Self::FetchFailed(inner) => inner.cause(),
            other => other,
        }
    }
}

/// Transport-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Connection failed: {0}")]
    Connect(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Payload encoding / decoding errors.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Encryption failed")]
    Encrypt,

    #[error("Decryption failed (wrong key or tampered payload)")]
    Decrypt,

    #[error("Ciphertext truncated: {len} bytes")]
    Truncated { len: usize },

    #[error("Invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Value is not representable as JSON: {0}")]
    NotRepresentable(#[source] serde_json::Error),
}

/// Key derivation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Seed must be 16..=64 bytes, got {0}")]
    InvalidSeed(usize),

    #[error("Child index {0:#x} already has the hardened bit set")]
    InvalidIndex(u32),

    #[error("Type id {0} cannot be used as a derivation index")]
    InvalidTypeId(i64),
}
