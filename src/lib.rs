//! # Wallet metadata
//!
//! Client for small JSON documents stored remotely under addresses derived
//! from a wallet's master key. Every write is signed and hash-chained to the
//! previous one, so the server can neither forge nor reorder history.
//!
//! ## Architecture
//!
//! 1. **Core**: Keys, crypto primitives, codec, chain authentication
//! 2. **Record**: `Metadata<T>`: create / update / fetch over any `MetadataTransport`
//! 3. **HTTP**: `MetadataHttp`, the reqwest-backed transport
//! 4. **High-Level Client**: `MetadataClient` with nested sub-clients
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wallet_metadata::prelude::*;
//!
//! let client = MetadataClient::builder()
//!     .base_url("https://api.blockchain.info")
//!     .seed(&seed)
//!     .build()?;
//!
//! let record = client.records().open_private(2)?;
//! record.fetch().await?;
//! record.update(&serde_json::json!({"currency": "EUR"})).await?;
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes: addresses and chain hashes.
pub mod shared;

/// Hashing, message signing, payload encryption.
pub mod crypto;

/// Deterministic key derivation for metadata records.
pub mod keys;

/// Error types.
pub mod error;

/// Network constants and signed-message domains.
pub mod network;

// ── Layer 2: Records ─────────────────────────────────────────────────────────

/// Domain modules: records, wire types, codec, chain.
pub mod domain;

// ── Layer 3: HTTP ────────────────────────────────────────────────────────────

/// HTTP transport.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `MetadataClient`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    pub use crate::shared::{Address, MagicHash};

    pub use crate::crypto::EncryptionKey;
    pub use crate::keys::{ExtendedKey, MetadataKeys, METADATA_PURPOSE};

    pub use crate::domain::metadata::{
        Metadata, MetadataEnvelope, MetadataTransport, METADATA_VERSION,
    };

    pub use crate::error::{DecodeError, HttpError, KeyError, MetadataError};

    pub use crate::network::{Network, DEFAULT_API_URL};

    #[cfg(feature = "http")]
    pub use crate::client::{MetadataClient, MetadataClientBuilder, RecordsClient};
    #[cfg(feature = "http")]
    pub use crate::http::MetadataHttp;
}
