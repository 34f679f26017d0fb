//! High-level client: `MetadataClient` with nested sub-client accessors.
//!
//! The client owns the HTTP transport and the wallet's metadata node
//! (`master / purpose'`); records opened through it share the transport but
//! nothing else.

use crate::domain::metadata::client::Records;
use crate::error::{MetadataError, Result};
use crate::http::{MetadataHttp, DEFAULT_TIMEOUT};
use crate::keys::{derive_metadata_node, ExtendedKey};
use crate::network::Network;

use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::metadata::client::Records as RecordsClient;

/// The primary entry point.
///
/// ```rust,ignore
/// let client = MetadataClient::builder().seed(&seed).build()?;
/// let prefs = client.records().open_private(2)?;
/// prefs.fetch().await?;
/// prefs.update(&serde_json::json!({"currency": "EUR"})).await?;
/// ```
#[derive(Debug, Clone)]
pub struct MetadataClient {
    pub(crate) http: MetadataHttp,
    pub(crate) network: Network,
    pub(crate) metadata_node: ExtendedKey,
}

impl MetadataClient {
    pub fn builder() -> MetadataClientBuilder {
        MetadataClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn records(&self) -> Records<'_> {
        Records { client: self }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MetadataClientBuilder {
    base_url: String,
    network: Network,
    timeout: Duration,
    master_key: Option<Result<ExtendedKey>>,
}

impl Default for MetadataClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            network: Network::default(),
            timeout: DEFAULT_TIMEOUT,
            master_key: None,
        }
    }
}

impl MetadataClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wallet seed (16..=64 bytes). Validated in [`build`](Self::build).
    pub fn seed(mut self, seed: &[u8]) -> Self {
        self.master_key = Some(ExtendedKey::from_seed(seed).map_err(MetadataError::from));
        self
    }

    pub fn master_key(mut self, master: ExtendedKey) -> Self {
        self.master_key = Some(Ok(master));
        self
    }

    pub fn build(self) -> Result<MetadataClient> {
        let master = self
            .master_key
            .ok_or_else(|| MetadataError::Validation("a seed or master key is required".into()))??;

        Ok(MetadataClient {
            http: MetadataHttp::with_timeout(&self.base_url, self.timeout)?,
            network: self.network,
            metadata_node: derive_metadata_node(&master)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyError;
    use crate::keys::MetadataKeys;

    #[test]
    fn test_build_requires_key() {
        let err = MetadataClient::builder().build().unwrap_err();
        assert!(matches!(err, MetadataError::Validation(_)));
    }

    #[test]
    fn test_build_rejects_short_seed() {
        let err = MetadataClient::builder().seed(&[1u8; 8]).build().unwrap_err();
        assert!(matches!(err, MetadataError::Key(KeyError::InvalidSeed(8))));
    }

    #[test]
    fn test_defaults() {
        let client = MetadataClient::builder().seed(&[1u8; 32]).build().unwrap();
        assert_eq!(client.network(), Network::Mainnet);
        assert_eq!(client.base_url(), crate::network::DEFAULT_API_URL);
    }

    #[test]
    fn test_records_match_direct_derivation() {
        let seed = [3u8; 32];
        let client = MetadataClient::builder()
            .base_url("http://localhost:1")
            .seed(&seed)
            .build()
            .unwrap();

        let master = ExtendedKey::from_seed(&seed).unwrap();
        let direct = MetadataKeys::from_master(&master, 4, true).unwrap();

        let record = client.records().open_private(4).unwrap();
        assert_eq!(record.address(), &direct.address());
        assert_eq!(client.records().address_of(4).unwrap(), direct.address());
        assert!(record.is_encrypted());
        assert!(!client.records().open(4).unwrap().is_encrypted());
        assert_eq!(record.type_id(), Some(4));
    }

    #[test]
    fn test_negative_type_id_rejected() {
        let client = MetadataClient::builder().seed(&[3u8; 32]).build().unwrap();
        assert!(matches!(
            client.records().open(-1),
            Err(MetadataError::Key(KeyError::InvalidTypeId(-1)))
        ));
    }
}
