//! Metadata domain: hash-chained, signed JSON documents.
//!
//! A [`Metadata`] record owns one document address. Writes are signed over a
//! linkage message that commits to the previous chain hash; reads are verified
//! before they are decoded. Every operation on a record goes through a FIFO
//! queue, so at most one network exchange per record is in flight and each
//! write is computed against the chain hash left by the one before it.

#[cfg(feature = "http")]
pub mod client;

pub mod chain;
pub mod codec;
pub(crate) mod queue;
pub mod transport;
pub mod wire;

pub use transport::MetadataTransport;
pub use wire::{MetadataEnvelope, METADATA_VERSION, UNSPECIFIED_TYPE_ID};

use std::future::Future;
use std::sync::Arc;

use async_lock::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use solana_keypair::Keypair;
use solana_signer::Signer;
use tokio::runtime::Handle;

use crate::crypto::EncryptionKey;
use crate::error::{MetadataError, Result};
use crate::keys::MetadataKeys;
use crate::network::Network;
use crate::shared::{Address, MagicHash};

use queue::SerialQueue;

/// Chain position and last known value. Replaced together, never partially.
#[derive(Debug, Clone, Default)]
struct ChainState {
    magic_hash: Option<MagicHash>,
    value: Option<Arc<Value>>,
}

struct Inner<T> {
    version: u32,
    type_id: Option<i64>,
    address: Address,
    network: Network,
    signing_key: Keypair,
    encryption_key: Option<EncryptionKey>,
    state: RwLock<ChainState>,
    queue: SerialQueue,
    transport: T,
}

/// A single metadata document.
///
/// Cheap to clone; clones share the same state and queue. Operations must be
/// started from within a Tokio runtime: each one runs on its own task, so an
/// operation that has started always runs to completion even if the caller
/// stops waiting for it.
pub struct Metadata<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Metadata<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: MetadataTransport> Metadata<T> {
    /// Record for derived keys.
    pub fn new(keys: MetadataKeys, transport: T, network: Network) -> Self {
        Self::from_parts(
            keys.signing_key,
            keys.encryption_key,
            Some(keys.type_id),
            transport,
            network,
        )
    }

    /// Record from raw key material. `type_id: None` is sent as
    /// [`UNSPECIFIED_TYPE_ID`].
    pub fn from_parts(
        signing_key: Keypair,
        encryption_key: Option<EncryptionKey>,
        type_id: Option<i64>,
        transport: T,
        network: Network,
    ) -> Self {
        let address = Address::from_pubkey(&signing_key.pubkey());
        Self {
            inner: Arc::new(Inner {
                version: METADATA_VERSION,
                type_id: type_id.filter(|id| *id >= 0),
                address,
                network,
                signing_key,
                encryption_key,
                state: RwLock::new(ChainState::default()),
                queue: SerialQueue::new(),
                transport,
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    pub fn type_id(&self) -> Option<i64> {
        self.inner.type_id
    }

    pub fn version(&self) -> u32 {
        self.inner.version
    }

    pub fn network(&self) -> Network {
        self.inner.network
    }

    pub fn is_encrypted(&self) -> bool {
        self.inner.encryption_key.is_some()
    }

    /// Last confirmed document snapshot.
    pub async fn value(&self) -> Option<Arc<Value>> {
        self.inner.state.read().await.value.clone()
    }

    /// Last confirmed snapshot deserialized into `D`.
    pub async fn value_as<D: DeserializeOwned>(&self) -> Result<Option<D>> {
        match self.value().await {
            Some(value) => Ok(Some(D::deserialize(&*value)?)),
            None => Ok(None),
        }
    }

    /// Last confirmed chain hash.
    pub async fn magic_hash(&self) -> Option<MagicHash> {
        self.inner.state.read().await.magic_hash
    }

    /// Whether a write or verified read has established the chain.
    pub async fn exists_on_server(&self) -> bool {
        self.inner.state.read().await.magic_hash.is_some()
    }

    // ── Operations ───────────────────────────────────────────────────────

    /// Sign and write `value`, unconditionally.
    ///
    /// Resolves to the stored snapshot. On failure the record is unchanged.
    pub fn create<V: Serialize + ?Sized>(
        &self,
        value: &V,
    ) -> impl Future<Output = Result<Arc<Value>>> + Send + 'static {
        let frozen = codec::freeze(value);
        self.schedule(move |inner| async move { inner.create(frozen?).await })
    }

    /// Write `value` only if it differs from the current snapshot.
    ///
    /// An unchanged value still takes its place in the queue but makes no
    /// network call and leaves the chain untouched.
    pub fn update<V: Serialize + ?Sized>(
        &self,
        value: &V,
    ) -> impl Future<Output = Result<Arc<Value>>> + Send + 'static {
        let frozen = codec::freeze(value);
        self.schedule(move |inner| async move { inner.update(frozen?).await })
    }

    /// Fetch, verify and decode the server copy.
    ///
    /// `Ok(None)` if nothing is stored at this address yet. Every failure is
    /// reported as [`MetadataError::FetchFailed`] with the cause as its source.
    pub fn fetch(&self) -> impl Future<Output = Result<Option<Arc<Value>>>> + Send + 'static {
        self.schedule(|inner| async move { inner.fetch().await })
    }

    /// [`fetch`](Self::fetch) and deserialize into `D`.
    pub async fn fetch_as<D: DeserializeOwned>(&self) -> Result<Option<D>> {
        match self.fetch().await? {
            Some(value) => Ok(Some(D::deserialize(&*value)?)),
            None => Ok(None),
        }
    }

    /// Take a queue position now and run `op` on a spawned task once every
    /// earlier operation on this record has finished.
    fn schedule<F, Fut, R>(&self, op: F) -> impl Future<Output = Result<R>> + Send + 'static
    where
        F: FnOnce(Arc<Inner<T>>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
        R: Send + 'static,
    {
        // No runtime means no queue position: the call fails on its own.
        let spawned = Handle::try_current().map(|runtime| {
            let ticket = self.inner.queue.enqueue();
            let inner = Arc::clone(&self.inner);
            runtime.spawn(async move {
                let _turn = ticket.wait().await;
                op(inner).await
            })
        });

        async move {
            match spawned {
                Ok(handle) => handle
                    .await
                    .map_err(|e| MetadataError::Task(e.to_string()))?,
                Err(e) => Err(MetadataError::Task(e.to_string())),
            }
        }
    }
}

impl<T: MetadataTransport> Inner<T> {
    fn wire_type_id(&self) -> i64 {
        self.type_id.unwrap_or(UNSPECIFIED_TYPE_ID)
    }

    async fn create(&self, value: Arc<Value>) -> Result<Arc<Value>> {
        let prior = self.state.read().await.magic_hash;
        let payload = codec::encode(&value, self.encryption_key.as_ref())?;
        let envelope = chain::seal(
            &self.signing_key,
            self.network,
            self.version,
            self.wire_type_id(),
            &payload,
            prior.as_ref(),
        );

        self.transport.put(&self.address, &envelope).await?;

        let magic_hash = chain::linkage_hash(self.network, &payload, prior.as_ref());
        *self.state.write().await = ChainState {
            magic_hash: Some(magic_hash),
            value: Some(Arc::clone(&value)),
        };
        tracing::debug!(
            address = %self.address,
            type_id = self.wire_type_id(),
            magic_hash = %magic_hash,
            "metadata written"
        );
        Ok(value)
    }

    async fn update(&self, value: Arc<Value>) -> Result<Arc<Value>> {
        let unchanged = match &self.state.read().await.value {
            Some(current) => **current == *value,
            None => value.is_null(),
        };
        if unchanged {
            tracing::trace!(address = %self.address, "metadata unchanged, skipping write");
            return Ok(value);
        }
        self.create(value).await
    }

    async fn fetch(&self) -> Result<Option<Arc<Value>>> {
        self.fetch_verified().await.map_err(|e| {
            tracing::warn!(address = %self.address, error = %e, "metadata fetch failed");
            MetadataError::FetchFailed(Box::new(e))
        })
    }

    async fn fetch_verified(&self) -> Result<Option<Arc<Value>>> {
        let Some(envelope) = self.transport.get(&self.address).await? else {
            tracing::debug!(address = %self.address, "no metadata stored yet");
            return Ok(None);
        };

        let verified = chain::verify(self.network, &self.address, &envelope)?;
        let value = Arc::new(codec::decode(
            &verified.payload,
            self.encryption_key.as_ref(),
        )?);

        *self.state.write().await = ChainState {
            magic_hash: Some(verified.magic_hash),
            value: Some(Arc::clone(&value)),
        };
        tracing::debug!(
            address = %self.address,
            magic_hash = %verified.magic_hash,
            "metadata fetched"
        );
        Ok(Some(value))
    }
}

/// Verified read of a plaintext document at any address, without keys or
/// chain state.
pub async fn read_public<T: MetadataTransport>(
    transport: &T,
    network: Network,
    address: &Address,
) -> Result<Option<Value>> {
    read_verified(transport, network, address).await.map_err(|e| {
        tracing::warn!(address = %address, error = %e, "public metadata read failed");
        MetadataError::FetchFailed(Box::new(e))
    })
}

async fn read_verified<T: MetadataTransport>(
    transport: &T,
    network: Network,
    address: &Address,
) -> Result<Option<Value>> {
    let Some(envelope) = transport.get(address).await? else {
        return Ok(None);
    };
    let verified = chain::verify(network, address, &envelope)?;
    Ok(Some(codec::decode(&verified.payload, None)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, HttpError};
    use crate::keys::ExtendedKey;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    // ─── In-memory store ─────────────────────────────────────────────────

    /// Models the server: enforces that each PUT extends the stored chain.
    #[derive(Default)]
    struct MemoryTransport {
        network: Network,
        state: Mutex<ServerState>,
        put_delay: Option<Duration>,
    }

    #[derive(Default)]
    struct ServerState {
        docs: HashMap<Address, MetadataEnvelope>,
        puts: Vec<MetadataEnvelope>,
        gets: usize,
        reject_puts: bool,
    }

    impl MemoryTransport {
        fn new() -> Self {
            Self::default()
        }

        fn with_put_delay(delay: Duration) -> Self {
            Self {
                put_delay: Some(delay),
                ..Self::default()
            }
        }

        fn puts(&self) -> Vec<MetadataEnvelope> {
            self.state.lock().unwrap().puts.clone()
        }

        fn gets(&self) -> usize {
            self.state.lock().unwrap().gets
        }

        fn reject_puts(&self, reject: bool) {
            self.state.lock().unwrap().reject_puts = reject;
        }

        fn tamper(&self, address: &Address, f: impl FnOnce(&mut MetadataEnvelope)) {
            let mut state = self.state.lock().unwrap();
            f(state.docs.get_mut(address).unwrap());
        }
    }

    impl MetadataTransport for MemoryTransport {
        async fn get(&self, address: &Address) -> std::result::Result<Option<MetadataEnvelope>, HttpError> {
            let mut state = self.state.lock().unwrap();
            state.gets += 1;
            Ok(state.docs.get(address).cloned())
        }

        async fn put(
            &self,
            address: &Address,
            envelope: &MetadataEnvelope,
        ) -> std::result::Result<(), HttpError> {
            if let Some(delay) = self.put_delay {
                tokio::time::sleep(delay).await;
            }
            let mut state = self.state.lock().unwrap();
            if state.reject_puts {
                return Err(HttpError::ServerError {
                    status: 400,
                    body: "METADATA_SIGNATURE_VERIFICATION_ERROR".to_string(),
                });
            }
            let expected_prior = state
                .docs
                .get(address)
                .map(|stored| chain::verify(self.network, address, stored).unwrap().magic_hash.to_hex());
            if envelope.prev_magic_hash != expected_prior {
                return Err(HttpError::ServerError {
                    status: 409,
                    body: "prev_magic_hash does not extend the stored chain".to_string(),
                });
            }
            chain::verify(self.network, address, envelope).map_err(|_| HttpError::ServerError {
                status: 400,
                body: "bad signature".to_string(),
            })?;
            state.puts.push(envelope.clone());
            state.docs.insert(address.clone(), envelope.clone());
            Ok(())
        }
    }

    fn master() -> ExtendedKey {
        ExtendedKey::from_seed(&[0x11; 32]).unwrap()
    }

    fn record(transport: Arc<MemoryTransport>, confidential: bool) -> Metadata<Arc<MemoryTransport>> {
        let keys = MetadataKeys::from_master(&master(), 2, confidential).unwrap();
        Metadata::new(keys, transport, Network::Mainnet)
    }

    fn payload_of(envelope: &MetadataEnvelope) -> Vec<u8> {
        STANDARD.decode(&envelope.payload).unwrap()
    }

    // ─── Tests ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_fetch_not_found_is_empty() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);

        assert!(md.fetch().await.unwrap().is_none());
        assert!(!md.exists_on_server().await);
        assert!(md.value().await.is_none());
        assert_eq!(transport.gets(), 1);
    }

    #[tokio::test]
    async fn test_create_establishes_chain() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);

        let stored = md.create(&json!({"a": 1})).await.unwrap();
        assert_eq!(*stored, json!({"a": 1}));
        assert!(md.exists_on_server().await);

        let puts = transport.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].prev_magic_hash, None);
        assert_eq!(puts[0].version, METADATA_VERSION);
        assert_eq!(puts[0].type_id, 2);
        assert_eq!(payload_of(&puts[0]), br#"{"a":1}"#);
        assert_eq!(
            md.magic_hash().await,
            Some(chain::linkage_hash(Network::Mainnet, br#"{"a":1}"#, None))
        );
    }

    #[tokio::test]
    async fn test_second_create_links_to_first() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);

        md.create(&json!({"a": 1})).await.unwrap();
        let first_hash = md.magic_hash().await.unwrap();
        md.create(&json!({"a": 2})).await.unwrap();

        let puts = transport.puts();
        assert_eq!(puts[1].prev_magic_hash, Some(first_hash.to_hex()));
    }

    #[tokio::test]
    async fn test_rejected_write_leaves_state_unchanged() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);

        md.create(&json!({"a": 1})).await.unwrap();
        let hash = md.magic_hash().await;

        transport.reject_puts(true);
        let err = md.create(&json!({"a": 2})).await.unwrap_err();
        assert!(matches!(
            err,
            MetadataError::Http(HttpError::ServerError { status: 400, .. })
        ));
        assert_eq!(*md.value().await.unwrap(), json!({"a": 1}));
        assert_eq!(md.magic_hash().await, hash);

        // A later retry extends the unchanged chain.
        transport.reject_puts(false);
        md.create(&json!({"a": 2})).await.unwrap();
        assert_eq!(transport.puts()[1].prev_magic_hash, hash.map(|h| h.to_hex()));
    }

    #[tokio::test]
    async fn test_update_unchanged_skips_write() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);

        md.create(&json!({"a": 1, "b": [1, 2]})).await.unwrap();
        let hash = md.magic_hash().await;

        let same = md.update(&json!({"b": [1, 2], "a": 1})).await.unwrap();
        assert_eq!(*same, json!({"a": 1, "b": [1, 2]}));
        assert_eq!(transport.puts().len(), 1);
        assert_eq!(md.magic_hash().await, hash);
    }

    #[tokio::test]
    async fn test_update_changed_writes_once() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);

        md.create(&json!({"a": 1})).await.unwrap();
        md.update(&json!({"a": 2})).await.unwrap();

        assert_eq!(transport.puts().len(), 2);
        assert_eq!(*md.value().await.unwrap(), json!({"a": 2}));
    }

    #[tokio::test]
    async fn test_update_null_on_fresh_record_is_noop() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);

        let value = md.update(&Value::Null).await.unwrap();
        assert!(value.is_null());
        assert!(transport.puts().is_empty());
        assert!(!md.exists_on_server().await);
    }

    #[tokio::test]
    async fn test_concurrent_creates_are_serialized() {
        let transport = Arc::new(MemoryTransport::with_put_delay(Duration::from_millis(20)));
        let md = record(transport.clone(), false);

        let first = md.create(&json!({"n": 1}));
        let second = md.create(&json!({"n": 2}));
        // Await in reverse order; execution order follows call order.
        let second = second.await.unwrap();
        let first = first.await.unwrap();
        assert_eq!(*first, json!({"n": 1}));
        assert_eq!(*second, json!({"n": 2}));

        let puts = transport.puts();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].prev_magic_hash, None);
        let first_hash = chain::linkage_hash(Network::Mainnet, &payload_of(&puts[0]), None);
        assert_eq!(puts[1].prev_magic_hash, Some(first_hash.to_hex()));
        assert_eq!(*md.value().await.unwrap(), json!({"n": 2}));
    }

    #[tokio::test]
    async fn test_chain_hash_folds_history() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), true);

        for n in 0..5 {
            md.create(&json!({ "n": n })).await.unwrap();
        }
        let payloads: Vec<Vec<u8>> = transport.puts().iter().map(payload_of).collect();
        let folded = chain::fold_history(Network::Mainnet, payloads.iter().map(Vec::as_slice));
        assert_eq!(md.magic_hash().await, folded);
    }

    #[tokio::test]
    async fn test_fetch_adopts_verified_state() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = record(transport.clone(), true);
        writer.create(&json!({"a": 1})).await.unwrap();
        writer.create(&json!({"a": 2})).await.unwrap();

        // Same seed on another device.
        let reader = record(transport.clone(), true);
        let fetched = reader.fetch().await.unwrap().unwrap();
        assert_eq!(*fetched, json!({"a": 2}));
        assert_eq!(reader.magic_hash().await, writer.magic_hash().await);

        // The reader can continue the chain.
        reader.create(&json!({"a": 3})).await.unwrap();
        assert_eq!(transport.puts().len(), 3);
    }

    #[tokio::test]
    async fn test_encrypted_payload_is_opaque() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), true);
        assert!(md.is_encrypted());

        md.create(&json!({"secret": "xyz"})).await.unwrap();
        let payload = payload_of(&transport.puts()[0]);
        assert!(serde_json::from_slice::<Value>(&payload).is_err());
    }

    #[tokio::test]
    async fn test_fetch_rejects_tampered_signature() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = record(transport.clone(), false);
        writer.create(&json!({"a": 1})).await.unwrap();

        let reader = record(transport.clone(), false);
        reader.fetch().await.unwrap();
        let before_value = reader.value().await;
        let before_hash = reader.magic_hash().await;
        assert!(before_hash.is_some());

        transport.tamper(writer.address(), |envelope| {
            envelope.payload = STANDARD.encode(br#"{"a":666}"#);
        });

        let err = reader.fetch().await.unwrap_err();
        assert!(matches!(err, MetadataError::FetchFailed(_)));
        assert!(err.is_signature_failure());
        assert_eq!(reader.value().await, before_value);
        assert_eq!(reader.magic_hash().await, before_hash);
    }

    #[tokio::test]
    async fn test_fetch_with_wrong_key_is_decode_failure() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = record(transport.clone(), true);
        writer.create(&json!({"a": 1})).await.unwrap();

        // Same signing key, different encryption key.
        let keys = MetadataKeys::from_master(&master(), 2, false).unwrap();
        let reader = Metadata::from_parts(
            keys.signing_key,
            Some(EncryptionKey::from_bytes([0u8; 32])),
            Some(2),
            transport.clone(),
            Network::Mainnet,
        );

        let err = reader.fetch().await.unwrap_err();
        assert!(matches!(
            err.cause(),
            MetadataError::Decode(DecodeError::Decrypt)
        ));
        assert!(!err.is_signature_failure());
        assert!(!reader.exists_on_server().await);
        assert!(reader.value().await.is_none());
    }

    #[tokio::test]
    async fn test_wrong_network_fails_verification() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = record(transport.clone(), false);
        writer.create(&json!({"a": 1})).await.unwrap();

        let keys = MetadataKeys::from_master(&master(), 2, false).unwrap();
        let reader = Metadata::new(keys, transport.clone(), Network::Testnet);
        assert!(reader.fetch().await.unwrap_err().is_signature_failure());
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_write() {
        let transport = Arc::new(MemoryTransport::with_put_delay(Duration::from_millis(20)));
        let md = record(transport.clone(), false);

        drop(md.create(&json!({"a": 1})));
        // Queued behind the dropped create, so it observes its result.
        let fetched = md.fetch().await.unwrap().unwrap();
        assert_eq!(*fetched, json!({"a": 1}));
        assert_eq!(transport.puts().len(), 1);
    }

    #[tokio::test]
    async fn test_typed_accessors() {
        #[derive(Debug, Serialize, Deserialize, PartialEq)]
        struct Prefs {
            currency: String,
            notifications: bool,
        }

        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), true);
        let prefs = Prefs {
            currency: "EUR".to_string(),
            notifications: true,
        };
        md.create(&prefs).await.unwrap();
        assert_eq!(md.value_as::<Prefs>().await.unwrap(), Some(prefs));

        let other = record(transport.clone(), true);
        let fetched: Option<Prefs> = other.fetch_as().await.unwrap();
        assert_eq!(fetched.unwrap().currency, "EUR");
    }

    #[tokio::test]
    async fn test_unspecified_type_id_on_wire() {
        let transport = Arc::new(MemoryTransport::new());
        let md = Metadata::from_parts(
            Keypair::new_from_array([8u8; 32]),
            None,
            None,
            transport.clone(),
            Network::Mainnet,
        );
        assert_eq!(md.type_id(), None);
        md.create(&json!([])).await.unwrap();
        assert_eq!(transport.puts()[0].type_id, UNSPECIFIED_TYPE_ID);
    }

    #[tokio::test]
    async fn test_read_public() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport.clone(), false);
        md.create(&json!({"shared": true})).await.unwrap();

        let value = read_public(&transport, Network::Mainnet, md.address())
            .await
            .unwrap();
        assert_eq!(value, Some(json!({"shared": true})));

        let missing = Address::from_pubkey(&Keypair::new_from_array([9u8; 32]).pubkey());
        assert!(read_public(&transport, Network::Mainnet, &missing)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_call_without_runtime_keeps_queue_order() {
        let transport = Arc::new(MemoryTransport::with_put_delay(Duration::from_millis(100)));
        let md = record(transport.clone(), false);

        let first = md.create(&json!({"n": 1}));

        // A clone used from a thread with no runtime fails without touching
        // the queue.
        let stray = md.clone();
        let err = std::thread::spawn(move || {
            let fut = stray.create(&json!({"n": 2}));
            tokio_test::block_on(fut)
        })
        .join()
        .unwrap()
        .unwrap_err();
        assert!(matches!(err, MetadataError::Task(_)));

        let third = md.create(&json!({"n": 3})).await.unwrap();
        assert_eq!(*third, json!({"n": 3}));
        assert_eq!(*first.await.unwrap(), json!({"n": 1}));

        let puts = transport.puts();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].prev_magic_hash, None);
        let first_hash = chain::linkage_hash(Network::Mainnet, &payload_of(&puts[0]), None);
        assert_eq!(puts[1].prev_magic_hash, Some(first_hash.to_hex()));
    }

    #[test]
    fn test_operation_outside_runtime_fails_cleanly() {
        let transport = Arc::new(MemoryTransport::new());
        let md = record(transport, false);
        let fut = md.create(&json!({"a": 1}));
        let err = tokio_test::block_on(fut).unwrap_err();
        assert!(matches!(err, MetadataError::Task(_)));
    }
}
