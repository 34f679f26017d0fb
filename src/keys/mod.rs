//! Deterministic key derivation for metadata records.
//!
//! Keys come from a SLIP-0010 ed25519 tree (hardened derivation only):
//!
//! ```text
//! master / purpose' / type_id' / 0'   → signing key (document address)
//! master / purpose' / type_id' / 1'   → sha256(private bytes) = encryption key
//! ```
//!
//! `purpose` is a process-wide constant derived from [`METADATA_NAMESPACE`].
//! Any two holders of the same seed converge on the same address and key for a
//! given type id.

use hmac::{Hmac, Mac};
use lazy_static::lazy_static;
use sha2::Sha512;
use solana_keypair::Keypair;
use solana_signer::Signer;

use crate::crypto::{sha256, EncryptionKey};
use crate::error::KeyError;
use crate::shared::Address;

type HmacSha512 = Hmac<Sha512>;

/// Namespace hashed into the purpose index.
pub const METADATA_NAMESPACE: &str = "info.blockchain.metadata";

/// Offset applied to every child index (hardened derivation).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

const SEED_KEY: &[u8] = b"ed25519 seed";

lazy_static! {
    /// Purpose index for metadata nodes, derived from [`METADATA_NAMESPACE`].
    pub static ref METADATA_PURPOSE: u32 = purpose_index(METADATA_NAMESPACE);
}

/// First four bytes of `sha256(namespace)`, big-endian, top bit cleared so the
/// result is a valid hardened-derivation index.
pub fn purpose_index(namespace: &str) -> u32 {
    let hash = sha256(namespace.as_bytes());
    u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]]) & 0x7FFF_FFFF
}

/// Convert a document type id into a derivation index.
pub fn type_index(type_id: i64) -> Result<u32, KeyError> {
    u32::try_from(type_id)
        .ok()
        .filter(|i| *i < HARDENED_OFFSET)
        .ok_or(KeyError::InvalidTypeId(type_id))
}

// ─── ExtendedKey ─────────────────────────────────────────────────────────────

/// A node in the ed25519 key tree: private key plus chain code.
#[derive(Clone)]
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
    depth: u8,
}

impl ExtendedKey {
    /// Master node from a 16..=64 byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        if !(16..=64).contains(&seed.len()) {
            return Err(KeyError::InvalidSeed(seed.len()));
        }
        let (key, chain_code) = hmac_sha512(SEED_KEY, &[seed]);
        Ok(Self {
            key,
            chain_code,
            depth: 0,
        })
    }

    /// Hardened child at `index` (the hardened bit is added here).
    pub fn derive_hardened(&self, index: u32) -> Result<Self, KeyError> {
        if index >= HARDENED_OFFSET {
            return Err(KeyError::InvalidIndex(index));
        }
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        let (key, chain_code) = hmac_sha512(&self.chain_code, &[&[0u8], &self.key, &hardened]);
        Ok(Self {
            key,
            chain_code,
            depth: self.depth.saturating_add(1),
        })
    }

    /// Derive along a path of (unhardened) indices, hardening each step.
    pub fn derive_path(&self, path: &[u32]) -> Result<Self, KeyError> {
        path.iter()
            .try_fold(self.clone(), |node, index| node.derive_hardened(*index))
    }

    pub fn private_key_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn keypair(&self) -> Keypair {
        Keypair::new_from_array(self.key)
    }

    pub fn address(&self) -> Address {
        Address::from_pubkey(&self.keypair().pubkey())
    }
}

// Never print key material.
impl std::fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("address", &self.address())
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> ([u8; 32], [u8; 32]) {
    // HMAC accepts keys of any length.
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC key of any length");
    for part in parts {
        mac.update(part);
    }
    let out = mac.finalize().into_bytes();
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&out[..32]);
    right.copy_from_slice(&out[32..]);
    (left, right)
}

// ─── Metadata keys ───────────────────────────────────────────────────────────

/// The `master / purpose'` node under which every document type lives.
pub fn derive_metadata_node(master: &ExtendedKey) -> Result<ExtendedKey, KeyError> {
    master.derive_hardened(*METADATA_PURPOSE)
}

/// Key material owned by one metadata record.
pub struct MetadataKeys {
    pub type_id: i64,
    pub signing_key: Keypair,
    pub encryption_key: Option<EncryptionKey>,
}

impl MetadataKeys {
    /// Derive keys for `type_id` from the metadata node (`master / purpose'`).
    ///
    /// The encryption key is only derived when `confidential` is set.
    pub fn from_metadata_node(
        node: &ExtendedKey,
        type_id: i64,
        confidential: bool,
    ) -> Result<Self, KeyError> {
        let type_node = node.derive_hardened(type_index(type_id)?)?;
        let signing_key = type_node.derive_hardened(0)?.keypair();
        let encryption_key = if confidential {
            let raw = type_node.derive_hardened(1)?;
            Some(EncryptionKey::from_bytes(sha256(raw.private_key_bytes())))
        } else {
            None
        };

        Ok(Self {
            type_id,
            signing_key,
            encryption_key,
        })
    }

    /// Derive keys for `type_id` straight from the master node.
    pub fn from_master(
        master: &ExtendedKey,
        type_id: i64,
        confidential: bool,
    ) -> Result<Self, KeyError> {
        Self::from_metadata_node(&derive_metadata_node(master)?, type_id, confidential)
    }

    pub fn address(&self) -> Address {
        Address::from_pubkey(&self.signing_key.pubkey())
    }
}

impl std::fmt::Debug for MetadataKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataKeys")
            .field("type_id", &self.type_id)
            .field("address", &self.address())
            .field("encrypted", &self.encryption_key.is_some())
            .finish_non_exhaustive()
    }
}
