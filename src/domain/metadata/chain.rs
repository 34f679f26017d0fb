//! Chain authentication: linkage messages, magic hashes, sealing and
//! verifying envelopes.
//!
//! For a payload `p` and prior hash `h`:
//!
//! ```text
//! message(p, None)    = base64(p)
//! message(p, Some(h)) = base64(sha256(p) || h)
//! magic(p, h)         = magic_hash(network, message(p, h))
//! ```
//!
//! The signature covers `message`, and the record's next chain hash is
//! `magic`, always recomputed locally.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use solana_keypair::Keypair;
use solana_signature::Signature;

use crate::crypto::{magic_hash, sha256, sign_message, verify_message};
use crate::error::MetadataError;
use crate::network::Network;
use crate::shared::{Address, MagicHash};

use super::wire::MetadataEnvelope;

/// Message committed to by a write of `payload` on top of `prior`.
pub fn linkage_message(payload: &[u8], prior: Option<&MagicHash>) -> Vec<u8> {
    let encoded = match prior {
        None => STANDARD.encode(payload),
        Some(prior) => {
            let mut buf = Vec::with_capacity(64);
            buf.extend_from_slice(&sha256(payload));
            buf.extend_from_slice(prior.as_bytes());
            STANDARD.encode(buf)
        }
    };
    encoded.into_bytes()
}

/// Chain hash after a write of `payload` on top of `prior`.
pub fn linkage_hash(network: Network, payload: &[u8], prior: Option<&MagicHash>) -> MagicHash {
    magic_hash(network, &linkage_message(payload, prior))
}

/// Fold a sequence of payloads into the resulting chain hash.
pub fn fold_history<'a>(
    network: Network,
    payloads: impl IntoIterator<Item = &'a [u8]>,
) -> Option<MagicHash> {
    payloads.into_iter().fold(None, |prior, payload| {
        Some(linkage_hash(network, payload, prior.as_ref()))
    })
}

/// Sign `payload` on top of `prior` and build the wire envelope.
pub fn seal(
    signing_key: &Keypair,
    network: Network,
    version: u32,
    type_id: i64,
    payload: &[u8],
    prior: Option<&MagicHash>,
) -> MetadataEnvelope {
    let signature = sign_message(signing_key, network, &linkage_message(payload, prior));
    MetadataEnvelope {
        version,
        payload: STANDARD.encode(payload),
        signature: STANDARD.encode(signature.as_ref()),
        prev_magic_hash: prior.map(MagicHash::to_hex),
        type_id,
    }
}

/// A response whose signature checked out for `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayload {
    /// Raw (possibly encrypted) payload bytes.
    pub payload: Vec<u8>,
    /// Chain hash to adopt once the payload decodes.
    pub magic_hash: MagicHash,
}

/// Verify an envelope against `address`.
///
/// Any field that fails to parse is reported as a verification failure: such
/// data cannot be shown to come from the key holder.
pub fn verify(
    network: Network,
    address: &Address,
    envelope: &MetadataEnvelope,
) -> Result<VerifiedPayload, MetadataError> {
    let unverified = || MetadataError::SignatureVerification {
        address: address.to_string(),
    };

    let payload = STANDARD.decode(&envelope.payload).map_err(|_| unverified())?;
    let signature_bytes = STANDARD
        .decode(&envelope.signature)
        .map_err(|_| unverified())?;
    let signature = Signature::try_from(signature_bytes.as_slice()).map_err(|_| unverified())?;
    let prior = envelope
        .prev_magic_hash
        .as_deref()
        .map(MagicHash::from_hex)
        .transpose()
        .map_err(|_| unverified())?;

    let message = linkage_message(&payload, prior.as_ref());
    if !verify_message(address, &signature, network, &message) {
        return Err(unverified());
    }

    Ok(VerifiedPayload {
        magic_hash: magic_hash(network, &message),
        payload,
    })
}
