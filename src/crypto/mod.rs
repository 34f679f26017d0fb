//! Cryptographic primitives the metadata protocol is composed from.
//!
//! - **Hashing**: SHA-256
//! - **Message hash**: double SHA-256 over a length-prefixed network prefix
//!   followed by the length-prefixed message
//! - **Signing**: ed25519 over the message hash
//! - **Encryption**: ChaCha20-Poly1305 (see [`cipher`])

pub mod cipher;

pub use cipher::EncryptionKey;

use sha2::{Digest, Sha256};
use solana_keypair::Keypair;
use solana_signature::Signature;
use solana_signer::Signer;

use crate::network::Network;
use crate::shared::{Address, MagicHash};

/// SHA-256 of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Network-aware message hash.
///
/// `sha256(sha256(len(prefix) || prefix || len(message) || message))`, with
/// lengths in Bitcoin compact-size encoding.
pub fn magic_hash(network: Network, message: &[u8]) -> MagicHash {
    let prefix = network.message_prefix();
    let mut buf = Vec::with_capacity(prefix.len() + message.len() + 18);
    write_compact_size(&mut buf, prefix.len() as u64);
    buf.extend_from_slice(prefix);
    write_compact_size(&mut buf, message.len() as u64);
    buf.extend_from_slice(message);
    MagicHash::from_bytes(sha256(&sha256(&buf)))
}

/// Sign `message` under `network`'s domain prefix.
pub fn sign_message(keypair: &Keypair, network: Network, message: &[u8]) -> Signature {
    let hash = magic_hash(network, message);
    keypair.sign_message(hash.as_bytes())
}

/// Verify a signature over `message` against a base58 address.
///
/// Returns `false` for an unparseable address instead of erroring: a
/// signature that cannot be checked is a signature that does not verify.
pub fn verify_message(
    address: &Address,
    signature: &Signature,
    network: Network,
    message: &[u8],
) -> bool {
    let Ok(pubkey) = address.to_pubkey() else {
        return false;
    };
    let hash = magic_hash(network, message);
    signature.verify(pubkey.as_ref(), hash.as_bytes())
}

fn write_compact_size(buf: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => buf.push(n as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&n.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair(byte: u8) -> Keypair {
        Keypair::new_from_array([byte; 32])
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_compact_size_boundaries() {
        let mut buf = Vec::new();
        write_compact_size(&mut buf, 0xfc);
        assert_eq!(buf, vec![0xfc]);

        buf.clear();
        write_compact_size(&mut buf, 0xfd);
        assert_eq!(buf, vec![0xfd, 0xfd, 0x00]);

        buf.clear();
        write_compact_size(&mut buf, 0x1_0000);
        assert_eq!(buf, vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_magic_hash_depends_on_network() {
        let main = magic_hash(Network::Mainnet, b"hello");
        let test = magic_hash(Network::Testnet, b"hello");
        assert_ne!(main, test);
        assert_eq!(main, magic_hash(Network::Mainnet, b"hello"));
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = keypair(1);
        let address = Address::from_pubkey(&kp.pubkey());
        let sig = sign_message(&kp, Network::Mainnet, b"payload");

        assert!(verify_message(&address, &sig, Network::Mainnet, b"payload"));
        assert!(!verify_message(&address, &sig, Network::Mainnet, b"other"));
        assert!(!verify_message(&address, &sig, Network::Testnet, b"payload"));
    }

    #[test]
    fn test_verify_rejects_wrong_address() {
        let signer = keypair(1);
        let other = Address::from_pubkey(&keypair(2).pubkey());
        let sig = sign_message(&signer, Network::Mainnet, b"payload");
        assert!(!verify_message(&other, &sig, Network::Mainnet, b"payload"));
        assert!(!verify_message(
            &Address::new("garbage"),
            &sig,
            Network::Mainnet,
            b"payload"
        ));
    }
}
