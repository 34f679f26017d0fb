//! Network constants: API URL and signed-message domain prefixes.

use serde::{Deserialize, Serialize};

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.blockchain.info";

/// Path segment under which metadata documents live.
pub const METADATA_PATH: &str = "metadata";

/// Signature domain. The prefix is mixed into every message hash, so a
/// signature produced for one network never verifies on the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// Domain-separation prefix hashed ahead of every signed message.
    pub fn message_prefix(&self) -> &'static [u8] {
        match self {
            Self::Mainnet => b"Wallet Metadata Signed Message:\n",
            Self::Testnet => b"Wallet Metadata Testnet Signed Message:\n",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
