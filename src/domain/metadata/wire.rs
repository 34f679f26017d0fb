//! Wire types for metadata requests and responses (REST).

use serde::{Deserialize, Serialize};

/// Format version written by this client.
pub const METADATA_VERSION: u32 = 1;

/// `type_id` sent for records without a document category.
pub const UNSPECIFIED_TYPE_ID: i64 = -1;

/// Signed envelope: `PUT /metadata/{address}` body and `GET` response.
///
/// Fields are kept in their raw wire form; decoding happens during
/// verification so malformed fields count as unverifiable data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEnvelope {
    pub version: u32,
    /// Base64 of the encoded (possibly encrypted) document bytes.
    pub payload: String,
    /// Base64 of the signature over the linkage message.
    pub signature: String,
    /// Hex linkage hash prior to this write, `null` for the first write.
    #[serde(default)]
    pub prev_magic_hash: Option<String>,
    #[serde(default = "unspecified_type_id")]
    pub type_id: i64,
}

fn unspecified_type_id() -> i64 {
    UNSPECIFIED_TYPE_ID
}
