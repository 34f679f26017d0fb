//! Records sub-client: opens metadata records for the client's wallet.

use std::sync::Arc;

use serde_json::Value;

use crate::client::MetadataClient;
use crate::domain::metadata::{read_public, Metadata};
use crate::error::Result;
use crate::http::MetadataHttp;
use crate::keys::MetadataKeys;
use crate::shared::Address;

/// Sub-client for metadata records.
pub struct Records<'a> {
    pub(crate) client: &'a MetadataClient,
}

impl<'a> Records<'a> {
    /// Plaintext record for `type_id`.
    pub fn open(&self, type_id: i64) -> Result<Metadata<MetadataHttp>> {
        self.open_with(type_id, false)
    }

    /// Encrypted record for `type_id`.
    pub fn open_private(&self, type_id: i64) -> Result<Metadata<MetadataHttp>> {
        self.open_with(type_id, true)
    }

    fn open_with(&self, type_id: i64, confidential: bool) -> Result<Metadata<MetadataHttp>> {
        let keys =
            MetadataKeys::from_metadata_node(&self.client.metadata_node, type_id, confidential)?;
        Ok(Metadata::new(
            keys,
            self.client.http.clone(),
            self.client.network,
        ))
    }

    /// Address a record for `type_id` would live at, without opening it.
    pub fn address_of(&self, type_id: i64) -> Result<Address> {
        Ok(MetadataKeys::from_metadata_node(&self.client.metadata_node, type_id, false)?.address())
    }

    /// Verified read of someone else's plaintext document.
    pub async fn read(&self, address: &Address) -> Result<Option<Arc<Value>>> {
        Ok(read_public(&self.client.http, self.client.network, address)
            .await?
            .map(Arc::new))
    }
}
