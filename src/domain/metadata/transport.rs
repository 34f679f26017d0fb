//! Transport seam between a record and the metadata store.

use std::future::Future;
use std::sync::Arc;

use crate::error::HttpError;
use crate::shared::Address;

use super::wire::MetadataEnvelope;

/// GET/PUT exchange with the remote store.
///
/// Implementations map a "not found" response to `Ok(None)` and every other
/// failure to an [`HttpError`]. No retries are expected at this seam.
pub trait MetadataTransport: Send + Sync + 'static {
    fn get(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<MetadataEnvelope>, HttpError>> + Send;

    fn put(
        &self,
        address: &Address,
        envelope: &MetadataEnvelope,
    ) -> impl Future<Output = Result<(), HttpError>> + Send;
}

impl<T: MetadataTransport> MetadataTransport for Arc<T> {
    fn get(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Option<MetadataEnvelope>, HttpError>> + Send {
        (**self).get(address)
    }

    fn put(
        &self,
        address: &Address,
        envelope: &MetadataEnvelope,
    ) -> impl Future<Output = Result<(), HttpError>> + Send {
        (**self).put(address, envelope)
    }
}
