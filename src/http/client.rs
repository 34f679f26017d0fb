//! Low-level HTTP client: `MetadataHttp`.
//!
//! One method per endpoint, returning wire types. Status interpretation:
//! 2xx is parsed, GET 404 is "not stored yet", everything else is a
//! [`HttpError::ServerError`] carrying the response body.

use crate::domain::metadata::{MetadataEnvelope, MetadataTransport};
use crate::error::HttpError;
use crate::network::METADATA_PATH;
use crate::shared::Address;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Default per-request timeout (native only).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Low-level HTTP client for the metadata REST API.
#[derive(Debug, Clone)]
pub struct MetadataHttp {
    base_url: String,
    client: Client,
}

impl MetadataHttp {
    pub fn new(base_url: &str) -> Result<Self, HttpError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    #[cfg_attr(target_arch = "wasm32", allow(unused_variables, unused_mut))]
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(timeout).pool_max_idle_per_host(10);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn metadata_url(&self, address: &Address) -> String {
        format!("{}/{}/{}", self.base_url, METADATA_PATH, address)
    }

    // ── Metadata ─────────────────────────────────────────────────────────

    pub async fn get_metadata(
        &self,
        address: &Address,
    ) -> Result<Option<MetadataEnvelope>, HttpError> {
        let url = self.metadata_url(address);
        self.get_json(&url).await
    }

    pub async fn put_metadata(
        &self,
        address: &Address,
        envelope: &MetadataEnvelope,
    ) -> Result<(), HttpError> {
        let url = self.metadata_url(address);
        self.put_json(&url, envelope).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, HttpError> {
        let body = match self.do_request(Method::GET, url, None::<&()>).await {
            Ok(body) => body,
            Err(HttpError::ServerError { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| HttpError::InvalidResponse(e.to_string()))
    }

    async fn put_json<B: Serialize>(&self, url: &str, body: &B) -> Result<(), HttpError> {
        self.do_request(Method::PUT, url, Some(body)).await?;
        Ok(())
    }

    async fn do_request<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Vec<u8>, HttpError> {
        let mut req = self.client.request(method.clone(), url);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;
        let status = resp.status();
        tracing::debug!(%method, url, status = status.as_u16(), "metadata request");

        if status.is_success() {
            return Ok(resp.bytes().await?.to_vec());
        }

        let body_text = resp.text().await.unwrap_or_default();
        if status != StatusCode::NOT_FOUND {
            tracing::debug!(%method, url, status = status.as_u16(), body = %body_text, "metadata request rejected");
        }
        Err(HttpError::ServerError {
            status: status.as_u16(),
            body: body_text,
        })
    }
}

impl MetadataTransport for MetadataHttp {
    async fn get(&self, address: &Address) -> Result<Option<MetadataEnvelope>, HttpError> {
        self.get_metadata(address).await
    }

    async fn put(&self, address: &Address, envelope: &MetadataEnvelope) -> Result<(), HttpError> {
        self.put_metadata(address, envelope).await
    }
}
