//! HTTP transport layer: `MetadataHttp`.

pub mod client;

pub use client::{MetadataHttp, DEFAULT_TIMEOUT};
