//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs`: Domain types and operations
//! - `wire.rs`: Raw serde structs matching server requests/responses
//! - `client.rs`: Sub-client bound to `MetadataClient`

pub mod metadata;
