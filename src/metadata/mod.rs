//! Metadata service client.
//!
//! [`MetadataService`] abstracts the administrative API of the GraphQL
//! layer. [`HasuraClient`] implements it over HTTP.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::HasuraClient;
pub use error::{MetadataError, MetadataResult};
pub use provider::{MetadataService, CONNECTION_PROBE};
pub use types::{
    ColumnDescriptor, ForeignKeyInfo, GraphqlRequest, MetadataRequest, Nullability, ServiceInfo,
    TabularResult, TrackOutcome, TrackShape,
};
