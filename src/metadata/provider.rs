//! The `MetadataService` trait.
//!
//! Everything the engine does to the remote database goes through this
//! trait: raw SQL, table tracking, relationship creation and GraphQL. The
//! HTTP implementation is [`HasuraClient`](super::HasuraClient); tests
//! substitute an in-memory fake.

use async_trait::async_trait;
use serde_json::Value;

use super::error::MetadataResult;
use super::types::{GraphqlRequest, ServiceInfo, TabularResult, TrackOutcome};

/// Introspection query used for connectivity checks.
pub const CONNECTION_PROBE: &str = "{ __schema { queryType { name } } }";

/// Administrative operations against the metadata service.
///
/// # Example
///
/// ```ignore
/// async fn example(service: &dyn MetadataService) -> MetadataResult<()> {
///     service.run_sql("CREATE TABLE IF NOT EXISTS \"tags\" (\"id\" uuid PRIMARY KEY)").await?;
///     service.track_table("tags").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Execute raw SQL. The result is a header row followed by data rows.
    async fn run_sql(&self, sql: &str) -> MetadataResult<TabularResult>;

    /// Register a table with the GraphQL layer.
    ///
    /// An already-tracked table is reported as [`TrackOutcome::AlreadyTracked`].
    async fn track_table(&self, table: &str) -> MetadataResult<TrackOutcome>;

    /// Create an object relationship on `table` through `fk_column`.
    ///
    /// The relationship is named after the singular of `related_table`. An
    /// existing relationship counts as success.
    async fn create_relationship(
        &self,
        table: &str,
        related_table: &str,
        fk_column: &str,
    ) -> MetadataResult<()>;

    /// Execute a GraphQL request, returning the full response body.
    async fn run_graphql(&self, request: &GraphqlRequest) -> MetadataResult<Value>;

    /// Whether the service answers an introspection query.
    async fn check_connection(&self) -> bool {
        self.run_graphql(&GraphqlRequest::new(CONNECTION_PROBE))
            .await
            .is_ok()
    }

    /// Describe the service for status pages. Secrets are never included.
    fn service_info(&self) -> ServiceInfo;
}
