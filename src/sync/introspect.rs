//! Live table structure through the metadata service.

use std::sync::Arc;

use tracing::debug;

use super::cache::StructureCache;
use crate::error::{SyncError, SyncResult};
use crate::metadata::{ColumnDescriptor, ForeignKeyInfo, MetadataService};
use crate::sql::catalog;
use crate::sql::ident::validate_identifier;

/// Reads `information_schema` and normalizes it into [`ColumnDescriptor`]s.
pub struct StructureIntrospector {
    service: Arc<dyn MetadataService>,
    cache: StructureCache,
    schema: String,
}

impl StructureIntrospector {
    pub fn new(service: Arc<dyn MetadataService>, cache: StructureCache, schema: impl Into<String>) -> Self {
        Self {
            service,
            cache,
            schema: schema.into(),
        }
    }

    pub fn cache(&self) -> &StructureCache {
        &self.cache
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Columns of `table`, served from the cache when fresh.
    ///
    /// Fails with `InvalidIdentifier` before any SQL is built, and with
    /// `NotFound` when the table does not exist.
    pub async fn get_table_structure(&self, table: &str) -> SyncResult<Vec<ColumnDescriptor>> {
        validate_identifier(table)?;
        if let Some(columns) = self.cache.get_cached(table) {
            debug!(table = %table, "structure cache hit");
            return Ok(columns);
        }
        self.fetch_table_structure(table).await
    }

    /// Columns of `table`, always read live. Refreshes the cache.
    pub async fn fetch_table_structure(&self, table: &str) -> SyncResult<Vec<ColumnDescriptor>> {
        let sql = catalog::table_columns_sql(&self.schema, table)?;
        let result = self.service.run_sql(&sql).await?;
        match catalog::parse_table_columns(table, &result) {
            Ok(columns) => {
                debug!(table = %table, columns = columns.len(), "structure fetched");
                self.cache.refresh(table, columns.clone());
                Ok(columns)
            }
            Err(e) => {
                self.cache.invalidate(table);
                Err(e)
            }
        }
    }

    /// Live columns, or `None` when the table does not exist.
    pub async fn try_fetch(&self, table: &str) -> SyncResult<Option<Vec<ColumnDescriptor>>> {
        match self.fetch_table_structure(table).await {
            Ok(columns) => Ok(Some(columns)),
            Err(SyncError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn table_exists(&self, table: &str) -> SyncResult<bool> {
        validate_identifier(table)?;
        if self.cache.get_cached(table).is_some() {
            return Ok(true);
        }
        Ok(self.try_fetch(table).await?.is_some())
    }

    /// Base tables of the managed schema, sorted by name.
    pub async fn list_tables(&self) -> SyncResult<Vec<String>> {
        let sql = catalog::list_tables_sql(&self.schema)?;
        let result = self.service.run_sql(&sql).await?;
        Ok(catalog::parse_table_names(&result))
    }

    /// Foreign keys declared on `table`.
    pub async fn foreign_keys(&self, table: &str) -> SyncResult<Vec<ForeignKeyInfo>> {
        let sql = catalog::foreign_keys_sql(&self.schema, table)?;
        let result = self.service.run_sql(&sql).await?;
        Ok(catalog::parse_foreign_keys(&result))
    }
}
