//! HTTP implementation of [`MetadataService`] for Hasura.

use std::time::Duration;

use async_trait::async_trait;
use inflector::Inflector;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::error::{status_error, MetadataError, MetadataResult};
use super::provider::MetadataService;
use super::types::{
    GraphqlRequest, MetadataRequest, QualifiedTable, RelationshipUsing, ServiceInfo,
    TabularResult, TrackOutcome, TrackShape,
};
use crate::config::{expand_env_vars, MetadataSettings};

/// Header carrying the admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

const QUERY_PATH: &str = "/v2/query";
const METADATA_PATH: &str = "/v1/metadata";
const GRAPHQL_PATH: &str = "/v1/graphql";

/// Hasura metadata client.
///
/// Configuration is resolved per call, so a client built without an admin
/// secret fails each request with [`MetadataError::ConfigurationMissing`]
/// instead of failing at construction.
pub struct HasuraClient {
    http: Client,
    settings: MetadataSettings,
}

impl HasuraClient {
    /// Create a client with the request timeout from `settings`.
    pub fn new(settings: MetadataSettings) -> MetadataResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(MetadataError::Client)?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &MetadataSettings {
        &self.settings
    }

    /// Service root, from `endpoint` or `https://{subdomain}.hasura.{region}.nhost.run`.
    pub fn base_url(&self) -> MetadataResult<String> {
        if let Some(endpoint) = self.resolved(self.settings.endpoint.as_deref())? {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }
        match self.resolved(self.settings.subdomain.as_deref())? {
            Some(subdomain) => Ok(format!(
                "https://{}.hasura.{}.nhost.run",
                subdomain, self.settings.region
            )),
            None => Err(MetadataError::ConfigurationMissing(
                "metadata endpoint or Nhost subdomain (HASURA_ENDPOINT / NHOST_SUBDOMAIN)".into(),
            )),
        }
    }

    fn admin_secret(&self) -> MetadataResult<String> {
        self.resolved(self.settings.admin_secret.as_deref())?
            .ok_or_else(|| {
                MetadataError::ConfigurationMissing("admin secret (HASURA_ADMIN_SECRET)".into())
            })
    }

    /// Expand `${VAR}` references; empty values count as unset.
    fn resolved(&self, value: Option<&str>) -> MetadataResult<Option<String>> {
        match value {
            None => Ok(None),
            Some(raw) => {
                let expanded = expand_env_vars(raw)
                    .map_err(|e| MetadataError::ConfigurationMissing(e.to_string()))?;
                let trimmed = expanded.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
        }
    }

    /// POST a JSON body and decode the JSON response.
    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> MetadataResult<Value> {
        let url = format!("{}{}", self.base_url()?, path);
        let secret = self.admin_secret()?;

        let response = self
            .http
            .post(&url)
            .header(ADMIN_SECRET_HEADER, secret)
            .json(body)
            .send()
            .await
            .map_err(|source| MetadataError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| MetadataError::Transport {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            debug!(url = %url, status = %status, "metadata request rejected");
            return Err(status_error(status.as_u16(), &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| MetadataError::Decode(e.to_string()))
    }

    async fn try_track_primary(&self, table: &str) -> MetadataResult<()> {
        let body = MetadataRequest::TrackTable {
            schema: &self.settings.schema,
            name: table,
        };
        self.post(METADATA_PATH, &body).await.map(|_| ())
    }

    async fn try_track_alternate(&self, table: &str) -> MetadataResult<()> {
        let body = MetadataRequest::PgTrackTable {
            source: &self.settings.source,
            schema: &self.settings.schema,
            name: table,
        };
        self.post(METADATA_PATH, &body).await.map(|_| ())
    }
}

#[async_trait]
impl MetadataService for HasuraClient {
    async fn run_sql(&self, sql: &str) -> MetadataResult<TabularResult> {
        let body = MetadataRequest::RunSql {
            sql,
            cascade: true,
            source: None,
        };
        debug!(sql_len = sql.len(), "run_sql");
        let value = self.post(QUERY_PATH, &body).await?;
        if value.is_null() {
            return Ok(TabularResult::command_ok());
        }
        serde_json::from_value(value).map_err(|e| MetadataError::Decode(e.to_string()))
    }

    async fn track_table(&self, table: &str) -> MetadataResult<TrackOutcome> {
        match self.try_track_primary(table).await {
            Ok(()) => {
                info!(table = %table, "table tracked with track_table");
                return Ok(TrackOutcome::Tracked(TrackShape::TrackTable));
            }
            Err(e) if e.is_already_exists() => {
                debug!(table = %table, "table already tracked");
                return Ok(TrackOutcome::AlreadyTracked);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(primary) => {
                warn!(
                    table = %table,
                    error = %primary,
                    "track_table rejected, retrying with pg_track_table"
                );
            }
        }

        match self.try_track_alternate(table).await {
            Ok(()) => {
                info!(table = %table, "table tracked with pg_track_table");
                Ok(TrackOutcome::Tracked(TrackShape::PgTrackTable))
            }
            Err(e) if e.is_already_exists() => {
                debug!(table = %table, "table already tracked");
                Ok(TrackOutcome::AlreadyTracked)
            }
            Err(alternate) => {
                error!(table = %table, error = %alternate, "pg_track_table failed");
                Err(alternate)
            }
        }
    }

    async fn create_relationship(
        &self,
        table: &str,
        related_table: &str,
        fk_column: &str,
    ) -> MetadataResult<()> {
        let name = related_table.to_singular();
        let body = MetadataRequest::PgCreateObjectRelationship {
            source: &self.settings.source,
            table: QualifiedTable {
                schema: &self.settings.schema,
                name: table,
            },
            name: &name,
            using: RelationshipUsing {
                foreign_key_constraint_on: fk_column,
            },
        };

        match self.post(METADATA_PATH, &body).await {
            Ok(_) => {
                info!(table = %table, relationship = %name, column = %fk_column, "object relationship created");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                debug!(table = %table, relationship = %name, "relationship already exists");
                Ok(())
            }
            Err(e) => {
                warn!(table = %table, relationship = %name, error = %e, "relationship creation failed");
                Err(e)
            }
        }
    }

    async fn run_graphql(&self, request: &GraphqlRequest) -> MetadataResult<Value> {
        let body = self.post(GRAPHQL_PATH, request).await?;
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            let message = errors
                .first()
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("unknown GraphQL error");
            return Err(MetadataError::GraphQl(message.to_string()));
        }
        Ok(body)
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo {
            kind: "hasura".to_string(),
            base_url: self.base_url().ok(),
            source: self.settings.source.clone(),
            schema: self.settings.schema.clone(),
            admin_secret: if self.admin_secret().is_ok() {
                "[HIDDEN]"
            } else {
                "[NOT SET]"
            },
        }
    }
}
