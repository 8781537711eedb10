//! Metadata request and response types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// `"YES"` / `"NO"`, as `information_schema` spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nullability {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

/// Normalized live column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: Nullability,
    pub default_value: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        nullable: bool,
        default_value: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: if nullable {
                Nullability::Yes
            } else {
                Nullability::No
            },
            default_value: default_value.map(str::to_string),
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable == Nullability::Yes
    }
}

/// A foreign key on a table: `column -> foreign_table.foreign_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyInfo {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

/// Result of `run_sql`: a header row followed by data rows.
///
/// Cells are normalized so that JSON `null` and the text `"NULL"` both
/// become `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularResult {
    #[serde(default)]
    pub result_type: Option<String>,
    #[serde(default, deserialize_with = "de_cells")]
    pub result: Vec<Vec<Option<String>>>,
}

impl TabularResult {
    /// Build a `TuplesOk` result from raw rows (header first).
    pub fn from_rows(result: Vec<Vec<Option<String>>>) -> Self {
        Self {
            result_type: Some("TuplesOk".to_string()),
            result,
        }
    }

    /// A `CommandOk` result with no rows.
    pub fn command_ok() -> Self {
        Self {
            result_type: Some("CommandOk".to_string()),
            result: Vec::new(),
        }
    }

    pub fn header(&self) -> Option<&[Option<String>]> {
        self.result.first().map(Vec::as_slice)
    }

    /// Data rows, without the header.
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        self.result.get(1..).unwrap_or(&[])
    }
}

fn de_cells<'de, D>(deserializer: D) -> Result<Vec<Vec<Option<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Vec<Value>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    Value::Null => None,
                    Value::String(s) if s == "NULL" => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .collect())
}

/// Admin request envelope, serialized as `{"type": ..., "args": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "args", rename_all = "snake_case")]
pub enum MetadataRequest<'a> {
    RunSql {
        sql: &'a str,
        cascade: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<&'a str>,
    },
    TrackTable {
        schema: &'a str,
        name: &'a str,
    },
    PgTrackTable {
        source: &'a str,
        schema: &'a str,
        name: &'a str,
    },
    PgCreateObjectRelationship {
        source: &'a str,
        table: QualifiedTable<'a>,
        name: &'a str,
        using: RelationshipUsing<'a>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct QualifiedTable<'a> {
    pub schema: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationshipUsing<'a> {
    pub foreign_key_constraint_on: &'a str,
}

/// GraphQL request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            operation_name: None,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Which request shape registered a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackShape {
    TrackTable,
    PgTrackTable,
}

/// Outcome of tracking a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "shape")]
pub enum TrackOutcome {
    Tracked(TrackShape),
    AlreadyTracked,
}

/// Description of the configured service, with the admin secret hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub base_url: Option<String>,
    pub source: String,
    pub schema: String,
    pub admin_secret: &'static str,
}
