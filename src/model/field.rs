//! Field types and per-field definitions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Abstract column type.
///
/// The set is closed. Parsing a type name that is not recognised yields
/// [`FieldType::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Uuid,
    Text,
    Integer,
    Float,
    Boolean,
    Json,
    Jsonb,
    Timestamp,
    Date,
    Time,
}

impl FieldType {
    /// The Postgres type this field is emitted as.
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Uuid => "uuid",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
            FieldType::Jsonb => "jsonb",
            FieldType::Timestamp => "timestamp with time zone",
            FieldType::Date => "date",
            FieldType::Time => "time",
        }
    }

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Uuid => "uuid",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Json => "json",
            FieldType::Jsonb => "jsonb",
            FieldType::Timestamp => "timestamp",
            FieldType::Date => "date",
            FieldType::Time => "time",
        }
    }

    /// Parse a type name, accepting common Postgres spellings.
    ///
    /// Length and precision suffixes (`varchar(255)`, `numeric(10,2)`) are
    /// ignored. Anything unrecognised maps to `Text`.
    pub fn parse(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        let base = lower.split('(').next().unwrap_or("").trim();
        match base {
            "uuid" => FieldType::Uuid,
            "integer" | "int" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "serial"
            | "bigserial" => FieldType::Integer,
            "float" | "float4" | "float8" | "real" | "double precision" | "numeric"
            | "decimal" => FieldType::Float,
            "boolean" | "bool" => FieldType::Boolean,
            "json" => FieldType::Json,
            "jsonb" => FieldType::Jsonb,
            "timestamp" | "timestamptz" | "timestamp with time zone"
            | "timestamp without time zone" => FieldType::Timestamp,
            "date" => FieldType::Date,
            "time" | "timetz" | "time with time zone" | "time without time zone" => {
                FieldType::Time
            }
            _ => FieldType::Text,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::parse(&s)
    }
}

impl From<FieldType> for String {
    fn from(t: FieldType) -> Self {
        t.as_str().to_string()
    }
}

/// Foreign key target of a field: `model.field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub model: String,
    pub field: String,
}

impl Reference {
    pub fn new(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            field: field.into(),
        }
    }
}

fn default_nullable() -> bool {
    true
}

/// A single declared field.
///
/// `primary_key` implies non-nullable regardless of `nullable`; use
/// [`FieldDefinition::is_nullable`] for the effective value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(
        default,
        rename = "defaultValue",
        alias = "default",
        deserialize_with = "de_sql_literal",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Reference>,
}

impl FieldDefinition {
    /// A nullable field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            nullable: true,
            default_value: None,
            primary_key: false,
            unique: false,
            references: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn references(mut self, model: impl Into<String>, field: impl Into<String>) -> Self {
        self.references = Some(Reference::new(model, field));
        self
    }

    /// Effective nullability.
    pub fn is_nullable(&self) -> bool {
        self.nullable && !self.primary_key
    }
}

/// Accept a default as a JSON string, number or boolean.
///
/// UI payloads send `"defaultValue": 0` and `"defaultValue": true` as often
/// as the string forms.
pub(crate) fn de_sql_literal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
