//! Declarative model definitions.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::field::{FieldDefinition, FieldType};

/// A named field of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub definition: FieldDefinition,
}

/// An abstract table description.
///
/// Field order is significant: it is the column order of the generated
/// `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDefinition {
    pub name: String,
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<Field>,
    pub timestamps: bool,
}

impl ModelDefinition {
    /// Create an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            timestamps: false,
        }
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.fields.push(Field {
            name: name.into(),
            definition,
        });
        self
    }

    /// Request `createdAt` / `updatedAt` columns.
    pub fn with_timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.definition)
    }

    /// The primary-key field, if one is declared.
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.definition.primary_key)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Models this one references through `references`, excluding itself.
    pub fn referenced_models(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter_map(|f| f.definition.references.as_ref())
            .map(|r| r.model.as_str())
            .filter(move |m| *m != self.name)
    }

    /// Insert or replace a field, keeping the position of an existing one.
    pub(crate) fn upsert_field(&mut self, name: &str, definition: FieldDefinition) {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.definition = definition,
            None => self.fields.push(Field {
                name: name.to_string(),
                definition,
            }),
        }
    }
}

/// The injected primary key: `id uuid PRIMARY KEY DEFAULT gen_random_uuid()`.
pub fn synthetic_primary_key() -> FieldDefinition {
    FieldDefinition::new(FieldType::Uuid)
        .primary_key()
        .default_value("gen_random_uuid()")
}

/// The definition used for `createdAt` / `updatedAt`.
pub fn timestamp_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Timestamp)
        .not_null()
        .default_value("now()")
}

fn serialize_fields<S>(fields: &[Field], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for field in fields {
        map.serialize_entry(&field.name, &field.definition)?;
    }
    map.end()
}
