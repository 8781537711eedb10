//! The four standard fields every managed table is expected to carry.

use std::fmt;

use serde::Serialize;

use super::field::{FieldDefinition, FieldType};
use crate::metadata::{ColumnDescriptor, Nullability};

/// A standard field. Standard fields are never offered for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardField {
    CreatedAt,
    UpdatedAt,
    IsActive,
    Metadata,
}

impl StandardField {
    /// All standard fields, in the order they are appended.
    pub const ALL: [StandardField; 4] = [
        StandardField::CreatedAt,
        StandardField::UpdatedAt,
        StandardField::IsActive,
        StandardField::Metadata,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StandardField::CreatedAt => "created_at",
            StandardField::UpdatedAt => "updated_at",
            StandardField::IsActive => "is_active",
            StandardField::Metadata => "metadata",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            StandardField::CreatedAt | StandardField::UpdatedAt => FieldType::Timestamp,
            StandardField::IsActive => FieldType::Boolean,
            StandardField::Metadata => FieldType::Jsonb,
        }
    }

    pub fn default_expr(&self) -> &'static str {
        match self {
            StandardField::CreatedAt | StandardField::UpdatedAt => "now()",
            StandardField::IsActive => "true",
            StandardField::Metadata => "'{}'",
        }
    }

    /// Case-insensitive lookup by column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn is_standard(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    /// Canonical definition: non-null with a default.
    pub fn definition(&self) -> FieldDefinition {
        FieldDefinition::new(self.field_type())
            .not_null()
            .default_value(self.default_expr())
    }

    /// Descriptor of the column as it looks once added.
    pub fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name().to_string(),
            data_type: self.field_type().sql_type().to_string(),
            nullable: Nullability::No,
            default_value: Some(self.default_expr().to_string()),
        }
    }

    /// Standard fields absent from `columns`, compared case-insensitively.
    pub fn missing_from(columns: &[ColumnDescriptor]) -> Vec<StandardField> {
        Self::ALL
            .into_iter()
            .filter(|f| !columns.iter().any(|c| c.name.eq_ignore_ascii_case(f.name())))
            .collect()
    }
}

impl fmt::Display for StandardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Order columns for display: user columns first, standard columns after.
///
/// Relative order within each group is preserved.
pub fn display_order(columns: &[ColumnDescriptor]) -> Vec<ColumnDescriptor> {
    let (standard, user): (Vec<_>, Vec<_>) = columns
        .iter()
        .cloned()
        .partition(|c| StandardField::is_standard(&c.name));
    user.into_iter().chain(standard).collect()
}
