//! Columns as the reconciler sees them.
//!
//! Registry fields and ad-hoc UI column lists are both lowered to
//! [`Column`] before any DDL is planned. Relation handling only looks at the
//! [`ColumnKind`] tag; nothing downstream inspects column names to decide
//! whether a column is a foreign key.

use inflector::Inflector;
use serde::{Deserialize, Deserializer, Serialize};

use super::definition::Field;
use super::field::{de_sql_literal, FieldDefinition, FieldType};
use super::standard::StandardField;
use crate::error::{SyncError, SyncResult};
use crate::sql::ddl::ReferentialAction;
use crate::sql::ident::{validate_default_expr, validate_identifier};

/// Cardinality of a relation column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    OneToOne,
    #[default]
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationType {
    /// Whether the foreign key lives on the declaring table.
    pub fn is_local_fk(&self) -> bool {
        matches!(self, RelationType::OneToOne | RelationType::ManyToOne)
    }
}

/// A relation to another table.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub table: String,
    /// Referenced column on `table`.
    pub column: String,
    pub cardinality: RelationType,
    /// Type of the local foreign key column.
    pub field_type: FieldType,
    pub nullable: bool,
    /// Emitted verbatim; `None` renders a plain `REFERENCES`.
    pub on_delete: Option<ReferentialAction>,
    /// Only meaningful when the key column is local.
    pub unique: bool,
    pub default_value: Option<String>,
}

impl Relation {
    /// A relation with the default referential action: `SET NULL` when
    /// nullable, none otherwise.
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        cardinality: RelationType,
        field_type: FieldType,
        nullable: bool,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            cardinality,
            field_type,
            nullable,
            on_delete: nullable.then_some(ReferentialAction::SetNull),
            unique: false,
            default_value: None,
        }
    }

    pub fn on_delete(mut self, action: Option<ReferentialAction>) -> Self {
        self.on_delete = action;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn default_value(mut self, expr: Option<String>) -> Self {
        self.default_value = expr;
        self
    }
}

/// What a column is.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Plain(FieldDefinition),
    Relation(Relation),
    Standard(StandardField),
}

/// A named, tagged column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn plain(name: impl Into<String>, definition: FieldDefinition) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Plain(definition),
        }
    }

    pub fn standard(field: StandardField) -> Self {
        Self {
            name: field.name().to_string(),
            kind: ColumnKind::Standard(field),
        }
    }

    pub fn relation(name: impl Into<String>, relation: Relation) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Relation(relation),
        }
    }

    pub fn is_primary_key(&self) -> bool {
        matches!(&self.kind, ColumnKind::Plain(def) if def.primary_key)
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match &self.kind {
            ColumnKind::Relation(rel) => Some(rel),
            _ => None,
        }
    }

    /// Lower a registry field. A `references` target becomes a `manyToOne`
    /// relation with a plain `REFERENCES`; everything else stays plain.
    pub fn from_field(field: &Field) -> Self {
        let def = &field.definition;
        match &def.references {
            Some(reference) => Column::relation(
                field.name.clone(),
                Relation::new(
                    &reference.model,
                    &reference.field,
                    RelationType::ManyToOne,
                    def.field_type,
                    def.is_nullable(),
                )
                .on_delete(None),
            ),
            None => Column::plain(field.name.clone(), def.clone()),
        }
    }
}

/// Name of the foreign key column that points at `table`: `<singular>_id`.
pub fn foreign_key_column_for(table: &str) -> String {
    format!("{}_id", table.to_singular())
}

/// Resolve the `_id` naming convention against a set of known tables.
///
/// `category_id` resolves to `category` or `categories`, whichever exists.
pub fn infer_relation_target(column: &str, known_tables: &[String]) -> Option<String> {
    let stem = column.strip_suffix("_id")?;
    if stem.is_empty() {
        return None;
    }
    let plural = stem.to_plural();
    known_tables
        .iter()
        .find(|t| t.eq_ignore_ascii_case(stem) || t.eq_ignore_ascii_case(&plural))
        .cloned()
}

/// A column as sent by the console for ad-hoc create and update.
///
/// Accepts both the create form (`isPrimary`, `isNullable`, `references`)
/// and the edit form (`nullable: "YES"`, `default_value`, `relatedTable`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: String,
    #[serde(
        default = "default_spec_nullable",
        alias = "isNullable",
        deserialize_with = "de_nullable"
    )]
    pub nullable: bool,
    #[serde(default, alias = "isPrimary")]
    pub primary_key: bool,
    #[serde(default, alias = "isUnique")]
    pub unique: bool,
    #[serde(default, alias = "default_value", deserialize_with = "de_sql_literal")]
    pub default_value: Option<String>,
    #[serde(default, alias = "relatedTable")]
    pub relation_table: Option<String>,
    #[serde(default)]
    pub relation_type: Option<RelationType>,
    #[serde(default)]
    pub references: Option<ColumnReference>,
}

/// `references: { table, column }` on a create-form column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnReference {
    pub table: String,
    #[serde(default = "default_reference_column")]
    pub column: String,
}

fn default_spec_nullable() -> bool {
    true
}

fn default_reference_column() -> String {
    "id".to_string()
}

fn de_nullable<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => true,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => !s.eq_ignore_ascii_case("no") && !s.eq_ignore_ascii_case("false"),
    })
}

impl ColumnSpec {
    /// A plain column spec of the given type.
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            primary_key: false,
            unique: false,
            default_value: None,
            relation_table: None,
            relation_type: None,
            references: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    pub fn related_to(mut self, table: impl Into<String>, cardinality: RelationType) -> Self {
        self.relation_table = Some(table.into());
        self.relation_type = Some(cardinality);
        self
    }

    /// Validate names and lower to a tagged [`Column`].
    ///
    /// A column named after a standard field becomes that standard field.
    pub fn into_column(self) -> SyncResult<Column> {
        validate_identifier(&self.name)?;

        if let Some(field) = StandardField::from_name(&self.name) {
            return Ok(Column::standard(field));
        }

        let default_value = match self.default_value {
            Some(expr) => Some(validate_default_expr(&expr)?.to_string()),
            None => None,
        };

        let is_relation_type = self.column_type.eq_ignore_ascii_case("relation");
        let target = match (&self.relation_table, &self.references) {
            (Some(table), _) if !table.is_empty() => {
                Some((table.clone(), "id".to_string(), self.relation_type.unwrap_or_default()))
            }
            (_, Some(reference)) => Some((
                reference.table.clone(),
                reference.column.clone(),
                self.relation_type.unwrap_or(RelationType::ManyToOne),
            )),
            _ => None,
        };

        if let Some((table, column, cardinality)) = target {
            validate_identifier(&table)?;
            validate_identifier(&column)?;
            let field_type = if is_relation_type || self.column_type.is_empty() {
                FieldType::Uuid
            } else {
                FieldType::parse(&self.column_type)
            };
            if !cardinality.is_local_fk() && (self.unique || default_value.is_some()) {
                return Err(SyncError::InvalidModel(format!(
                    "relation column \"{}\" has no local key to carry unique or a default",
                    self.name
                )));
            }
            let nullable = self.nullable && !self.primary_key;
            return Ok(Column::relation(
                self.name,
                Relation::new(table, column, cardinality, field_type, nullable)
                    .unique(self.unique)
                    .default_value(default_value),
            ));
        }

        if is_relation_type {
            return Err(SyncError::InvalidModel(format!(
                "relation column \"{}\" has no relation table",
                self.name
            )));
        }

        let mut def = FieldDefinition::new(FieldType::parse(&self.column_type));
        def.nullable = self.nullable;
        def.unique = self.unique;
        def.default_value = default_value;
        if self.primary_key {
            def = def.primary_key();
        }
        Ok(Column::plain(self.name, def))
    }
}

/// Lower a column list, promoting `_id` columns when `infer_relations` is set.
pub fn lower_columns(
    specs: Vec<ColumnSpec>,
    infer_relations: bool,
    known_tables: &[String],
) -> SyncResult<Vec<Column>> {
    let mut columns = Vec::with_capacity(specs.len());
    for mut spec in specs {
        if infer_relations && spec.relation_table.is_none() && spec.references.is_none() {
            if let Some(target) = infer_relation_target(&spec.name, known_tables) {
                spec.relation_table = Some(target);
                spec.relation_type = Some(RelationType::ManyToOne);
            }
        }
        columns.push(spec.into_column()?);
    }

    let mut seen = std::collections::HashSet::new();
    for col in &columns {
        if !seen.insert(col.name.to_ascii_lowercase()) {
            return Err(SyncError::InvalidModel(format!(
                "duplicate column \"{}\"",
                col.name
            )));
        }
    }
    if columns.iter().filter(|c| c.is_primary_key()).count() > 1 {
        return Err(SyncError::InvalidModel(
            "at most one primary key column is allowed".into(),
        ));
    }
    Ok(columns)
}
