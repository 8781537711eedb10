//! Model and column lists to DDL text.
//!
//! Every function validates the names it is given before building any SQL,
//! so callers may pass untrusted input straight through.
//!
//! Referential actions:
//!
//! | Column                         | ON DELETE  |
//! |--------------------------------|------------|
//! | nullable relation column       | `SET NULL` |
//! | non-null relation column       | (none)     |
//! | junction table key             | `CASCADE`  |
//! | registry `references` field    | (none)     |

use super::ddl::{AddColumn, ColumnDef, CreateTable, ForeignKeyRef, ReferentialAction, TableConstraint};
use super::ident::{validate_default_expr, validate_identifier};
use crate::error::{SyncError, SyncResult};
use crate::model::{Column, ColumnKind, FieldDefinition, FieldType, ModelDefinition, Relation, RelationType, StandardField};

/// `CREATE TABLE IF NOT EXISTS` for a registered model, all fields in order.
pub fn create_table_sql(model: &ModelDefinition) -> SyncResult<String> {
    validate_identifier(&model.name)?;
    let mut defs = Vec::with_capacity(model.fields.len());
    for field in &model.fields {
        validate_identifier(&field.name)?;
        let mut def = field_column_def(&field.name, &field.definition)?;
        if let Some(reference) = &field.definition.references {
            validate_identifier(&reference.model)?;
            validate_identifier(&reference.field)?;
            def = def.references(ForeignKeyRef::new(&reference.model, &reference.field));
        }
        defs.push(def);
    }
    if defs.is_empty() {
        return Err(SyncError::InvalidModel(format!(
            "model \"{}\" has no fields",
            model.name
        )));
    }

    Ok(CreateTable::new(&model.name)
        .if_not_exists()
        .columns(defs)
        .to_sql())
}

/// `CREATE TABLE IF NOT EXISTS` for an ad-hoc column list.
///
/// Columns with no local representation (`oneToMany`, `manyToMany`) are
/// skipped; the reconciler applies those separately.
pub fn create_table_sql_for(table: &str, columns: &[Column]) -> SyncResult<String> {
    validate_identifier(table)?;
    let mut defs = Vec::with_capacity(columns.len());
    for column in columns {
        if let Some(def) = column_def(column)? {
            defs.push(def);
        }
    }
    if defs.is_empty() {
        return Err(SyncError::InvalidModel(format!(
            "table \"{table}\" has no columns"
        )));
    }

    Ok(CreateTable::new(table).if_not_exists().columns(defs).to_sql())
}

/// `ALTER TABLE "t" ADD COLUMN IF NOT EXISTS ...` for one column.
pub fn add_column_sql(table: &str, column: &Column) -> SyncResult<String> {
    validate_identifier(table)?;
    let def = column_def(column)?.ok_or_else(|| {
        SyncError::InvalidModel(format!(
            "column \"{}\" has no local representation on \"{table}\"",
            column.name
        ))
    })?;
    Ok(AddColumn::new(table, def).if_not_exists().to_sql())
}

/// Append the standard fields a column list does not already declare.
pub fn with_standard_fields(mut columns: Vec<Column>) -> Vec<Column> {
    for field in StandardField::ALL {
        if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(field.name())) {
            columns.push(Column::standard(field));
        }
    }
    columns
}

/// Name of the junction table between `a` and `b`.
pub fn junction_table_name(a: &str, b: &str) -> String {
    format!("{a}_{b}")
}

/// Key column names of the junction table between `a` and `b`.
///
/// A self-referencing junction names its second key `related_<a>_id`.
pub fn junction_key_columns(a: &str, b: &str) -> (String, String) {
    let left = format!("{a}_id");
    let right = if a == b {
        format!("related_{b}_id")
    } else {
        format!("{b}_id")
    };
    (left, right)
}

/// Junction table DDL keyed by uuid on both sides.
pub fn create_junction_table_sql(a: &str, b: &str) -> SyncResult<String> {
    create_junction_table_sql_typed(a, FieldType::Uuid, b, FieldType::Uuid)
}

/// Junction table DDL with explicit key types, matching the parents' `id`.
pub fn create_junction_table_sql_typed(
    a: &str,
    a_key: FieldType,
    b: &str,
    b_key: FieldType,
) -> SyncResult<String> {
    validate_identifier(a)?;
    validate_identifier(b)?;
    let name = junction_table_name(a, b);
    validate_identifier(&name)?;
    let (left, right) = junction_key_columns(a, b);
    validate_identifier(&right)?;

    let key = |column: &str, key_type: FieldType, parent: &str| {
        ColumnDef::new(column, key_type)
            .not_null()
            .references(ForeignKeyRef::new(parent, "id").on_delete(ReferentialAction::Cascade))
    };

    Ok(CreateTable::new(&name)
        .if_not_exists()
        .column(key(&left, a_key, a))
        .column(key(&right, b_key, b))
        .constraint(TableConstraint::primary_key([left.clone(), right.clone()]))
        .to_sql())
}

/// The local column definition of a tagged column, if it has one.
pub fn column_def(column: &Column) -> SyncResult<Option<ColumnDef>> {
    validate_identifier(&column.name)?;
    let def = match &column.kind {
        ColumnKind::Plain(definition) => field_column_def(&column.name, definition)?,
        ColumnKind::Standard(field) => field_column_def(&column.name, &field.definition())?,
        ColumnKind::Relation(relation) if relation.cardinality.is_local_fk() => {
            relation_column_def(&column.name, relation)?
        }
        ColumnKind::Relation(_) => return Ok(None),
    };
    Ok(Some(def))
}

/// Definition of a foreign key column that points back at `table`.
///
/// Used for `oneToMany` relations, where the key lives on the related side.
pub fn inbound_fk_column(table: &str, column: &str, key_type: FieldType) -> Column {
    Column::relation(
        column,
        Relation::new(table, "id", RelationType::ManyToOne, key_type, true),
    )
}

fn field_column_def(name: &str, definition: &FieldDefinition) -> SyncResult<ColumnDef> {
    let mut def = ColumnDef::new(name, definition.field_type).nullable(definition.is_nullable());
    if definition.primary_key {
        def = def.primary_key();
    }
    if definition.unique {
        def = def.unique();
    }
    if let Some(expr) = &definition.default_value {
        def = def.default(validate_default_expr(expr)?);
    }
    Ok(def)
}

fn relation_column_def(name: &str, relation: &Relation) -> SyncResult<ColumnDef> {
    validate_identifier(&relation.table)?;
    validate_identifier(&relation.column)?;

    let mut reference = ForeignKeyRef::new(&relation.table, &relation.column);
    if let Some(action) = relation.on_delete {
        reference = reference.on_delete(action);
    }

    let mut def = ColumnDef::new(name, relation.field_type)
        .nullable(relation.nullable)
        .references(reference);
    if relation.unique || relation.cardinality == RelationType::OneToOne {
        def = def.unique();
    }
    if let Some(expr) = &relation.default_value {
        def = def.default(validate_default_expr(expr)?);
    }
    Ok(def)
}
