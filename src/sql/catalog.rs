//! Catalog queries against `information_schema` and their result parsing.
//!
//! Names are validated, then placed in value positions as quoted string
//! literals.

use super::ident::{quote_literal, validate_identifier};
use crate::error::{SyncError, SyncResult};
use crate::metadata::{ColumnDescriptor, ForeignKeyInfo, Nullability, TabularResult};

/// Columns of one table, in `ordinal_position` order.
///
/// The `LEFT JOIN` keeps one all-null row for a table with no columns, so an
/// empty result means the table does not exist.
pub fn table_columns_sql(schema: &str, table: &str) -> SyncResult<String> {
    validate_identifier(schema)?;
    validate_identifier(table)?;
    Ok(format!(
        "SELECT t.table_name, c.column_name, c.data_type, c.is_nullable, c.column_default \
         FROM information_schema.tables t \
         LEFT JOIN information_schema.columns c \
         ON c.table_schema = t.table_schema AND c.table_name = t.table_name \
         WHERE t.table_schema = {} AND t.table_name = {} \
         ORDER BY c.ordinal_position",
        quote_literal(schema),
        quote_literal(table)
    ))
}

/// Base tables of a schema, sorted by name.
pub fn list_tables_sql(schema: &str) -> SyncResult<String> {
    validate_identifier(schema)?;
    Ok(format!(
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = {} AND table_type = 'BASE TABLE' \
         ORDER BY table_name",
        quote_literal(schema)
    ))
}

/// Foreign keys declared on one table.
pub fn foreign_keys_sql(schema: &str, table: &str) -> SyncResult<String> {
    validate_identifier(schema)?;
    validate_identifier(table)?;
    Ok(format!(
        "SELECT kcu.column_name, ccu.table_name AS foreign_table_name, \
         ccu.column_name AS foreign_column_name \
         FROM information_schema.table_constraints AS tc \
         JOIN information_schema.key_column_usage AS kcu \
         ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
         JOIN information_schema.constraint_column_usage AS ccu \
         ON ccu.constraint_name = tc.constraint_name AND ccu.table_schema = tc.table_schema \
         WHERE tc.constraint_type = 'FOREIGN KEY' \
         AND tc.table_schema = {} AND tc.table_name = {} \
         ORDER BY kcu.ordinal_position",
        quote_literal(schema),
        quote_literal(table)
    ))
}

/// Parse the result of [`table_columns_sql`].
pub fn parse_table_columns(table: &str, result: &TabularResult) -> SyncResult<Vec<ColumnDescriptor>> {
    let rows = result.rows();
    if rows.is_empty() {
        return Err(SyncError::table_not_found(table));
    }

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(name) = cell(row, 1) else {
            // Table exists but has no columns.
            continue;
        };
        let nullable = match cell(row, 3) {
            Some(flag) if flag.eq_ignore_ascii_case("NO") => Nullability::No,
            _ => Nullability::Yes,
        };
        columns.push(ColumnDescriptor {
            name: name.to_string(),
            data_type: cell(row, 2).unwrap_or("text").to_string(),
            nullable,
            default_value: cell(row, 4).map(str::to_string),
        });
    }
    Ok(columns)
}

/// Parse the result of [`list_tables_sql`].
pub fn parse_table_names(result: &TabularResult) -> Vec<String> {
    result
        .rows()
        .iter()
        .filter_map(|row| cell(row, 0).map(str::to_string))
        .collect()
}

/// Parse the result of [`foreign_keys_sql`].
pub fn parse_foreign_keys(result: &TabularResult) -> Vec<ForeignKeyInfo> {
    result
        .rows()
        .iter()
        .filter_map(|row| {
            Some(ForeignKeyInfo {
                column: cell(row, 0)?.to_string(),
                foreign_table: cell(row, 1)?.to_string(),
                foreign_column: cell(row, 2)?.to_string(),
            })
        })
        .collect()
}

fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx).and_then(|c| c.as_deref())
}
