//! SQL generation.
//!
//! - [`ident`] - identifier validation and quoting
//! - [`token`] - token types for SQL generation
//! - [`ddl`] - `CREATE TABLE` / `ALTER TABLE` builders
//! - [`generator`] - models and column lists to DDL text
//! - [`catalog`] - `information_schema` queries and result parsing

pub mod catalog;
pub mod ddl;
pub mod generator;
pub mod ident;
pub mod token;

pub use ddl::{AddColumn, ColumnDef, CreateTable, ForeignKeyRef, ReferentialAction, TableConstraint};
pub use generator::{
    add_column_sql, create_junction_table_sql, create_table_sql, create_table_sql_for,
    junction_table_name, with_standard_fields,
};
pub use ident::{quote_identifier, quote_literal, validate_identifier};
pub use token::{Token, TokenStream};
