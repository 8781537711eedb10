//! DDL statement builders.
//!
//! Builders hold already-validated names and render through
//! [`TokenStream`]. The generator in [`super::generator`] is the only code
//! that constructs them from models and column lists.
//!
//! ```ignore
//! use modelsync::sql::ddl::{ColumnDef, CreateTable};
//! use modelsync::model::FieldType;
//!
//! let table = CreateTable::new("tags")
//!     .if_not_exists()
//!     .column(ColumnDef::new("id", FieldType::Uuid).primary_key().default("gen_random_uuid()"))
//!     .column(ColumnDef::new("label", FieldType::Text).not_null().unique());
//!
//! println!("{}", table.to_sql());
//! ```

use super::token::{Token, TokenStream};
use crate::model::FieldType;

// ============================================================================
// CREATE TABLE
// ============================================================================

/// CREATE TABLE statement.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateTable {
    pub if_not_exists: bool,
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

impl CreateTable {
    /// Create a new CREATE TABLE statement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            if_not_exists: false,
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Add IF NOT EXISTS clause.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Add a column definition.
    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    /// Add multiple column definitions.
    pub fn columns(mut self, cols: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(cols);
        self
    }

    /// Add a table constraint.
    pub fn constraint(mut self, constraint: TableConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Convert to SQL.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Create).space().push(Token::Table);

        if self.if_not_exists {
            ts.space()
                .push(Token::If)
                .space()
                .push(Token::Not)
                .space()
                .push(Token::Exists);
        }

        ts.space().push(Token::Ident(self.name.clone()));

        ts.space().lparen();

        let mut first = true;
        for col in &self.columns {
            if !first {
                ts.comma().space();
            }
            first = false;
            ts.append(&col.to_tokens());
        }

        for constraint in &self.constraints {
            if !first {
                ts.comma().space();
            }
            first = false;
            ts.append(&constraint.to_tokens());
        }

        ts.rparen();
        ts
    }
}

// ============================================================================
// Column Definition
// ============================================================================

/// Column definition for CREATE TABLE and ALTER TABLE ... ADD COLUMN.
///
/// Modifiers always render in the order primary key, unique, nullability,
/// default, reference. A primary key column never renders `NOT NULL` (the
/// key implies it) and no column ever renders an explicit `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: FieldType,
    pub primary_key: bool,
    pub unique: bool,
    pub nullable: bool,
    pub default: Option<String>,
    pub references: Option<ForeignKeyRef>,
}

impl ColumnDef {
    /// Create a nullable column with no modifiers.
    pub fn new(name: impl Into<String>, data_type: FieldType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            unique: false,
            nullable: true,
            default: None,
            references: None,
        }
    }

    /// Mark column as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Set nullability explicitly.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Add PRIMARY KEY constraint. Forces the column to be non-nullable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Add UNIQUE constraint.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a literal default expression.
    pub fn default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Add a REFERENCES clause.
    pub fn references(mut self, reference: ForeignKeyRef) -> Self {
        self.references = Some(reference);
        self
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Ident(self.name.clone()));
        ts.space()
            .push(Token::Raw(self.data_type.sql_type().to_string()));

        if self.primary_key {
            ts.space().push(Token::Primary).space().push(Token::Key);
        }

        if self.unique && !self.primary_key {
            ts.space().push(Token::Unique);
        }

        if !self.nullable && !self.primary_key {
            ts.space().push(Token::Not).space().push(Token::Null);
        }

        if let Some(ref expr) = self.default {
            ts.space()
                .push(Token::Default)
                .space()
                .push(Token::Raw(expr.clone()));
        }

        if let Some(ref reference) = self.references {
            ts.space().append(&reference.to_tokens());
        }

        ts
    }
}

/// Target of a column-level REFERENCES clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
    pub on_delete: Option<ReferentialAction>,
}

impl ForeignKeyRef {
    /// Reference `table(column)` with no referential action.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete: None,
        }
    }

    /// Set the ON DELETE action.
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::References)
            .space()
            .push(Token::Ident(self.table.clone()))
            .lparen()
            .push(Token::Ident(self.column.clone()))
            .rparen();

        if let Some(action) = self.on_delete {
            ts.space()
                .push(Token::On)
                .space()
                .push(Token::Delete)
                .space()
                .append(&action.to_tokens());
        }
        ts
    }
}

// ============================================================================
// Table Constraints
// ============================================================================

/// Table-level constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey { columns: Vec<String> },
}

impl TableConstraint {
    /// Create a PRIMARY KEY constraint.
    pub fn primary_key(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        TableConstraint::PrimaryKey {
            columns: columns.into_iter().map(|c| c.into()).collect(),
        }
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            TableConstraint::PrimaryKey { columns } => {
                ts.push(Token::Primary).space().push(Token::Key).space();
                ts.ident_list(columns.iter().map(String::as_str));
            }
        }
        ts
    }
}

/// Referential action for foreign key constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        match self {
            ReferentialAction::NoAction => ts.push(Token::NoAction),
            ReferentialAction::Restrict => ts.push(Token::Restrict),
            ReferentialAction::Cascade => ts.push(Token::Cascade),
            ReferentialAction::SetNull => ts.push(Token::SetNull),
            ReferentialAction::SetDefault => ts.push(Token::SetDefault),
        };
        ts
    }
}

// ============================================================================
// ALTER TABLE
// ============================================================================

/// `ALTER TABLE ... ADD COLUMN` statement.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct AddColumn {
    pub table: String,
    pub if_not_exists: bool,
    pub column: ColumnDef,
}

impl AddColumn {
    /// Add `column` to `table`.
    pub fn new(table: impl Into<String>, column: ColumnDef) -> Self {
        Self {
            table: table.into(),
            if_not_exists: false,
            column,
        }
    }

    /// Add IF NOT EXISTS clause.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Convert to SQL.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    /// Convert to token stream.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Alter)
            .space()
            .push(Token::Table)
            .space()
            .push(Token::Ident(self.table.clone()))
            .space()
            .push(Token::Add)
            .space()
            .push(Token::Column)
            .space();

        if self.if_not_exists {
            ts.push(Token::If)
                .space()
                .push(Token::Not)
                .space()
                .push(Token::Exists)
                .space();
        }

        ts.append(&self.column.to_tokens());
        ts
    }
}
