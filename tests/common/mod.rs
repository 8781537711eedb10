//! In-process fake of the metadata service.
//!
//! Keeps a tiny catalog in memory, answers the catalog queries the engine
//! issues and applies the `CREATE TABLE` / `ALTER TABLE` statements it
//! generates.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use modelsync::config::SyncSettings;
use modelsync::metadata::{
    ColumnDescriptor, ForeignKeyInfo, GraphqlRequest, MetadataError, MetadataResult,
    MetadataService, ServiceInfo, TabularResult, TrackOutcome, TrackShape,
};
use modelsync::model::ModelRegistry;
use modelsync::sync::Reconciler;
use serde_json::{json, Value};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
    pub primary_key: Vec<String>,
}

impl FakeTable {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Default)]
struct FakeState {
    tables: Vec<FakeTable>,
    statements: Vec<String>,
    catalog_queries: usize,
    tracked: Vec<String>,
    relationships: Vec<(String, String, String)>,
    fail_patterns: Vec<String>,
    fail_tracking: bool,
    graphql_error: Option<String>,
    delay: Option<Duration>,
}

impl FakeState {
    fn table(&self, name: &str) -> Option<&FakeTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut FakeTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name == name)
    }
}

/// Fake metadata service backed by an in-memory catalog.
#[derive(Debug, Default)]
pub struct FakeMetadata {
    state: Mutex<FakeState>,
}

impl FakeMetadata {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Add a table with `(name, type, nullable, default)` columns.
    pub fn add_table(&self, name: &str, columns: &[(&str, &str, bool, Option<&str>)]) {
        let columns = columns
            .iter()
            .map(|(n, t, nullable, default)| ColumnDescriptor::new(*n, *t, *nullable, *default))
            .collect();
        self.state().tables.push(FakeTable {
            name: name.to_string(),
            columns,
            ..FakeTable::default()
        });
    }

    pub fn add_foreign_key(&self, table: &str, column: &str, foreign_table: &str) {
        let mut state = self.state();
        let t = state.table_mut(table).expect("table exists");
        t.foreign_keys.push(ForeignKeyInfo {
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: "id".to_string(),
        });
    }

    pub fn mark_tracked(&self, table: &str) {
        self.state().tracked.push(table.to_string());
    }

    /// Fail every statement containing `pattern`.
    pub fn fail_sql_containing(&self, pattern: &str) {
        self.state().fail_patterns.push(pattern.to_string());
    }

    pub fn fail_tracking(&self) {
        self.state().fail_tracking = true;
    }

    pub fn fail_graphql(&self, message: &str) {
        self.state().graphql_error = Some(message.to_string());
    }

    /// Delay every `run_sql` call.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = Some(delay);
    }

    pub fn table(&self, name: &str) -> Option<FakeTable> {
        self.state().table(name).cloned()
    }

    pub fn column_names(&self, table: &str) -> Vec<String> {
        self.table(table).map(|t| t.column_names()).unwrap_or_default()
    }

    /// Every non-catalog statement received, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    pub fn catalog_queries(&self) -> usize {
        self.state().catalog_queries
    }

    pub fn tracked(&self) -> Vec<String> {
        self.state().tracked.clone()
    }

    pub fn relationships(&self) -> Vec<(String, String, String)> {
        self.state().relationships.clone()
    }

    fn execute(&self, sql: &str) -> MetadataResult<TabularResult> {
        let mut state = self.state();
        let trimmed = sql.trim();

        if trimmed.contains("LEFT JOIN information_schema.columns") {
            state.catalog_queries += 1;
            let name = literal_after(trimmed, "t.table_name = '");
            let mut rows = vec![header(&[
                "table_name",
                "column_name",
                "data_type",
                "is_nullable",
                "column_default",
            ])];
            if let Some(table) = state.table(&name) {
                if table.columns.is_empty() {
                    rows.push(vec![Some(table.name.clone()), None, None, None, None]);
                }
                for c in &table.columns {
                    rows.push(vec![
                        Some(table.name.clone()),
                        Some(c.name.clone()),
                        Some(c.data_type.clone()),
                        Some(if c.is_nullable() { "YES" } else { "NO" }.to_string()),
                        c.default_value.clone(),
                    ]);
                }
            }
            return Ok(TabularResult::from_rows(rows));
        }

        if trimmed.contains("information_schema.table_constraints") {
            state.catalog_queries += 1;
            let name = literal_after(trimmed, "tc.table_name = '");
            let mut rows = vec![header(&["column_name", "foreign_table_name", "foreign_column_name"])];
            if let Some(table) = state.table(&name) {
                for fk in &table.foreign_keys {
                    rows.push(vec![
                        Some(fk.column.clone()),
                        Some(fk.foreign_table.clone()),
                        Some(fk.foreign_column.clone()),
                    ]);
                }
            }
            return Ok(TabularResult::from_rows(rows));
        }

        if trimmed.contains("FROM information_schema.tables") {
            state.catalog_queries += 1;
            let names: BTreeSet<String> = state.tables.iter().map(|t| t.name.clone()).collect();
            let mut rows = vec![header(&["table_name"])];
            rows.extend(names.into_iter().map(|n| vec![Some(n)]));
            return Ok(TabularResult::from_rows(rows));
        }

        state.statements.push(trimmed.to_string());
        if let Some(pattern) = state.fail_patterns.iter().find(|p| trimmed.contains(p.as_str())) {
            return Err(MetadataError::status(
                400,
                Some("postgres-error".to_string()),
                format!("simulated failure for {pattern:?}"),
            ));
        }

        if let Some(rest) = trimmed.strip_prefix("CREATE TABLE IF NOT EXISTS ") {
            let (name, rest) = quoted(rest);
            if state.table(&name).is_some() {
                return Ok(TabularResult::command_ok());
            }
            let body = rest
                .trim()
                .strip_prefix('(')
                .and_then(|b| b.strip_suffix(')'))
                .unwrap_or_default();
            let mut table = FakeTable {
                name: name.clone(),
                ..FakeTable::default()
            };
            for part in split_top_level(body) {
                if let Some(cols) = part.strip_prefix("PRIMARY KEY ") {
                    table.primary_key = cols
                        .trim_matches(|c| c == '(' || c == ')')
                        .split(", ")
                        .map(|c| c.trim_matches('"').to_string())
                        .collect();
                    continue;
                }
                let (column, fk) = parse_column(&part);
                if let Some(fk) = fk {
                    if fk.foreign_table != name && state.table(&fk.foreign_table).is_none() {
                        return Err(missing_relation(&fk.foreign_table));
                    }
                    table.foreign_keys.push(fk);
                }
                table.columns.push(column);
            }
            state.tables.push(table);
            return Ok(TabularResult::command_ok());
        }

        if let Some(rest) = trimmed.strip_prefix("ALTER TABLE ") {
            let (name, rest) = quoted(rest);
            let Some(def) = rest.trim().strip_prefix("ADD COLUMN IF NOT EXISTS ") else {
                return Ok(TabularResult::command_ok());
            };
            let (column, fk) = parse_column(def);
            if let Some(fk) = &fk {
                if state.table(&fk.foreign_table).is_none() {
                    return Err(missing_relation(&fk.foreign_table));
                }
            }
            let Some(table) = state.table_mut(&name) else {
                return Err(missing_relation(&name));
            };
            if table.column(&column.name).is_none() {
                table.columns.push(column);
                table.foreign_keys.extend(fk);
            }
            return Ok(TabularResult::command_ok());
        }

        Ok(TabularResult::command_ok())
    }
}

#[async_trait]
impl MetadataService for FakeMetadata {
    async fn run_sql(&self, sql: &str) -> MetadataResult<TabularResult> {
        let delay = self.state().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.execute(sql)
    }

    async fn track_table(&self, table: &str) -> MetadataResult<TrackOutcome> {
        let mut state = self.state();
        if state.fail_tracking {
            return Err(MetadataError::status(
                400,
                Some("permission-denied".to_string()),
                "tracking rejected",
            ));
        }
        if state.table(table).is_none() {
            return Err(MetadataError::status(400, Some("not-exists".to_string()), "no such table"));
        }
        if state.tracked.iter().any(|t| t == table) {
            return Ok(TrackOutcome::AlreadyTracked);
        }
        state.tracked.push(table.to_string());
        Ok(TrackOutcome::Tracked(TrackShape::TrackTable))
    }

    async fn create_relationship(
        &self,
        table: &str,
        related_table: &str,
        fk_column: &str,
    ) -> MetadataResult<()> {
        let entry = (
            table.to_string(),
            related_table.to_string(),
            fk_column.to_string(),
        );
        let mut state = self.state();
        if !state.relationships.contains(&entry) {
            state.relationships.push(entry);
        }
        Ok(())
    }

    async fn run_graphql(&self, _request: &GraphqlRequest) -> MetadataResult<Value> {
        let delay = self.state().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.state().graphql_error.clone() {
            Some(message) => Err(MetadataError::GraphQl(message)),
            None => Ok(json!({ "data": { "__schema": { "queryType": { "name": "query_root" } } } })),
        }
    }

    fn service_info(&self) -> ServiceInfo {
        ServiceInfo {
            kind: "fake".to_string(),
            base_url: None,
            source: "default".to_string(),
            schema: "public".to_string(),
            admin_secret: "[HIDDEN]",
        }
    }
}

/// Reconciler over `fake` with default sync settings.
pub fn reconciler(fake: &Arc<FakeMetadata>, registry: ModelRegistry) -> Reconciler {
    reconciler_with(fake, registry, SyncSettings::default())
}

pub fn reconciler_with(
    fake: &Arc<FakeMetadata>,
    registry: ModelRegistry,
    settings: SyncSettings,
) -> Reconciler {
    let service: Arc<dyn MetadataService> = fake.clone();
    Reconciler::new(service, Arc::new(registry), &settings, "public")
}

/// Parse SQL with the Postgres dialect.
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL: {}\nSQL: {}", e, sql))
}

fn header(names: &[&str]) -> Vec<Option<String>> {
    names.iter().map(|n| Some(n.to_string())).collect()
}

fn missing_relation(name: &str) -> MetadataError {
    MetadataError::status(
        400,
        Some("postgres-error".to_string()),
        format!("relation \"{name}\" does not exist"),
    )
}

/// The text between `marker` and the next single quote.
fn literal_after(sql: &str, marker: &str) -> String {
    sql.split_once(marker)
        .and_then(|(_, rest)| rest.split_once('\''))
        .map(|(name, _)| name.to_string())
        .unwrap_or_default()
}

/// Split `"name" rest` into the unquoted name and the rest.
fn quoted(s: &str) -> (String, &str) {
    let s = s.trim_start();
    let inner = s.strip_prefix('"').unwrap_or(s);
    match inner.split_once('"') {
        Some((name, rest)) => (name.to_string(), rest),
        None => (inner.to_string(), ""),
    }
}

/// Split on commas outside parentheses and quotes.
fn split_top_level(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut in_single = false;
    let mut in_double = false;
    for c in body.chars() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '(' if !in_single && !in_double => depth += 1,
            ')' if !in_single && !in_double => depth -= 1,
            ',' if depth == 0 && !in_single && !in_double => {
                parts.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

const MODIFIERS: [&str; 5] = [" PRIMARY KEY", " UNIQUE", " NOT NULL", " DEFAULT ", " REFERENCES "];

/// Parse one generated column definition.
fn parse_column(def: &str) -> (ColumnDescriptor, Option<ForeignKeyInfo>) {
    let (name, rest) = quoted(def);
    let rest = rest.trim_start();
    let padded = format!(" {rest}");
    let type_end = MODIFIERS
        .iter()
        .filter_map(|m| padded.find(m))
        .min()
        .unwrap_or(padded.len());
    let data_type = padded[..type_end].trim().to_string();
    let nullable = !padded.contains(" NOT NULL") && !padded.contains(" PRIMARY KEY");

    let default_value = padded.split_once(" DEFAULT ").map(|(_, after)| {
        after
            .split_once(" REFERENCES ")
            .map(|(d, _)| d)
            .unwrap_or(after)
            .trim()
            .to_string()
    });

    let fk = padded.split_once(" REFERENCES ").map(|(_, target)| {
        let (table, rest) = quoted(target);
        let (column, _) = quoted(rest.trim_start_matches('('));
        ForeignKeyInfo {
            column: name.clone(),
            foreign_table: table,
            foreign_column: column,
        }
    });

    (
        ColumnDescriptor {
            name,
            data_type,
            nullable: if nullable {
                modelsync::metadata::Nullability::Yes
            } else {
                modelsync::metadata::Nullability::No
            },
            default_value,
        },
        fk,
    )
}
