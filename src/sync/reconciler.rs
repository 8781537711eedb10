//! The schema reconciler.
//!
//! Each operation runs `Introspecting -> Diffing -> Applying` while holding
//! the locks of every table it may alter. Validation failures abort before
//! any SQL is sent. Once applying starts, each corrective action is
//! attempted independently and recorded in the [`SyncReport`]; nothing is
//! rolled back.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::introspect::StructureIntrospector;
use super::lock::TableLocks;
use super::report::{ActionKind, ActionOutcome, FieldFailure, SyncReport, ValidationReport};
use super::cache::StructureCache;
use crate::config::SyncSettings;
use crate::error::{SyncError, SyncResult};
use crate::metadata::{ColumnDescriptor, MetadataService, TabularResult, TrackOutcome};
use crate::model::column::{foreign_key_column_for, lower_columns};
use crate::model::definition::synthetic_primary_key;
use crate::model::registry::SYNTHETIC_KEY;
use crate::model::{
    display_order, Column, ColumnKind, ColumnSpec, FieldType, ModelDefinition, ModelRegistry,
    RelationType, StandardField,
};
use crate::sql::generator::{
    add_column_sql, create_junction_table_sql_typed, create_table_sql_for, inbound_fk_column,
    junction_key_columns, junction_table_name, with_standard_fields,
};
use crate::sql::ident::validate_identifier;

/// Reconciliation phase, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    Idle,
    Introspecting,
    Diffing,
    Applying,
}

fn enter(table: &str, phase: ReconcilePhase) {
    debug!(table = %table, phase = ?phase, "reconcile phase");
}

/// Ad-hoc table creation from the console.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModelRequest {
    #[serde(alias = "tableName")]
    pub model_name: String,
    #[serde(default, alias = "columns")]
    pub fields: Vec<ColumnSpec>,
    /// Client-rendered DDL. Recorded, never executed.
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub infer_relations: bool,
}

/// Column additions to an existing table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModelRequest {
    pub table_name: String,
    #[serde(default, alias = "fields")]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub infer_relations: bool,
}

/// A registered model and whether its table exists.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    #[serde(flatten)]
    pub model: ModelDefinition,
    pub exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Create the table when absent, add missing columns otherwise.
    Create,
    /// The table must exist; only columns are added.
    Update,
}

/// A foreign key column that belongs on another table.
struct RemoteKey {
    table: String,
    column: Column,
    /// From another registered model; a missing table is not a failure.
    from_registry: bool,
}

/// A relationship to create once tables are tracked.
struct PendingRelationship {
    table: String,
    related_table: String,
    fk_column: String,
}

/// Live structures looked up during one operation.
#[derive(Default)]
struct LiveTables {
    seen: HashMap<String, Option<Vec<ColumnDescriptor>>>,
}

impl LiveTables {
    async fn get(
        &mut self,
        introspector: &StructureIntrospector,
        table: &str,
    ) -> SyncResult<Option<Vec<ColumnDescriptor>>> {
        if let Some(found) = self.seen.get(table) {
            return Ok(found.clone());
        }
        let found = introspector.try_fetch(table).await?;
        self.seen.insert(table.to_string(), found.clone());
        Ok(found)
    }

    fn forget(&mut self, table: &str) {
        self.seen.remove(table);
    }
}

fn has_column(columns: &[ColumnDescriptor], name: &str) -> bool {
    columns.iter().any(|c| c.name.eq_ignore_ascii_case(name))
}

/// Type of a table's `id` column, defaulting to uuid.
fn key_type(columns: &[ColumnDescriptor]) -> FieldType {
    columns
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(SYNTHETIC_KEY))
        .map(|c| FieldType::parse(&c.data_type))
        .unwrap_or(FieldType::Uuid)
}

/// Reconciles declared structure against the live database.
pub struct Reconciler {
    service: Arc<dyn MetadataService>,
    registry: Arc<ModelRegistry>,
    introspector: StructureIntrospector,
    locks: TableLocks,
    standard_fields: bool,
}

impl Reconciler {
    pub fn new(
        service: Arc<dyn MetadataService>,
        registry: Arc<ModelRegistry>,
        settings: &SyncSettings,
        schema: impl Into<String>,
    ) -> Self {
        let cache = if settings.cache_enabled {
            StructureCache::new(settings.cache_ttl())
        } else {
            StructureCache::disabled()
        };
        Self {
            introspector: StructureIntrospector::new(Arc::clone(&service), cache, schema),
            service,
            registry,
            locks: TableLocks::new(settings.lock_timeout()),
            standard_fields: settings.standard_fields,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn service(&self) -> &Arc<dyn MetadataService> {
        &self.service
    }

    pub fn introspector(&self) -> &StructureIntrospector {
        &self.introspector
    }

    /// Execute raw SQL. The whole structure cache is dropped afterwards.
    pub async fn run_sql(&self, sql: &str) -> SyncResult<TabularResult> {
        let result = self.service.run_sql(sql).await;
        self.introspector.cache().clear();
        Ok(result?)
    }

    /// Live columns of `table`, served from the cache when fresh.
    pub async fn get_table_structure(&self, table: &str) -> SyncResult<Vec<ColumnDescriptor>> {
        self.introspector.get_table_structure(table).await
    }

    pub async fn list_tables(&self) -> SyncResult<Vec<String>> {
        self.introspector.list_tables().await
    }

    /// Registered models with an `exists` flag each.
    pub async fn model_statuses(&self) -> SyncResult<Vec<ModelStatus>> {
        let tables: HashSet<String> = self.list_tables().await?.into_iter().collect();
        Ok(self
            .registry
            .all_models()
            .iter()
            .map(|m| ModelStatus {
                exists: tables.contains(&m.name),
                model: m.clone(),
            })
            .collect())
    }

    /// Add the standard fields `table` is missing.
    ///
    /// Each field is added by its own statement; one failing does not stop
    /// the others.
    pub async fn validate_structure(&self, table: &str) -> SyncResult<ValidationReport> {
        validate_identifier(table)?;
        let _guard = self.locks.acquire(table).await?;

        enter(table, ReconcilePhase::Introspecting);
        let live = self.introspector.fetch_table_structure(table).await?;

        enter(table, ReconcilePhase::Diffing);
        let missing = StandardField::missing_from(&live);
        if missing.is_empty() {
            enter(table, ReconcilePhase::Idle);
            return Ok(ValidationReport::up_to_date(table, live));
        }

        enter(table, ReconcilePhase::Applying);
        let mut columns = live;
        let mut added = Vec::new();
        let mut failed = Vec::new();
        for field in missing {
            let sql = add_column_sql(table, &Column::standard(field))?;
            match self.service.run_sql(&sql).await {
                Ok(_) => {
                    info!(table = %table, field = %field, "added standard field");
                    added.push(field.name().to_string());
                    columns.push(field.descriptor());
                }
                Err(e) => {
                    warn!(table = %table, field = %field, error = %e, "failed to add standard field");
                    failed.push(FieldFailure {
                        field: field.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        self.introspector.cache().refresh(table, columns.clone());

        enter(table, ReconcilePhase::Idle);
        Ok(ValidationReport::finish(table, added, failed, columns))
    }

    /// Reconcile one registered model.
    pub async fn sync_model(&self, name: &str) -> SyncResult<SyncReport> {
        let model = self
            .registry
            .get_model(name)
            .ok_or_else(|| SyncError::model_not_found(name))?;
        let columns: Vec<Column> = model.fields.iter().map(Column::from_field).collect();
        let inbound = self
            .registry
            .inbound_references(&model.name)
            .into_iter()
            .filter_map(|(referrer, field)| {
                referrer
                    .fields
                    .iter()
                    .find(|f| f.name == field)
                    .map(|f| RemoteKey {
                        table: referrer.name.clone(),
                        column: Column::from_field(f),
                        from_registry: true,
                    })
            })
            .collect();
        self.reconcile(&model.name, columns, inbound, Mode::Create)
            .await
    }

    /// Reconcile every registered model, referenced models first.
    pub async fn sync_all_models(&self) -> SyncResult<Vec<SyncReport>> {
        let names: Vec<String> = self
            .registry
            .dependency_order()
            .into_iter()
            .map(|m| m.name.clone())
            .collect();
        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            reports.push(self.sync_model(&name).await?);
        }
        Ok(reports)
    }

    /// Create a table from an ad-hoc column list.
    ///
    /// A list without a primary key gets the synthetic `id`. Standard fields
    /// are appended when enabled in settings.
    pub async fn create_model(&self, request: CreateModelRequest) -> SyncResult<SyncReport> {
        let table = validate_identifier(&request.model_name)?.to_string();
        if request.sql.is_some() {
            debug!(table = %table, "ignoring client-supplied sql");
        }
        let known = self.known_tables(request.infer_relations).await?;
        let mut columns = lower_columns(request.fields, request.infer_relations, &known)?;

        if !columns.iter().any(Column::is_primary_key) {
            if columns
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(SYNTHETIC_KEY))
            {
                return Err(SyncError::InvalidModel(format!(
                    "table \"{table}\" declares \"{SYNTHETIC_KEY}\" without making it the primary key"
                )));
            }
            columns.insert(0, Column::plain(SYNTHETIC_KEY, synthetic_primary_key()));
        }
        if self.standard_fields {
            columns = with_standard_fields(columns);
        }

        self.reconcile(&table, columns, Vec::new(), Mode::Create)
            .await
    }

    /// Add columns and relations to an existing table.
    pub async fn update_model(&self, request: UpdateModelRequest) -> SyncResult<SyncReport> {
        let table = validate_identifier(&request.table_name)?.to_string();
        let known = self.known_tables(request.infer_relations).await?;
        let columns = lower_columns(request.columns, request.infer_relations, &known)?;
        if columns.is_empty() {
            return Err(SyncError::InvalidModel(format!(
                "no columns given for table \"{table}\""
            )));
        }
        self.reconcile(&table, columns, Vec::new(), Mode::Update)
            .await
    }

    /// Track an existing table and create relationships for its foreign keys.
    pub async fn track_table(&self, table: &str) -> SyncResult<SyncReport> {
        validate_identifier(table)?;
        let _guard = self.locks.acquire(table).await?;

        enter(table, ReconcilePhase::Introspecting);
        let columns = self
            .introspector
            .try_fetch(table)
            .await?
            .ok_or_else(|| SyncError::table_not_found(table))?;
        let foreign_keys = self.introspector.foreign_keys(table).await?;

        enter(table, ReconcilePhase::Applying);
        let mut actions = vec![self.track(table).await];
        if !actions[0].is_failed() {
            for fk in foreign_keys {
                let pending = PendingRelationship {
                    table: table.to_string(),
                    related_table: fk.foreign_table,
                    fk_column: fk.column,
                };
                actions.push(self.relate(&pending).await);
            }
        }

        enter(table, ReconcilePhase::Idle);
        Ok(SyncReport::new(
            table,
            actions,
            display_order(&columns),
            Vec::new(),
        ))
    }

    async fn known_tables(&self, needed: bool) -> SyncResult<Vec<String>> {
        if needed {
            self.list_tables().await
        } else {
            Ok(Vec::new())
        }
    }

    async fn reconcile(
        &self,
        table: &str,
        columns: Vec<Column>,
        inbound: Vec<RemoteKey>,
        mode: Mode,
    ) -> SyncResult<SyncReport> {
        validate_identifier(table)?;

        // Partition. Everything that can fail validation does so here.
        let mut local = Vec::new();
        let mut local_fks = Vec::new();
        let mut remote = inbound;
        let mut junctions = Vec::new();
        let positions: HashMap<String, usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_ascii_lowercase(), i))
            .collect();
        for column in columns {
            match &column.kind {
                ColumnKind::Relation(rel) if rel.cardinality.is_local_fk() => local_fks.push(column),
                ColumnKind::Relation(rel) if rel.cardinality == RelationType::OneToMany => {
                    validate_identifier(&rel.table)?;
                    let fk = foreign_key_column_for(table);
                    validate_identifier(&fk)?;
                    remote.push(RemoteKey {
                        table: rel.table.clone(),
                        column: inbound_fk_column(table, &fk, FieldType::Uuid),
                        from_registry: false,
                    });
                }
                ColumnKind::Relation(rel) => {
                    validate_identifier(&rel.table)?;
                    let name = junction_table_name(table, &rel.table);
                    validate_identifier(&name)?;
                    if !junctions.iter().any(|(_, n): &(String, String)| n == &name) {
                        junctions.push((rel.table.clone(), name));
                    }
                }
                _ => local.push(column),
            }
        }
        if mode == Mode::Create {
            create_table_sql_for(table, &local)?;
        }
        for column in &local_fks {
            add_column_sql(table, column)?;
        }

        let mut touched: Vec<String> = vec![table.to_string()];
        touched.extend(remote.iter().map(|r| r.table.clone()));
        touched.extend(junctions.iter().map(|(_, n)| n.clone()));
        touched.sort();
        touched.dedup();
        let _guards = self.locks.acquire_many(touched.iter().map(String::as_str)).await?;

        enter(table, ReconcilePhase::Introspecting);
        let mut live = LiveTables::default();
        let existing = live.get(&self.introspector, table).await?;
        if mode == Mode::Update && existing.is_none() {
            return Err(SyncError::table_not_found(table));
        }

        enter(table, ReconcilePhase::Diffing);
        let mut present: HashSet<String> = existing
            .iter()
            .flatten()
            .map(|c| c.name.to_ascii_lowercase())
            .collect();

        // Local keys whose target already exists go into CREATE TABLE.
        let mut inline_fks = Vec::new();
        let mut deferred_fks = Vec::new();
        for column in local_fks {
            let target = column.as_relation().map(|r| r.table.clone()).unwrap_or_default();
            let inline = existing.is_none()
                && (target == table
                    || matches!(live.get(&self.introspector, &target).await, Ok(Some(_))));
            if inline {
                inline_fks.push(column);
            } else {
                deferred_fks.push(column);
            }
        }

        enter(table, ReconcilePhase::Applying);
        let mut actions = Vec::new();
        let mut relationships = Vec::new();
        let mut blocked = false;

        match &existing {
            None => {
                let mut create_columns = local.clone();
                create_columns.extend(inline_fks.iter().cloned());
                create_columns.sort_by_key(|c| positions.get(&c.name.to_ascii_lowercase()).copied());
                let sql = create_table_sql_for(table, &create_columns)?;
                let outcome = self.apply(ActionKind::CreateTable, table, sql).await;
                blocked = outcome.is_failed();
                if !blocked {
                    present.extend(create_columns.iter().map(|c| c.name.to_ascii_lowercase()));
                    for column in &inline_fks {
                        if let Some(rel) = column.as_relation() {
                            relationships.push(PendingRelationship {
                                table: table.to_string(),
                                related_table: rel.table.clone(),
                                fk_column: column.name.clone(),
                            });
                        }
                    }
                }
                live.forget(table);
                actions.push(outcome);
            }
            Some(_) => {
                for column in &local {
                    let target = format!("{table}.{}", column.name);
                    if present.contains(&column.name.to_ascii_lowercase()) {
                        actions.push(ActionOutcome::skipped(ActionKind::AddColumn, target, "already present"));
                        continue;
                    }
                    let sql = add_column_sql(table, column)?;
                    let outcome = self.apply(ActionKind::AddColumn, target, sql).await;
                    if !outcome.is_failed() {
                        present.insert(column.name.to_ascii_lowercase());
                    }
                    actions.push(outcome);
                }
                live.forget(table);
            }
        }

        for column in &deferred_fks {
            let Some(rel) = column.as_relation() else { continue };
            let target = format!("{table}.{}", column.name);
            if blocked {
                actions.push(ActionOutcome::blocked(ActionKind::AddColumn, target, "blocked by failed create table"));
                continue;
            }
            if present.contains(&column.name.to_ascii_lowercase()) {
                actions.push(ActionOutcome::skipped(ActionKind::AddColumn, target, "already present"));
                relationships.push(PendingRelationship {
                    table: table.to_string(),
                    related_table: rel.table.clone(),
                    fk_column: column.name.clone(),
                });
                continue;
            }
            let parent_exists = rel.table == table
                || match live.get(&self.introspector, &rel.table).await {
                    Ok(found) => found.is_some(),
                    Err(e) => {
                        actions.push(ActionOutcome::failed(ActionKind::AddColumn, target, None, e.to_string()));
                        continue;
                    }
                };
            if !parent_exists {
                let reason = format!("referenced table \"{}\" does not exist", rel.table);
                if self.registry.contains(&rel.table) {
                    debug!(table = %table, column = %column.name, parent = %rel.table, "foreign key deferred");
                    actions.push(ActionOutcome::skipped(
                        ActionKind::AddColumn,
                        target,
                        format!("{reason}; added when \"{}\" is synced", rel.table),
                    ));
                } else {
                    warn!(table = %table, column = %column.name, parent = %rel.table, "referenced table missing");
                    actions.push(ActionOutcome::failed(ActionKind::AddColumn, target, None, reason));
                }
                continue;
            }
            let sql = add_column_sql(table, column)?;
            let outcome = self.apply(ActionKind::AddColumn, target, sql).await;
            if !outcome.is_failed() {
                present.insert(column.name.to_ascii_lowercase());
                relationships.push(PendingRelationship {
                    table: table.to_string(),
                    related_table: rel.table.clone(),
                    fk_column: column.name.clone(),
                });
            }
            actions.push(outcome);
        }

        // Keys that live on other tables and point here.
        let own_key = if blocked {
            FieldType::Uuid
        } else {
            match live.get(&self.introspector, table).await {
                Ok(Some(columns)) => key_type(&columns),
                _ => FieldType::Uuid,
            }
        };
        for mut key in remote {
            let target = format!("{}.{}", key.table, key.column.name);
            if blocked {
                actions.push(ActionOutcome::blocked(ActionKind::AddColumn, target, "blocked by failed create table"));
                continue;
            }
            let columns = match live.get(&self.introspector, &key.table).await {
                Ok(Some(columns)) => columns,
                Ok(None) if key.from_registry => {
                    actions.push(ActionOutcome::skipped(
                        ActionKind::AddColumn,
                        target,
                        format!("table \"{}\" does not exist yet", key.table),
                    ));
                    continue;
                }
                Ok(None) => {
                    actions.push(ActionOutcome::failed(
                        ActionKind::AddColumn,
                        target,
                        None,
                        format!("related table \"{}\" does not exist", key.table),
                    ));
                    continue;
                }
                Err(e) => {
                    actions.push(ActionOutcome::failed(ActionKind::AddColumn, target, None, e.to_string()));
                    continue;
                }
            };
            let pending = PendingRelationship {
                table: key.table.clone(),
                related_table: table.to_string(),
                fk_column: key.column.name.clone(),
            };
            if has_column(&columns, &key.column.name) {
                actions.push(ActionOutcome::skipped(ActionKind::AddColumn, target, "already present"));
                relationships.push(pending);
                continue;
            }
            if !key.from_registry {
                if let ColumnKind::Relation(rel) = &mut key.column.kind {
                    rel.field_type = own_key;
                }
            }
            let sql = add_column_sql(&key.table, &key.column)?;
            let outcome = self.apply(ActionKind::AddColumn, target, sql).await;
            if !outcome.is_failed() {
                relationships.push(pending);
            }
            live.forget(&key.table);
            actions.push(outcome);
        }

        // Junction tables.
        let mut to_track: Vec<String> = Vec::new();
        if !blocked {
            to_track.push(table.to_string());
        }
        for (other, name) in &junctions {
            if blocked {
                actions.push(ActionOutcome::blocked(ActionKind::CreateJunctionTable, name.as_str(), "blocked by failed create table"));
                continue;
            }
            let other_columns = match live.get(&self.introspector, other).await {
                Ok(Some(columns)) => columns,
                Ok(None) => {
                    actions.push(ActionOutcome::failed(
                        ActionKind::CreateJunctionTable,
                        name.as_str(),
                        None,
                        format!("related table \"{other}\" does not exist"),
                    ));
                    continue;
                }
                Err(e) => {
                    actions.push(ActionOutcome::failed(ActionKind::CreateJunctionTable, name.as_str(), None, e.to_string()));
                    continue;
                }
            };
            let (left, right) = junction_key_columns(table, other);
            let exists = match live.get(&self.introspector, name).await {
                Ok(found) => found.is_some(),
                Err(e) => {
                    actions.push(ActionOutcome::failed(ActionKind::CreateJunctionTable, name.as_str(), None, e.to_string()));
                    continue;
                }
            };
            if exists {
                actions.push(ActionOutcome::skipped(ActionKind::CreateJunctionTable, name.as_str(), "already exists"));
            } else {
                let sql = create_junction_table_sql_typed(table, own_key, other, key_type(&other_columns))?;
                let outcome = self.apply(ActionKind::CreateJunctionTable, name.as_str(), sql).await;
                let failed = outcome.is_failed();
                actions.push(outcome);
                if failed {
                    continue;
                }
            }
            to_track.push(name.clone());
            relationships.push(PendingRelationship {
                table: name.clone(),
                related_table: table.to_string(),
                fk_column: left,
            });
            relationships.push(PendingRelationship {
                table: name.clone(),
                related_table: other.clone(),
                fk_column: right,
            });
        }

        // Tracking failures never undo DDL.
        let mut untracked = HashSet::new();
        for name in &to_track {
            let outcome = self.track(name).await;
            if outcome.is_failed() {
                untracked.insert(name.as_str());
            }
            actions.push(outcome);
        }
        for pending in &relationships {
            if untracked.contains(pending.table.as_str()) {
                actions.push(ActionOutcome::blocked(
                    ActionKind::CreateRelationship,
                    format!("{}.{}", pending.table, pending.fk_column),
                    format!("table \"{}\" is not tracked", pending.table),
                ));
                continue;
            }
            actions.push(self.relate(pending).await);
        }

        // Refresh the cache for every touched table.
        let mut final_columns = Vec::new();
        for name in &touched {
            match self.introspector.fetch_table_structure(name).await {
                Ok(columns) if name == table => final_columns = columns,
                Ok(_) => {}
                Err(SyncError::NotFound(_)) => {}
                Err(e) => warn!(table = %name, error = %e, "failed to refresh structure"),
            }
        }

        // An update names only the columns it adds, so extras are reported
        // for full declarations only.
        let extra_columns = match mode {
            Mode::Create => final_columns
                .iter()
                .filter(|c| {
                    !positions.contains_key(&c.name.to_ascii_lowercase())
                        && !StandardField::is_standard(&c.name)
                })
                .map(|c| c.name.clone())
                .collect(),
            Mode::Update => Vec::new(),
        };

        let report = SyncReport::new(table, actions, display_order(&final_columns), extra_columns);
        info!(table = %table, status = ?report.status, "reconciliation finished");
        enter(table, ReconcilePhase::Idle);
        Ok(report)
    }

    async fn apply(&self, kind: ActionKind, target: impl Into<String>, sql: String) -> ActionOutcome {
        let target = target.into();
        match self.service.run_sql(&sql).await {
            Ok(_) => {
                info!(target = %target, action = ?kind, "applied");
                ActionOutcome::applied(kind, target, Some(sql))
            }
            Err(e) => {
                warn!(target = %target, action = ?kind, error = %e, "action failed");
                ActionOutcome::failed(kind, target, Some(sql), e.to_string())
            }
        }
    }

    async fn track(&self, table: &str) -> ActionOutcome {
        match self.service.track_table(table).await {
            Ok(TrackOutcome::Tracked(shape)) => {
                ActionOutcome::applied(ActionKind::TrackTable, table, None)
                    .with_detail(format!("tracked with {shape:?}"))
            }
            Ok(TrackOutcome::AlreadyTracked) => {
                ActionOutcome::skipped(ActionKind::TrackTable, table, "already tracked")
            }
            Err(e) => {
                warn!(table = %table, error = %e, "tracking failed");
                ActionOutcome::failed(ActionKind::TrackTable, table, None, e.to_string())
            }
        }
    }

    async fn relate(&self, pending: &PendingRelationship) -> ActionOutcome {
        let target = format!("{}.{}", pending.table, pending.fk_column);
        match self
            .service
            .create_relationship(&pending.table, &pending.related_table, &pending.fk_column)
            .await
        {
            Ok(()) => ActionOutcome::applied(ActionKind::CreateRelationship, target, None),
            Err(e) => {
                warn!(table = %pending.table, column = %pending.fk_column, error = %e, "relationship failed");
                ActionOutcome::failed(ActionKind::CreateRelationship, target, None, e.to_string())
            }
        }
    }
}
