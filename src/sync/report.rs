//! Per-action outcomes and operation reports.

use serde::Serialize;

use crate::error::SyncError;
use crate::metadata::ColumnDescriptor;

/// Kind of corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    CreateTable,
    AddColumn,
    CreateJunctionTable,
    TrackTable,
    CreateRelationship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionStatus {
    Applied,
    /// Nothing to do, or blocked by an earlier failure.
    Skipped,
    Failed,
}

/// Outcome of one corrective action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub action: ActionKind,
    /// `table` or `table.column`.
    pub target: String,
    pub status: ActionStatus,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl ActionOutcome {
    pub fn applied(action: ActionKind, target: impl Into<String>, sql: Option<String>) -> Self {
        Self {
            action,
            target: target.into(),
            status: ActionStatus::Applied,
            succeeded: true,
            error: None,
            detail: None,
            sql,
        }
    }

    pub fn skipped(action: ActionKind, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action,
            target: target.into(),
            status: ActionStatus::Skipped,
            succeeded: true,
            error: None,
            detail: Some(reason.into()),
            sql: None,
        }
    }

    /// Skipped because an action it depends on failed. Counts as unmet.
    pub fn blocked(action: ActionKind, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            ..Self::skipped(action, target, reason)
        }
    }

    pub fn failed(
        action: ActionKind,
        target: impl Into<String>,
        sql: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            action,
            target: target.into(),
            status: ActionStatus::Failed,
            succeeded: false,
            error: Some(error.into()),
            detail: None,
            sql,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == ActionStatus::Failed
    }
}

/// Overall result of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportStatus {
    /// No action failed.
    Complete,
    /// Some actions failed while others were applied or already in place.
    Partial,
    /// Nothing succeeded: every action failed or was blocked.
    Failed,
}

/// Report of `sync_model`, `create_model`, `update_model` and `track_table`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub table: String,
    pub status: ReportStatus,
    pub message: String,
    pub actions: Vec<ActionOutcome>,
    /// Live columns after the operation, in display order.
    pub columns: Vec<ColumnDescriptor>,
    /// Live columns that no declaration mentions. Never dropped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_columns: Vec<String>,
}

impl SyncReport {
    /// Summarize `actions` into a report.
    pub fn new(
        table: impl Into<String>,
        actions: Vec<ActionOutcome>,
        columns: Vec<ColumnDescriptor>,
        extra_columns: Vec<String>,
    ) -> Self {
        let table = table.into();
        let status = summarize(&actions);
        let failed = actions.iter().filter(|a| a.is_failed()).count();
        let applied = actions
            .iter()
            .filter(|a| a.status == ActionStatus::Applied)
            .count();
        let in_place = actions
            .iter()
            .filter(|a| a.status == ActionStatus::Skipped && a.succeeded)
            .count();
        let message = match status {
            ReportStatus::Complete if applied == 0 => format!("Table \"{table}\" is up to date"),
            ReportStatus::Complete => {
                format!("Table \"{table}\" synchronized ({applied} actions applied)")
            }
            ReportStatus::Partial => format!(
                "Table \"{table}\" partially synchronized: {applied} applied, {in_place} already in place, {failed} failed"
            ),
            ReportStatus::Failed => format!("Synchronizing table \"{table}\" failed"),
        };
        Self {
            table,
            status,
            message,
            actions,
            columns,
            extra_columns,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == ReportStatus::Complete
    }

    pub fn succeeded(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter(|a| a.status == ActionStatus::Applied)
            .map(describe)
            .collect()
    }

    pub fn failed(&self) -> Vec<String> {
        self.actions
            .iter()
            .filter(|a| a.is_failed())
            .map(describe)
            .collect()
    }

    /// SQL of the applied `CREATE TABLE`, if any.
    pub fn create_sql(&self) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.action == ActionKind::CreateTable)
            .and_then(|a| a.sql.as_deref())
    }

    /// `Ok` when complete; otherwise the matching error.
    pub fn into_result(self) -> Result<SyncReport, SyncError> {
        match self.status {
            ReportStatus::Complete => Ok(self),
            ReportStatus::Partial => Err(SyncError::PartialFailure {
                summary: self.message.clone(),
                succeeded: self.succeeded(),
                failed: self.failed(),
            }),
            ReportStatus::Failed => Err(SyncError::Upstream(
                self.actions
                    .iter()
                    .find_map(|a| a.error.clone())
                    .unwrap_or(self.message),
            )),
        }
    }
}

fn summarize(actions: &[ActionOutcome]) -> ReportStatus {
    let failed = actions.iter().any(|a| a.is_failed());
    let satisfied = actions.iter().any(|a| a.succeeded);
    match (failed, satisfied) {
        (false, _) => ReportStatus::Complete,
        (true, true) => ReportStatus::Partial,
        (true, false) => ReportStatus::Failed,
    }
}

fn describe(action: &ActionOutcome) -> String {
    let kind = match action.action {
        ActionKind::CreateTable => "create table",
        ActionKind::AddColumn => "add column",
        ActionKind::CreateJunctionTable => "create junction table",
        ActionKind::TrackTable => "track table",
        ActionKind::CreateRelationship => "create relationship",
    };
    format!("{kind} {}", action.target)
}

/// A standard field that could not be added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldFailure {
    pub field: String,
    pub error: String,
}

/// Report of `validate_structure`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub table: String,
    pub message: String,
    pub added_fields: Vec<String>,
    pub failed_fields: Vec<FieldFailure>,
    /// Live columns plus the ones just added.
    pub columns: Vec<ColumnDescriptor>,
}

impl ValidationReport {
    pub fn up_to_date(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            message: "Table structure is up to date".to_string(),
            added_fields: Vec::new(),
            failed_fields: Vec::new(),
            columns,
        }
    }

    pub(crate) fn finish(
        table: impl Into<String>,
        added_fields: Vec<String>,
        failed_fields: Vec<FieldFailure>,
        columns: Vec<ColumnDescriptor>,
    ) -> Self {
        let message = if failed_fields.is_empty() {
            format!("Added {} standard fields to the table", added_fields.len())
        } else {
            format!(
                "Added {} standard fields to the table, {} failed",
                added_fields.len(),
                failed_fields.len()
            )
        };
        Self {
            table: table.into(),
            message,
            added_fields,
            failed_fields,
            columns,
        }
    }

    pub fn is_up_to_date(&self) -> bool {
        self.added_fields.is_empty() && self.failed_fields.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.failed_fields.is_empty()
    }
}
