//! The sync engine.
//!
//! - [`introspect`] - live table structure through the metadata service
//! - [`cache`] - TTL cache of introspected structures
//! - [`lock`] - per-table async locks
//! - [`reconciler`] - declared vs. live structure, corrective DDL, tracking
//! - [`report`] - per-action outcomes

pub mod cache;
pub mod introspect;
pub mod lock;
pub mod reconciler;
pub mod report;

pub use cache::StructureCache;
pub use introspect::StructureIntrospector;
pub use lock::{TableGuard, TableLocks};
pub use reconciler::{
    CreateModelRequest, ModelStatus, ReconcilePhase, Reconciler, UpdateModelRequest,
};
pub use report::{
    ActionKind, ActionOutcome, ActionStatus, FieldFailure, ReportStatus, SyncReport,
    ValidationReport,
};
