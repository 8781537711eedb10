//! # modelsync
//!
//! Declarative schema reconciliation for Hasura-backed Postgres databases.
//!
//! ## Architecture
//!
//! Abstract model descriptions are reconciled against the live schema, which
//! is reachable only through the administrative metadata API:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Boundary (axum API, CLI)                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Reconciler                              │
//! │  (introspect -> diff -> apply, per-table locks)          │
//! └─────────────────────────────────────────────────────────┘
//!          │                    │                   │
//!          ▼ [live]             ▼ [declared]        ▼ [ddl]
//! ┌────────────────┐  ┌──────────────────┐  ┌─────────────────┐
//! │  Introspector  │  │  ModelRegistry   │  │  DDL generator  │
//! │  + cache       │  │                  │  │  (token stream) │
//! └────────────────┘  └──────────────────┘  └─────────────────┘
//!          │                                         │
//!          ▼                                         ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │       MetadataService (run_sql, track, relationships)    │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod sql;
pub mod sync;

#[cfg(feature = "server")]
pub mod web;

pub use error::{SyncError, SyncResult};
pub use metadata::{ColumnDescriptor, HasuraClient, MetadataService};
pub use model::{ModelDefinition, ModelRegistry};
pub use sync::{Reconciler, SyncReport};
