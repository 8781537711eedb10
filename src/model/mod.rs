//! Declarative model types and the model registry.

pub mod column;
pub mod definition;
pub mod field;
pub mod registry;
pub mod standard;

pub use column::{Column, ColumnKind, ColumnSpec, Relation, RelationType};
pub use definition::{Field, ModelDefinition};
pub use field::{FieldDefinition, FieldType, Reference};
pub use registry::{builtin_models, ModelRegistry};
pub use standard::{display_order, StandardField};
