//! Boundary HTTP API.
//!
//! JSON endpoints the admin console calls into: schema sync, structure
//! validation, raw SQL, table tracking and a guarded GraphQL proxy.

mod extract;
mod response;
mod server;
mod sync_api;

pub use response::{ApiError, ApiResult};
pub use server::*;
