//! Lodgr Core — domain models, repository traits, error types and the
//! per-operation tenant context shared by every Lodgr crate.

pub mod context;
pub mod error;
pub mod models;
pub mod repository;

pub use context::{TenantContext, resolve_tenant_from_claims};
pub use error::{LodgrError, LodgrResult};
