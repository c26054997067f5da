//! Tenant domain model.
//!
//! Tenants are the root of isolation. Properties and reservations all
//! reference a tenant, directly or through their property.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LodgrError, LodgrResult};

/// An isolated customer or organization owning a disjoint set of
/// properties and reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Caller-chosen identity token (e.g., `acme`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub id: String,
    pub name: String,
}

impl CreateTenant {
    pub fn validate(&self) -> LodgrResult<()> {
        if self.id.trim().is_empty() {
            return Err(LodgrError::validation("tenant id must not be blank"));
        }
        if self.name.trim().is_empty() {
            return Err(LodgrError::validation("tenant name must not be blank"));
        }
        Ok(())
    }
}
