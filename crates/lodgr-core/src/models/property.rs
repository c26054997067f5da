//! Property domain model.
//!
//! A property is a bookable unit owned by exactly one tenant. Its
//! `property_code` is only unique within that tenant: two tenants may
//! both have a property "101".

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LodgrError, LodgrResult};

/// Timezone assigned to a property when none is given.
pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: String,
    /// Tenant-scoped human-facing code (e.g., `101`).
    pub property_code: String,
    pub name: String,
    /// IANA timezone name used for local-time reporting.
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl Property {
    /// Parsed timezone of this property.
    pub fn tz(&self) -> LodgrResult<Tz> {
        parse_timezone(&self.timezone)
    }
}

/// Fields required to create a new property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProperty {
    pub tenant_id: String,
    pub property_code: String,
    pub name: String,
    /// Defaults to [`DEFAULT_TIMEZONE`].
    pub timezone: Option<String>,
}

impl CreateProperty {
    /// Validates the input and returns the effective timezone.
    pub fn validate(&self) -> LodgrResult<String> {
        if self.property_code.trim().is_empty() {
            return Err(LodgrError::validation("property code must not be blank"));
        }
        if self.name.trim().is_empty() {
            return Err(LodgrError::validation("property name must not be blank"));
        }
        let timezone = self
            .timezone
            .clone()
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        parse_timezone(&timezone)?;
        Ok(timezone)
    }
}

pub fn parse_timezone(name: &str) -> LodgrResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| LodgrError::validation(format!("unknown timezone: {name}")))
}
