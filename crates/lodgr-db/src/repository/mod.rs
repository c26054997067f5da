//! SurrealDB repository implementations.

mod property;
mod reservation;
mod tenant;

pub use property::SurrealPropertyRepository;
pub use reservation::SurrealReservationRepository;
pub use tenant::SurrealTenantRepository;

use std::str::FromStr;

use rust_decimal::Decimal;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Attempts per write when the engine aborts on a transaction conflict.
pub(crate) const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

/// Parse a decimal rendered by `<string>`; some engine versions keep the
/// `dec` literal suffix.
pub(crate) fn parse_amount(value: &str) -> Result<Decimal, DbError> {
    let digits = value.trim().trim_end_matches("dec");
    Decimal::from_str(digits).map_err(|e| DbError::Decode(format!("invalid amount '{value}': {e}")))
}
