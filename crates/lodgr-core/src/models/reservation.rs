//! Reservation domain model.
//!
//! Reservations are append-only booking records. They carry the tenant
//! redundantly next to the property so that isolation filters never need
//! to join through `property`.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LodgrError, LodgrResult};

/// Currency assigned to a reservation when none is given.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Fractional digits kept for monetary amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Total significant digits allowed for monetary amounts (NUMERIC(10,2)).
pub const AMOUNT_PRECISION: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// Whether this stay intersects the half-open window `[from, to)`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.check_in < to && self.check_out > from
    }
}

/// Fields required to create a new reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservation {
    pub property_id: Uuid,
    pub tenant_id: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub total_amount: Decimal,
    /// Defaults to [`DEFAULT_CURRENCY`].
    pub currency: Option<String>,
}

/// Amount and currency after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationAmount {
    pub total_amount: Decimal,
    pub currency: String,
}

impl CreateReservation {
    /// Checks the stay dates and normalizes amount and currency.
    pub fn validate(&self) -> LodgrResult<ReservationAmount> {
        if self.check_out <= self.check_in {
            return Err(LodgrError::validation(format!(
                "check-out {} must be after check-in {}",
                self.check_out, self.check_in
            )));
        }
        Ok(ReservationAmount {
            total_amount: normalize_amount(self.total_amount)?,
            currency: normalize_currency(self.currency.as_deref())?,
        })
    }
}

/// Rounds to two fractional digits and rejects values that do not fit
/// NUMERIC(10,2).
pub fn normalize_amount(amount: Decimal) -> LodgrResult<Decimal> {
    let mut rounded =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let limit = Decimal::from(10_i64.pow(AMOUNT_PRECISION - AMOUNT_SCALE));
    if rounded.abs() >= limit {
        return Err(LodgrError::validation(format!(
            "amount {amount} exceeds {AMOUNT_PRECISION} digits with {AMOUNT_SCALE} decimals"
        )));
    }
    rounded.rescale(AMOUNT_SCALE);
    Ok(rounded)
}

/// Three-letter alphabetic code, upper-cased. `None` yields the default.
pub fn normalize_currency(currency: Option<&str>) -> LodgrResult<String> {
    let code = currency.unwrap_or(DEFAULT_CURRENCY).trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(LodgrError::validation(format!(
            "invalid currency code: '{code}'"
        )));
    }
    Ok(code.to_ascii_uppercase())
}
