//! Revenue aggregates over reservations.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::reservation::AMOUNT_SCALE;

/// Revenue of one property, per currency.
///
/// Amounts in different currencies are kept apart; they are never
/// summed together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub tenant_id: String,
    pub property_id: Uuid,
    /// Currency code to total amount.
    pub totals: BTreeMap<String, Decimal>,
    pub reservation_count: u64,
}

impl RevenueSummary {
    pub fn empty(tenant_id: impl Into<String>, property_id: Uuid) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            property_id,
            totals: BTreeMap::new(),
            reservation_count: 0,
        }
    }

    /// Add one reservation's amount.
    pub fn add(&mut self, currency: &str, amount: Decimal) {
        *self
            .totals
            .entry(currency.to_string())
            .or_insert(Decimal::ZERO) += amount;
        self.reservation_count += 1;
    }

    /// Total for `currency` with two fractional digits; `0.00` if the
    /// property has no revenue in that currency.
    pub fn total_for(&self, currency: &str) -> Decimal {
        let mut total = self.totals.get(currency).copied().unwrap_or(Decimal::ZERO);
        total.rescale(AMOUNT_SCALE);
        total
    }
}
