//! SurrealDB implementation of [`ReservationRepository`].
//!
//! Reservations are append-only. The insert statement checks, in order,
//! that the tenant exists, that the property exists and that the
//! property belongs to the same tenant, then creates the row; all of it
//! commits as one statement.

use chrono::{DateTime, Utc};
use lodgr_core::context::TenantContext;
use lodgr_core::error::{LodgrError, LodgrResult};
use lodgr_core::models::reservation::{CreateReservation, Reservation, ReservationAmount};
use lodgr_core::models::revenue::RevenueSummary;
use lodgr_core::repository::{PaginatedResult, Pagination, ReservationRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{CountRow, MAX_WRITE_ATTEMPTS, parse_amount, parse_uuid};
use crate::error::{CROSS_TENANT, DbError, MISSING_PARENT};

/// Projection for reservation reads. Decimals are read back as strings.
const RESERVATION_FIELDS: &str = "meta::id(id) AS record_id, property_id, tenant_id, \
     check_in_date, check_out_date, <string> total_amount AS total_amount, \
     currency, created_at";

#[derive(Debug, SurrealValue)]
struct CreatedRow {
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ReservationRowWithId {
    record_id: String,
    property_id: String,
    tenant_id: String,
    check_in_date: DateTime<Utc>,
    check_out_date: DateTime<Utc>,
    total_amount: String,
    currency: String,
    created_at: DateTime<Utc>,
}

impl ReservationRowWithId {
    fn try_into_reservation(self) -> Result<Reservation, DbError> {
        Ok(Reservation {
            id: parse_uuid(&self.record_id, "reservation")?,
            property_id: parse_uuid(&self.property_id, "property")?,
            tenant_id: self.tenant_id,
            check_in: self.check_in_date,
            check_out: self.check_out_date,
            total_amount: parse_amount(&self.total_amount)?,
            currency: self.currency,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct AmountRow {
    currency: String,
    total_amount: String,
}

#[derive(Debug, SurrealValue)]
struct RecordIdRow {
    #[allow(dead_code)]
    record_id: String,
}

/// SurrealDB implementation of the Reservation repository.
#[derive(Clone)]
pub struct SurrealReservationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReservationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn insert(
        &self,
        id: Uuid,
        input: &CreateReservation,
        amount: &ReservationAmount,
    ) -> Result<CreatedRow, DbError> {
        let id_str = id.to_string();
        let query = format!(
            "IF !record::exists(type::record('tenant', $tenant_id)) {{ \
                THROW '{MISSING_PARENT}tenant:' + $tenant_id \
             }} ELSE IF !record::exists(type::record('property', $property_id)) {{ \
                THROW '{MISSING_PARENT}property:' + $property_id \
             }} ELSE IF (SELECT VALUE tenant_id FROM ONLY type::record('property', $property_id)) \
                != $tenant_id {{ \
                THROW '{CROSS_TENANT}property:' + $property_id \
             }} ELSE {{ \
                CREATE type::record('reservation', $id) SET \
                property_id = $property_id, \
                tenant_id = $tenant_id, \
                check_in_date = $check_in, \
                check_out_date = $check_out, \
                total_amount = <decimal> $total_amount, \
                currency = $currency \
             }}"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("tenant_id", input.tenant_id.clone()))
            .bind(("check_in", input.check_in))
            .bind(("check_out", input.check_out))
            .bind(("total_amount", amount.total_amount.to_string()))
            .bind(("currency", amount.currency.clone()))
            .await
            .map_err(|e| DbError::classify(e, "reservation", &id_str))?;

        let mut result = result
            .check()
            .map_err(|e| DbError::classify(e, "reservation", &id_str))?;

        let rows: Vec<CreatedRow> = result.take(0)?;
        rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "reservation".into(),
            id: id_str,
        })
    }

    /// Aggregate amounts of a visible property, optionally restricted to
    /// check-ins within `[from, to)`.
    async fn revenue(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> LodgrResult<RevenueSummary> {
        let not_found = || DbError::NotFound {
            entity: "property".into(),
            id: property_id.to_string(),
        };

        let Some(tenant_id) = ctx.tenant_id() else {
            warn!(property_id = %property_id, "Revenue query without tenant context");
            return Err(not_found().into());
        };

        let window_filter = if window.is_some() {
            "AND check_in_date >= $from AND check_in_date < $to"
        } else {
            ""
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id FROM type::record('property', $property_id) \
             WHERE tenant_id = $tenant_id; \
             SELECT currency, <string> total_amount AS total_amount FROM reservation \
             WHERE tenant_id = $tenant_id AND property_id = $property_id {window_filter}"
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("property_id", property_id.to_string()));
        if let Some((from, to)) = window {
            builder = builder.bind(("from", from)).bind(("to", to));
        }

        let mut result = builder.await.map_err(DbError::from)?;

        let property: Vec<RecordIdRow> = result.take(0).map_err(DbError::from)?;
        if property.is_empty() {
            return Err(not_found().into());
        }

        let rows: Vec<AmountRow> = result.take(1).map_err(DbError::from)?;
        let mut summary = RevenueSummary::empty(tenant_id, property_id);
        for row in rows {
            summary.add(&row.currency, parse_amount(&row.total_amount)?);
        }

        debug!(
            tenant_id = %tenant_id,
            property_id = %property_id,
            reservations = summary.reservation_count,
            "Revenue aggregated"
        );
        Ok(summary)
    }
}

impl<C: Connection> ReservationRepository for SurrealReservationRepository<C> {
    async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateReservation,
    ) -> LodgrResult<Reservation> {
        ctx.authorize_write(&input.tenant_id)?;
        let amount = input.validate()?;
        let id = Uuid::new_v4();

        let mut attempt = 1;
        let row = loop {
            match self.insert(id, &input, &amount).await {
                Err(DbError::Conflict(reason)) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, %reason, "Reservation insert conflicted, retrying");
                    attempt += 1;
                }
                other => break other?,
            }
        };

        info!(
            tenant_id = %input.tenant_id,
            property_id = %input.property_id,
            reservation_id = %id,
            "Reservation created"
        );
        Ok(Reservation {
            id,
            property_id: input.property_id,
            tenant_id: input.tenant_id,
            check_in: input.check_in,
            check_out: input.check_out,
            total_amount: amount.total_amount,
            currency: amount.currency,
            created_at: row.created_at,
        })
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> LodgrResult<Reservation> {
        let not_found = || DbError::NotFound {
            entity: "reservation".into(),
            id: id.to_string(),
        };

        let Some(tenant_id) = ctx.tenant_id() else {
            warn!(reservation_id = %id, "Reservation lookup without tenant context");
            return Err(not_found().into());
        };

        let query = format!(
            "SELECT {RESERVATION_FIELDS} FROM type::record('reservation', $id) \
             WHERE tenant_id = $tenant_id"
        );
        let mut result = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReservationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(not_found)?;

        Ok(row.try_into_reservation()?)
    }

    async fn list_by_property(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        pagination: Pagination,
    ) -> LodgrResult<PaginatedResult<Reservation>> {
        let Some(tenant_id) = ctx.tenant_id() else {
            warn!(property_id = %property_id, "Reservation listing without tenant context");
            return Ok(PaginatedResult::empty(&pagination));
        };

        let query = format!(
            "SELECT count() AS total FROM reservation \
             WHERE tenant_id = $tenant_id AND property_id = $property_id GROUP ALL; \
             SELECT {RESERVATION_FIELDS} FROM reservation \
             WHERE tenant_id = $tenant_id AND property_id = $property_id \
             ORDER BY check_in_date ASC \
             LIMIT $limit START $offset"
        );
        let mut result = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("property_id", property_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<ReservationRowWithId> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ReservationRowWithId::try_into_reservation)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_overlapping(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LodgrResult<Vec<Reservation>> {
        if to <= from {
            return Err(LodgrError::validation(format!(
                "window end {to} must be after start {from}"
            )));
        }
        let Some(tenant_id) = ctx.tenant_id() else {
            warn!(property_id = %property_id, "Availability query without tenant context");
            return Ok(Vec::new());
        };

        let query = format!(
            "SELECT {RESERVATION_FIELDS} FROM reservation \
             WHERE tenant_id = $tenant_id AND property_id = $property_id \
             AND check_in_date < $to AND check_out_date > $from \
             ORDER BY check_in_date ASC"
        );
        let mut result = self
            .db
            .query(query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("property_id", property_id.to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReservationRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(ReservationRowWithId::try_into_reservation)
            .collect::<Result<Vec<_>, DbError>>()
            .map_err(Into::into)
    }

    async fn revenue_summary(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
    ) -> LodgrResult<RevenueSummary> {
        self.revenue(ctx, property_id, None).await
    }

    async fn revenue_between(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LodgrResult<RevenueSummary> {
        if to <= from {
            return Err(LodgrError::validation(format!(
                "window end {to} must be after start {from}"
            )));
        }
        self.revenue(ctx, property_id, Some((from, to))).await
    }
}
