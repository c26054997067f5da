//! Revenue service — cached summaries and property-local monthly revenue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lodgr_core::context::TenantContext;
use lodgr_core::error::LodgrResult;
use lodgr_core::models::reservation::{CreateReservation, Reservation};
use lodgr_core::models::revenue::RevenueSummary;
use lodgr_core::repository::{PropertyRepository, ReservationRepository};
use moka::future::Cache;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RevenueConfig;
use crate::period;

/// Cache key. The tenant is always part of it, so a summary computed for
/// one tenant can never be served to another.
type SummaryKey = (String, Uuid);

/// Revenue reporting service.
///
/// Generic over repository implementations so that reporting has no
/// dependency on the database crate.
pub struct RevenueService<P: PropertyRepository, R: ReservationRepository> {
    property_repo: P,
    reservation_repo: R,
    cache: Cache<SummaryKey, RevenueSummary>,
    /// Bumped before every invalidation. A load that started under an
    /// older generation must not leave its result in the cache.
    generation: AtomicU64,
}

impl<P: PropertyRepository, R: ReservationRepository> RevenueService<P, R> {
    pub fn new(property_repo: P, reservation_repo: R, config: RevenueConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            property_repo,
            reservation_repo,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    /// Revenue summary of a property, served from cache when fresh.
    ///
    /// Calls without a tenant context bypass the cache; the repository
    /// treats the property as invisible.
    pub async fn summary(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
    ) -> LodgrResult<RevenueSummary> {
        let Some(tenant_id) = ctx.tenant_id() else {
            return self.reservation_repo.revenue_summary(ctx, property_id).await;
        };
        let key = (tenant_id.to_string(), property_id);

        if let Some(summary) = self.cache.get(&key).await {
            debug!(tenant_id, property_id = %property_id, "Revenue cache hit");
            return Ok(summary);
        }
        debug!(tenant_id, property_id = %property_id, "Revenue cache miss");

        let generation = self.generation.load(Ordering::SeqCst);
        let summary = self
            .reservation_repo
            .revenue_summary(ctx, property_id)
            .await?;
        self.cache.insert(key.clone(), summary.clone()).await;

        // Re-checked after the insert: an invalidation that raced the load
        // either bumped the generation before this read or removes the
        // entry after the insert.
        if self.generation.load(Ordering::SeqCst) != generation {
            self.cache.invalidate(&key).await;
            debug!(
                tenant_id,
                property_id = %property_id,
                "Discarded summary loaded before invalidation"
            );
        }

        Ok(summary)
    }

    /// Drop the cached summary of one property for the context's tenant.
    pub async fn invalidate(&self, ctx: &TenantContext, property_id: Uuid) {
        if let Some(tenant_id) = ctx.tenant_id() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.cache
                .invalidate(&(tenant_id.to_string(), property_id))
                .await;
            info!(tenant_id, property_id = %property_id, "Revenue cache invalidated");
        }
    }

    /// Create a reservation and invalidate its property's cached summary.
    pub async fn record_reservation(
        &self,
        ctx: &TenantContext,
        input: CreateReservation,
    ) -> LodgrResult<Reservation> {
        let reservation = self.reservation_repo.create(ctx, input).await?;
        self.invalidate(ctx, reservation.property_id).await;
        Ok(reservation)
    }

    /// Revenue of reservations checking in during calendar month
    /// `year-month` in the property's own timezone.
    pub async fn monthly_revenue(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        year: i32,
        month: u32,
    ) -> LodgrResult<RevenueSummary> {
        let property = self.property_repo.get_by_id(ctx, property_id).await?;
        let tz = property.tz()?;
        let (from, to) = period::month_bounds(tz, year, month)?;

        debug!(
            property_id = %property_id,
            timezone = %property.timezone,
            from = %from,
            to = %to,
            "Computing monthly revenue"
        );

        self.reservation_repo
            .revenue_between(ctx, property_id, from, to)
            .await
    }
}
