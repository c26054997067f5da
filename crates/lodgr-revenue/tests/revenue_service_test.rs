//! Integration tests for the revenue service.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use lodgr_core::context::TenantContext;
use lodgr_core::error::{LodgrError, LodgrResult};
use lodgr_core::models::property::CreateProperty;
use lodgr_core::models::reservation::{CreateReservation, Reservation};
use lodgr_core::models::revenue::RevenueSummary;
use lodgr_core::models::tenant::CreateTenant;
use lodgr_core::repository::{
    PaginatedResult, Pagination, PropertyRepository, ReservationRepository, TenantRepository,
};
use lodgr_db::repository::{
    SurrealPropertyRepository, SurrealReservationRepository, SurrealTenantRepository,
};
use lodgr_revenue::{RevenueConfig, RevenueService};
use rust_decimal_macros::dec;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tokio::sync::Notify;
use uuid::Uuid;

type Service = RevenueService<SurrealPropertyRepository<Db>, SurrealReservationRepository<Db>>;

/// Spin up in-memory DB with tenant `acme` owning one property in
/// `timezone`, and tenant `globex` with no properties.
async fn setup_repos(
    timezone: &str,
) -> (
    SurrealPropertyRepository<Db>,
    SurrealReservationRepository<Db>,
    Uuid,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    lodgr_db::run_migrations(&db).await.unwrap();

    let tenants = SurrealTenantRepository::new(db.clone());
    for id in ["acme", "globex"] {
        tenants
            .create(CreateTenant {
                id: id.into(),
                name: id.to_uppercase(),
            })
            .await
            .unwrap();
    }

    let properties = SurrealPropertyRepository::new(db.clone());
    let property = properties
        .create(
            &TenantContext::new("acme"),
            CreateProperty {
                tenant_id: "acme".into(),
                property_code: "101".into(),
                name: "Main St".into(),
                timezone: Some(timezone.into()),
            },
        )
        .await
        .unwrap();

    (properties, SurrealReservationRepository::new(db), property.id)
}

async fn setup(timezone: &str) -> (Service, SurrealReservationRepository<Db>, Uuid) {
    let (properties, reservations, property_id) = setup_repos(timezone).await;
    let service = RevenueService::new(properties, reservations.clone(), RevenueConfig::default());
    (service, reservations, property_id)
}

/// Reservation repository whose first `revenue_summary` call signals
/// `loaded` once it has read from the database, then waits for `release`
/// before returning.
#[derive(Clone)]
struct GatedReservations {
    inner: SurrealReservationRepository<Db>,
    armed: Arc<AtomicBool>,
    loaded: Arc<Notify>,
    release: Arc<Notify>,
}

impl ReservationRepository for GatedReservations {
    async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateReservation,
    ) -> LodgrResult<Reservation> {
        self.inner.create(ctx, input).await
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> LodgrResult<Reservation> {
        self.inner.get_by_id(ctx, id).await
    }

    async fn list_by_property(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        pagination: Pagination,
    ) -> LodgrResult<PaginatedResult<Reservation>> {
        self.inner.list_by_property(ctx, property_id, pagination).await
    }

    async fn list_overlapping(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LodgrResult<Vec<Reservation>> {
        self.inner.list_overlapping(ctx, property_id, from, to).await
    }

    async fn revenue_summary(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
    ) -> LodgrResult<RevenueSummary> {
        let summary = self.inner.revenue_summary(ctx, property_id).await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.loaded.notify_one();
            self.release.notified().await;
        }
        summary
    }

    async fn revenue_between(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> LodgrResult<RevenueSummary> {
        self.inner.revenue_between(ctx, property_id, from, to).await
    }
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn booking(property_id: Uuid, check_in: DateTime<Utc>, nights: i64) -> CreateReservation {
    CreateReservation {
        property_id,
        tenant_id: "acme".into(),
        check_in,
        check_out: check_in + chrono::Duration::days(nights),
        total_amount: dec!(100.00),
        currency: None,
    }
}

#[tokio::test]
async fn summary_is_cached_until_invalidated() {
    let (service, reservations, property_id) = setup("UTC").await;
    let acme = TenantContext::new("acme");

    service
        .record_reservation(&acme, booking(property_id, at(2024, 6, 1, 0), 2))
        .await
        .unwrap();

    let first = service.summary(&acme, property_id).await.unwrap();
    assert_eq!(first.reservation_count, 1);

    // A write that bypasses the service leaves the cached entry in place.
    reservations
        .create(&acme, booking(property_id, at(2024, 6, 5, 0), 2))
        .await
        .unwrap();
    let cached = service.summary(&acme, property_id).await.unwrap();
    assert_eq!(cached.reservation_count, 1);

    service.invalidate(&acme, property_id).await;
    let fresh = service.summary(&acme, property_id).await.unwrap();
    assert_eq!(fresh.reservation_count, 2);
    assert_eq!(fresh.total_for("USD"), dec!(200.00));
}

#[tokio::test]
async fn recording_a_reservation_refreshes_the_summary() {
    let (service, _, property_id) = setup("UTC").await;
    let acme = TenantContext::new("acme");

    let empty = service.summary(&acme, property_id).await.unwrap();
    assert_eq!(empty.reservation_count, 0);
    assert_eq!(empty.total_for("USD").to_string(), "0.00");

    service
        .record_reservation(&acme, booking(property_id, at(2024, 6, 1, 0), 2))
        .await
        .unwrap();

    let updated = service.summary(&acme, property_id).await.unwrap();
    assert_eq!(updated.reservation_count, 1);
}

#[tokio::test]
async fn cached_summary_never_crosses_tenants() {
    let (service, _, property_id) = setup("UTC").await;
    let acme = TenantContext::new("acme");

    service
        .record_reservation(&acme, booking(property_id, at(2024, 6, 1, 0), 2))
        .await
        .unwrap();
    service.summary(&acme, property_id).await.unwrap();

    let result = service
        .summary(&TenantContext::new("globex"), property_id)
        .await;
    assert!(
        matches!(result, Err(LodgrError::NotFound { .. })),
        "expected NotFound, got {result:?}"
    );

    let result = service.summary(&TenantContext::unset(), property_id).await;
    assert!(matches!(result, Err(LodgrError::NotFound { .. })));
}

#[tokio::test]
async fn monthly_revenue_uses_property_timezone() {
    let (service, _, property_id) = setup("America/New_York").await;
    let acme = TenantContext::new("acme");

    // 2024-07-01 02:00 UTC is still June 30th in New York.
    service
        .record_reservation(&acme, booking(property_id, at(2024, 7, 1, 2), 1))
        .await
        .unwrap();
    // 2024-07-01 05:00 UTC is July 1st, 01:00 in New York.
    service
        .record_reservation(&acme, booking(property_id, at(2024, 7, 1, 5), 1))
        .await
        .unwrap();

    let june = service
        .monthly_revenue(&acme, property_id, 2024, 6)
        .await
        .unwrap();
    assert_eq!(june.reservation_count, 1);

    let july = service
        .monthly_revenue(&acme, property_id, 2024, 7)
        .await
        .unwrap();
    assert_eq!(july.reservation_count, 1);
    assert_eq!(july.total_for("USD"), dec!(100.00));
}

#[tokio::test]
async fn monthly_revenue_rejects_invalid_month() {
    let (service, _, property_id) = setup("UTC").await;

    let result = service
        .monthly_revenue(&TenantContext::new("acme"), property_id, 2024, 13)
        .await;
    assert!(matches!(result, Err(LodgrError::Validation { .. })));
}

#[tokio::test]
async fn monthly_revenue_of_other_tenants_property_not_found() {
    let (service, _, property_id) = setup("UTC").await;

    let result = service
        .monthly_revenue(&TenantContext::new("globex"), property_id, 2024, 6)
        .await;
    assert!(matches!(result, Err(LodgrError::NotFound { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalidation_during_load_is_not_lost() {
    let (properties, reservations, property_id) = setup_repos("UTC").await;
    let gated = GatedReservations {
        inner: reservations,
        armed: Arc::new(AtomicBool::new(true)),
        loaded: Arc::new(Notify::new()),
        release: Arc::new(Notify::new()),
    };
    let service = Arc::new(RevenueService::new(
        properties,
        gated.clone(),
        RevenueConfig::default(),
    ));
    let acme = TenantContext::new("acme");

    service
        .record_reservation(&acme, booking(property_id, at(2024, 6, 1, 0), 2))
        .await
        .unwrap();

    // Cache miss: the load reads one reservation and then stalls.
    let reader = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .summary(&TenantContext::new("acme"), property_id)
                .await
        })
    };
    gated.loaded.notified().await;

    service
        .record_reservation(&acme, booking(property_id, at(2024, 6, 5, 0), 2))
        .await
        .unwrap();
    gated.release.notify_one();

    let raced = reader.await.unwrap().unwrap();
    assert_eq!(raced.reservation_count, 1);

    let fresh = service.summary(&acme, property_id).await.unwrap();
    assert_eq!(fresh.reservation_count, 2, "stale summary stayed cached");
    assert_eq!(fresh.total_for("USD"), dec!(200.00));
}
