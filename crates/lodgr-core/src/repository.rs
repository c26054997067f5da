//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories take
//! a [`TenantContext`] on every call; rows owned by other tenants are
//! invisible to reads and rejected on writes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::context::TenantContext;
use crate::error::LodgrResult;
use crate::models::{
    property::{CreateProperty, Property},
    reservation::{CreateReservation, Reservation},
    revenue::RevenueSummary,
    tenant::{CreateTenant, Tenant},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    /// The result returned for reads under an unset tenant context.
    pub fn empty(pagination: &Pagination) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            offset: pagination.offset,
            limit: pagination.limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Tenants (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = LodgrResult<Tenant>> + Send;
    fn get_by_id(&self, id: &str) -> impl Future<Output = LodgrResult<Tenant>> + Send;
    /// Delete a tenant. Rejected while it still owns properties or
    /// reservations.
    fn delete(&self, id: &str) -> impl Future<Output = LodgrResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LodgrResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait PropertyRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateProperty,
    ) -> impl Future<Output = LodgrResult<Property>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = LodgrResult<Property>> + Send;
    fn get_by_code(
        &self,
        ctx: &TenantContext,
        property_code: &str,
    ) -> impl Future<Output = LodgrResult<Property>> + Send;
    fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> impl Future<Output = LodgrResult<PaginatedResult<Property>>> + Send;
}

/// Reservations are append-only: no update or delete operations exist.
pub trait ReservationRepository: Send + Sync {
    fn create(
        &self,
        ctx: &TenantContext,
        input: CreateReservation,
    ) -> impl Future<Output = LodgrResult<Reservation>> + Send;
    fn get_by_id(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> impl Future<Output = LodgrResult<Reservation>> + Send;
    fn list_by_property(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = LodgrResult<PaginatedResult<Reservation>>> + Send;

    /// Reservations of a property whose stay intersects `[from, to)`.
    fn list_overlapping(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = LodgrResult<Vec<Reservation>>> + Send;

    /// Revenue over every reservation of a property.
    fn revenue_summary(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
    ) -> impl Future<Output = LodgrResult<RevenueSummary>> + Send;

    /// Revenue over reservations checking in within `[from, to)`.
    fn revenue_between(
        &self,
        ctx: &TenantContext,
        property_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Future<Output = LodgrResult<RevenueSummary>> + Send;
}
