//! SurrealDB implementation of [`PropertyRepository`].
//!
//! The insert runs as a single `IF … ELSE` statement: the tenant
//! existence check and the `CREATE` commit together. The unique index
//! on `(tenant_id, property_code)` decides races between concurrent
//! inserts of the same code.

use chrono::{DateTime, Utc};
use lodgr_core::context::TenantContext;
use lodgr_core::error::LodgrResult;
use lodgr_core::models::property::{CreateProperty, Property};
use lodgr_core::repository::{PaginatedResult, Pagination, PropertyRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{info, warn};
use uuid::Uuid;

use super::{CountRow, MAX_WRITE_ATTEMPTS, parse_uuid};
use crate::error::{DbError, MISSING_PARENT};

#[derive(Debug, SurrealValue)]
struct PropertyRow {
    tenant_id: String,
    property_code: String,
    name: String,
    timezone: String,
    created_at: DateTime<Utc>,
}

impl PropertyRow {
    fn into_property(self, id: Uuid) -> Property {
        Property {
            id,
            tenant_id: self.tenant_id,
            property_code: self.property_code,
            name: self.name,
            timezone: self.timezone,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct PropertyRowWithId {
    record_id: String,
    tenant_id: String,
    property_code: String,
    name: String,
    timezone: String,
    created_at: DateTime<Utc>,
}

impl PropertyRowWithId {
    fn try_into_property(self) -> Result<Property, DbError> {
        Ok(Property {
            id: parse_uuid(&self.record_id, "property")?,
            tenant_id: self.tenant_id,
            property_code: self.property_code,
            name: self.name,
            timezone: self.timezone,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Property repository.
#[derive(Clone)]
pub struct SurrealPropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn insert(
        &self,
        id: Uuid,
        tenant_id: &str,
        input: &CreateProperty,
        timezone: &str,
    ) -> Result<PropertyRow, DbError> {
        let key = format!("{tenant_id}/{}", input.property_code);
        let query = format!(
            "IF !record::exists(type::record('tenant', $tenant_id)) {{ \
                THROW '{MISSING_PARENT}tenant:' + $tenant_id \
             }} ELSE {{ \
                CREATE type::record('property', $id) SET \
                tenant_id = $tenant_id, \
                property_code = $property_code, \
                name = $name, timezone = $timezone \
             }}"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("property_code", input.property_code.clone()))
            .bind(("name", input.name.clone()))
            .bind(("timezone", timezone.to_string()))
            .await
            .map_err(|e| DbError::classify(e, "property", &key))?;

        let mut result = result
            .check()
            .map_err(|e| DbError::classify(e, "property", &key))?;

        let rows: Vec<PropertyRow> = result.take(0)?;
        rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id.to_string(),
        })
    }
}

impl<C: Connection> PropertyRepository for SurrealPropertyRepository<C> {
    async fn create(&self, ctx: &TenantContext, input: CreateProperty) -> LodgrResult<Property> {
        let tenant_id = ctx.authorize_write(&input.tenant_id)?;
        let timezone = input.validate()?;
        let id = Uuid::new_v4();

        let mut attempt = 1;
        let row = loop {
            match self.insert(id, tenant_id, &input, &timezone).await {
                Err(DbError::Conflict(reason)) if attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(attempt, %reason, "Property insert conflicted, retrying");
                    attempt += 1;
                }
                other => break other?,
            }
        };

        info!(
            tenant_id = %tenant_id,
            property_id = %id,
            property_code = %input.property_code,
            "Property created"
        );
        Ok(row.into_property(id))
    }

    async fn get_by_id(&self, ctx: &TenantContext, id: Uuid) -> LodgrResult<Property> {
        let id_str = id.to_string();
        let not_found = || DbError::NotFound {
            entity: "property".into(),
            id: id_str.clone(),
        };

        let Some(tenant_id) = ctx.tenant_id() else {
            warn!(property_id = %id, "Property lookup without tenant context");
            return Err(not_found().into());
        };

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('property', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(not_found)?;

        Ok(row.into_property(id))
    }

    async fn get_by_code(&self, ctx: &TenantContext, property_code: &str) -> LodgrResult<Property> {
        let not_found = || DbError::NotFound {
            entity: "property".into(),
            id: format!("code={property_code}"),
        };

        let Some(tenant_id) = ctx.tenant_id() else {
            warn!(property_code, "Property lookup without tenant context");
            return Err(not_found().into());
        };

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM property \
                 WHERE tenant_id = $tenant_id AND property_code = $property_code",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("property_code", property_code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PropertyRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(not_found)?;

        Ok(row.try_into_property()?)
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        pagination: Pagination,
    ) -> LodgrResult<PaginatedResult<Property>> {
        let Some(tenant_id) = ctx.tenant_id() else {
            warn!("Property listing without tenant context; returning no rows");
            return Ok(PaginatedResult::empty(&pagination));
        };

        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM property \
                 WHERE tenant_id = $tenant_id GROUP ALL; \
                 SELECT meta::id(id) AS record_id, * FROM property \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<PropertyRowWithId> = result.take(1).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PropertyRowWithId::try_into_property)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
