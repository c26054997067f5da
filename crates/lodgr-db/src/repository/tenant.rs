//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use lodgr_core::error::LodgrResult;
use lodgr_core::models::tenant::{CreateTenant, Tenant};
use lodgr_core::repository::{PaginatedResult, Pagination, TenantRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use super::CountRow;
use crate::error::{DbError, HAS_DEPENDENTS};

/// DB-side row struct for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    created_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: String) -> Tenant {
        Tenant {
            id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// DB-side row struct that includes the record key via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<TenantRowWithId> for Tenant {
    fn from(row: TenantRowWithId) -> Self {
        Tenant {
            id: row.record_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> LodgrResult<Tenant> {
        input.validate()?;
        let id = input.id;

        // CREATE on an existing record key fails, which makes the key
        // itself the uniqueness guard.
        let result = self
            .db
            .query("CREATE type::record('tenant', $id) SET name = $name")
            .bind(("id", id.clone()))
            .bind(("name", input.name))
            .await
            .map_err(|e| DbError::classify(e, "tenant", &id))?;

        let mut result = result
            .check()
            .map_err(|e| DbError::classify(e, "tenant", &id))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id.clone(),
        })?;

        info!(tenant_id = %id, "Tenant created");
        Ok(row.into_tenant(id))
    }

    async fn get_by_id(&self, id: &str) -> LodgrResult<Tenant> {
        let id = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id.clone(),
        })?;

        Ok(row.into_tenant(id))
    }

    async fn delete(&self, id: &str) -> LodgrResult<()> {
        let id = id.to_string();

        // The dependency probe and the delete run as one statement, so a
        // property created concurrently cannot slip in between them.
        let query = format!(
            "IF array::len((SELECT id FROM property WHERE tenant_id = $id LIMIT 1)) > 0 \
                OR array::len((SELECT id FROM reservation WHERE tenant_id = $id LIMIT 1)) > 0 {{ \
                THROW '{HAS_DEPENDENTS}tenant:' + $id \
             }} ELSE {{ \
                DELETE type::record('tenant', $id) RETURN BEFORE \
             }}"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id.clone()))
            .await
            .map_err(|e| DbError::classify(e, "tenant", &id))?;

        let mut result = result
            .check()
            .map_err(|e| DbError::classify(e, "tenant", &id))?;

        let deleted: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        if deleted.is_empty() {
            return Err(DbError::NotFound {
                entity: "tenant".into(),
                id,
            }
            .into());
        }

        info!(tenant_id = %id, "Tenant deleted");
        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> LodgrResult<PaginatedResult<Tenant>> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM tenant GROUP ALL; \
                 SELECT meta::id(id) AS record_id, * FROM tenant \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let count_rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let rows: Vec<TenantRowWithId> = result.take(1).map_err(DbError::from)?;

        Ok(PaginatedResult {
            items: rows.into_iter().map(Tenant::from).collect(),
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
