//! Per-operation tenant context.
//!
//! Every tenant-scoped repository call receives a [`TenantContext`]
//! explicitly. Nothing about the caller's tenant is held in session or
//! connection state, so a context can never leak from one request into
//! the next.
//!
//! An unset context is fail-closed: reads return nothing and writes are
//! rejected with [`LodgrError::TenantContext`].

use serde_json::Value;
use tracing::warn;

use crate::error::{LodgrError, LodgrResult};

/// Identity of the tenant on whose behalf a single operation runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: Option<String>,
}

impl TenantContext {
    /// Context for the given tenant. A blank id yields an unset context.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        let tenant_id = tenant_id.into();
        if tenant_id.trim().is_empty() {
            return Self::unset();
        }
        Self {
            tenant_id: Some(tenant_id),
        }
    }

    /// A context with no tenant. Filtered reads under it are empty.
    pub fn unset() -> Self {
        Self { tenant_id: None }
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.tenant_id.is_some()
    }

    /// Returns the tenant id, or [`LodgrError::TenantContext`] if unset.
    pub fn require(&self) -> LodgrResult<&str> {
        self.tenant_id().ok_or(LodgrError::TenantContext)
    }

    /// Checks that a write targeting `tenant_id` is allowed under this
    /// context.
    pub fn authorize_write(&self, tenant_id: &str) -> LodgrResult<&str> {
        let current = self.require()?;
        if current != tenant_id {
            return Err(LodgrError::denied(format!(
                "tenant '{current}' cannot write rows owned by tenant '{tenant_id}'"
            )));
        }
        Ok(current)
    }
}

/// Resolve the caller's tenant from decoded token claims.
///
/// Looks for a non-empty string `tenant_id` in `user_metadata`, then
/// `app_metadata`, then at the root of the claims object. When none is
/// present the returned context is unset.
pub fn resolve_tenant_from_claims(claims: &Value) -> TenantContext {
    let candidates = [
        claims.get("user_metadata").and_then(|m| m.get("tenant_id")),
        claims.get("app_metadata").and_then(|m| m.get("tenant_id")),
        claims.get("tenant_id"),
    ];

    let resolved = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|id| !id.trim().is_empty());

    match resolved {
        Some(tenant_id) => TenantContext::new(tenant_id),
        None => {
            warn!("No tenant_id found in token claims");
            TenantContext::unset()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_tenant_id_is_unset() {
        assert!(!TenantContext::new("").is_set());
        assert!(!TenantContext::new("   ").is_set());
        assert!(TenantContext::new("acme").is_set());
    }

    #[test]
    fn require_fails_closed() {
        let err = TenantContext::unset().require().unwrap_err();
        assert!(matches!(err, LodgrError::TenantContext));
    }

    #[test]
    fn authorize_write_rejects_other_tenant() {
        let ctx = TenantContext::new("acme");
        assert_eq!(ctx.authorize_write("acme").unwrap(), "acme");

        let err = ctx.authorize_write("globex").unwrap_err();
        assert!(matches!(err, LodgrError::AuthorizationDenied { .. }));
    }

    #[test]
    fn claims_prefer_user_metadata() {
        let claims = json!({
            "tenant_id": "root-tenant",
            "app_metadata": { "tenant_id": "app-tenant" },
            "user_metadata": { "tenant_id": "user-tenant" },
        });
        let ctx = resolve_tenant_from_claims(&claims);
        assert_eq!(ctx.tenant_id(), Some("user-tenant"));
    }

    #[test]
    fn claims_fall_back_to_app_metadata_then_root() {
        let claims = json!({
            "tenant_id": "root-tenant",
            "app_metadata": { "tenant_id": "app-tenant" },
            "user_metadata": { "tenant_id": "" },
        });
        assert_eq!(
            resolve_tenant_from_claims(&claims).tenant_id(),
            Some("app-tenant")
        );

        let claims = json!({ "tenant_id": "root-tenant", "user_metadata": {} });
        assert_eq!(
            resolve_tenant_from_claims(&claims).tenant_id(),
            Some("root-tenant")
        );
    }

    #[test]
    fn claims_without_tenant_resolve_unset() {
        let claims = json!({ "sub": "user-1", "tenant_id": 42 });
        assert!(!resolve_tenant_from_claims(&claims).is_set());
    }
}
