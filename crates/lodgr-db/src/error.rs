//! Database-specific error types and conversions.
//!
//! Write statements report constraint failures as SurrealDB errors.
//! Unique-index and record-id collisions come from the engine itself;
//! parent-existence and cross-tenant failures are raised by `THROW`
//! inside the write statement with one of the `lodgr.*` markers below.

use lodgr_core::error::LodgrError;

/// Raised when a referenced parent row does not exist.
pub(crate) const MISSING_PARENT: &str = "lodgr.fk:";
/// Raised when a referenced parent row belongs to another tenant.
pub(crate) const CROSS_TENANT: &str = "lodgr.cross_tenant:";
/// Raised when a delete would orphan dependent rows.
pub(crate) const HAS_DEPENDENTS: &str = "lodgr.restrict:";

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Duplicate {entity}: {key}")]
    Duplicate { entity: String, key: String },

    #[error("{entity} references unknown {reference}")]
    ForeignKey { entity: String, reference: String },

    #[error("{entity} references {reference} owned by another tenant")]
    CrossTenant { entity: String, reference: String },

    #[error("{entity} {id} still has dependent rows")]
    HasDependents { entity: String, id: String },

    #[error("Transaction conflict: {0}")]
    Conflict(String),

    #[error("Invalid stored value: {0}")]
    Decode(String),
}

impl DbError {
    /// Classify a failed write on `entity` identified by `key`.
    pub(crate) fn classify(err: surrealdb::Error, entity: &str, key: &str) -> Self {
        let message = err.to_string();

        if let Some(reference) = marker_payload(&message, MISSING_PARENT) {
            return DbError::ForeignKey {
                entity: entity.into(),
                reference,
            };
        }
        if let Some(reference) = marker_payload(&message, CROSS_TENANT) {
            return DbError::CrossTenant {
                entity: entity.into(),
                reference,
            };
        }
        if marker_payload(&message, HAS_DEPENDENTS).is_some() {
            return DbError::HasDependents {
                entity: entity.into(),
                id: key.into(),
            };
        }
        if message.contains("already contains") || message.contains("already exists") {
            return DbError::Duplicate {
                entity: entity.into(),
                key: key.into(),
            };
        }
        if message.contains("can be retried") || message.contains("write conflict") {
            return DbError::Conflict(message);
        }

        DbError::Surreal(err)
    }
}

/// Extract `table 'id'` from a `<marker><table>:<id>` error payload.
fn marker_payload(message: &str, marker: &str) -> Option<String> {
    let start = message.find(marker)? + marker.len();
    let payload = message[start..]
        .split(['\'', '"', '`', '\n'])
        .next()
        .unwrap_or_default()
        .trim();
    Some(match payload.split_once(':') {
        Some((table, id)) => format!("{table} '{id}'"),
        None => payload.to_string(),
    })
}

impl From<DbError> for LodgrError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LodgrError::NotFound { entity, id },
            DbError::Duplicate { entity, key } => LodgrError::DuplicateKey { entity, key },
            DbError::ForeignKey { entity, reference } => {
                LodgrError::ForeignKeyViolation { entity, reference }
            }
            DbError::HasDependents { entity, id } => LodgrError::ForeignKeyViolation {
                entity,
                reference: format!("dependent rows of {id}"),
            },
            DbError::CrossTenant { entity, reference } => LodgrError::AuthorizationDenied {
                reason: format!("{entity} cannot reference {reference} of another tenant"),
            },
            other => LodgrError::Database(other.to_string()),
        }
    }
}
