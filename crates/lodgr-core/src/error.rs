//! Error types for the Lodgr reservation store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LodgrError {
    #[error("Duplicate key for {entity}: {key}")]
    DuplicateKey { entity: String, key: String },

    #[error("Foreign key violation on {entity}: {reference}")]
    ForeignKeyViolation { entity: String, reference: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Tenant context missing or invalid")]
    TenantContext,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LodgrError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            reason: reason.into(),
        }
    }
}

pub type LodgrResult<T> = Result<T, LodgrError>;
