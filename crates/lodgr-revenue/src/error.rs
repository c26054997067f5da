//! Revenue reporting error types.

use lodgr_core::error::LodgrError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevenueError {
    #[error("invalid reporting month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("no valid local midnight on {date} in {timezone}")]
    UnresolvableLocalTime { date: String, timezone: String },
}

impl From<RevenueError> for LodgrError {
    fn from(err: RevenueError) -> Self {
        LodgrError::Validation {
            message: err.to_string(),
        }
    }
}
