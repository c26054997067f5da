//! Lodgr Revenue — tenant-scoped revenue summaries, property-local
//! monthly reporting and a tenant-keyed summary cache.

pub mod config;
pub mod error;
pub mod period;
pub mod service;

pub use config::RevenueConfig;
pub use error::RevenueError;
pub use service::RevenueService;
