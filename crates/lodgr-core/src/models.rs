//! Domain models for Lodgr.
//!
//! These are the core types shared across all crates.

pub mod property;
pub mod reservation;
pub mod revenue;
pub mod tenant;
