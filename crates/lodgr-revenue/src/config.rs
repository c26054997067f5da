//! Revenue service configuration.

/// Configuration for the revenue service.
#[derive(Debug, Clone)]
pub struct RevenueConfig {
    /// Lifetime of a cached revenue summary in seconds (default: 300).
    pub cache_ttl_secs: u64,
    /// Maximum number of cached summaries (default: 10_000).
    pub cache_capacity: u64,
}

impl Default for RevenueConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            cache_capacity: 10_000,
        }
    }
}
