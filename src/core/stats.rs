//! Prometheus counters for blacklist checks
//!
//! Every counter is registered on a [`Registry`] handed in by the caller, so
//! tests and embedders get an isolated set instead of the process-global one.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::models::MatchOutcome;

/// Counters shared by the coordinator and the HTTP layer
#[derive(Clone)]
pub struct ResolutionStats {
    registry: Registry,
    /// Resolved checks - labels: match_type, result
    checks_total: IntCounterVec,
    cache_hits: IntCounter,
    cache_misses: IntCounter,
    cache_write_failures: IntCounter,
    resolution_failures: IntCounter,
}

impl ResolutionStats {
    /// Create all counters and register them with `registry`
    pub fn new(registry: Registry) -> Result<Self, prometheus::Error> {
        let checks_total = IntCounterVec::new(
            Opts::new("blacklist_checks_total", "Total number of resolved blacklist checks"),
            &["match_type", "result"],
        )?;
        let cache_hits = IntCounter::new(
            "blacklist_cache_hits_total",
            "Checks answered from the outcome cache",
        )?;
        let cache_misses = IntCounter::new(
            "blacklist_cache_misses_total",
            "Checks that had to be resolved against the providers",
        )?;
        let cache_write_failures = IntCounter::new(
            "blacklist_cache_write_failures_total",
            "Outcomes that could not be written back to the cache",
        )?;
        let resolution_failures = IntCounter::new(
            "blacklist_resolution_failures_total",
            "Checks that failed because a provider failed or the deadline passed",
        )?;

        registry.register(Box::new(checks_total.clone()))?;
        registry.register(Box::new(cache_hits.clone()))?;
        registry.register(Box::new(cache_misses.clone()))?;
        registry.register(Box::new(cache_write_failures.clone()))?;
        registry.register(Box::new(resolution_failures.clone()))?;

        Ok(Self {
            registry,
            checks_total,
            cache_hits,
            cache_misses,
            cache_write_failures,
            resolution_failures,
        })
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.inc();
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.inc();
    }

    pub fn record_cache_write_failure(&self) {
        self.cache_write_failures.inc();
    }

    pub fn record_resolution_failure(&self) {
        self.resolution_failures.inc();
    }

    /// Count a resolved check under its match type
    pub fn record_outcome(&self, outcome: &MatchOutcome) {
        let result = if outcome.is_blacklisted() { "blacklisted" } else { "clear" };
        self.checks_total
            .with_label_values(&[outcome.match_kind().as_str(), result])
            .inc();
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.get()
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.get()
    }

    pub fn cache_write_failures(&self) -> u64 {
        self.cache_write_failures.get()
    }

    pub fn resolution_failures(&self) -> u64 {
        self.resolution_failures.get()
    }

    /// Resolved checks recorded under `match_type` (`exact`, `none`, ...)
    pub fn checks(&self, match_type: &str) -> u64 {
        let result = if match_type == "none" { "clear" } else { "blacklisted" };
        self.checks_total
            .with_label_values(&[match_type, result])
            .get()
    }

    /// Render every metric on the registry in the Prometheus text format
    pub fn encode(&self) -> Result<(String, Vec<u8>), prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}
