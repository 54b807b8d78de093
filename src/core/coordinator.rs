use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use crate::core::resolver::{MatchResolver, ResolveError};
use crate::core::stats::ResolutionStats;
use crate::models::{CheckRequest, MatchOutcome, DATE_FORMAT};
use crate::services::{ExactLookup, OutcomeCache, SimilaritySearch};

/// Expiry for cached outcomes
pub const DEFAULT_OUTCOME_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Marker for an absent optional field in a fuzzy key
const ABSENT: &str = "~";

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build the cache key for a check request
    ///
    /// An identity number is authoritative, so fuzzy fields are ignored when
    /// one is present. Fuzzy fields are length-prefixed so that separators
    /// inside values cannot make two different requests share a key.
    pub fn for_request(request: &CheckRequest) -> String {
        if let Some(nik) = request.identity_number() {
            return format!("blacklist:nik:{}", nik);
        }

        let mut key = String::from("blacklist:name:");
        push_field(&mut key, Some(request.name()));
        key.push(':');
        push_field(&mut key, request.birth_place());
        key.push(':');
        let date = request
            .birth_date()
            .map(|d| d.format(DATE_FORMAT).to_string());
        push_field(&mut key, date.as_deref());
        key
    }
}

fn push_field(key: &mut String, value: Option<&str>) {
    match value {
        Some(v) => {
            let _ = write!(key, "{}={}", v.len(), v);
        }
        None => key.push_str(ABSENT),
    }
}

/// Decode a cached payload; anything malformed or inconsistent is a miss
pub fn decode_outcome(bytes: &[u8]) -> Option<MatchOutcome> {
    serde_json::from_slice::<MatchOutcome>(bytes).ok()
}

pub fn encode_outcome(outcome: &MatchOutcome) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(outcome)
}

/// Cache-aside coordinator in front of the [`MatchResolver`]
///
/// One cache read, at most one resolution and at most one cache write per
/// call. Concurrent misses on the same key each resolve independently; there
/// is no request coalescing.
pub struct CacheAside<C, X, S> {
    cache: C,
    resolver: MatchResolver<X, S>,
    ttl: Duration,
    stats: Arc<ResolutionStats>,
}

impl<C, X, S> CacheAside<C, X, S>
where
    C: OutcomeCache,
    X: ExactLookup,
    S: SimilaritySearch,
{
    pub fn new(cache: C, resolver: MatchResolver<X, S>, stats: Arc<ResolutionStats>) -> Self {
        Self {
            cache,
            resolver,
            ttl: DEFAULT_OUTCOME_TTL,
            stats,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn stats(&self) -> &Arc<ResolutionStats> {
        &self.stats
    }

    /// Resolve a request, serving from cache when possible
    ///
    /// Cache failures never fail the request. Provider failures do, and
    /// leave the cache untouched.
    pub async fn resolve(&self, request: &CheckRequest) -> Result<MatchOutcome, ResolveError> {
        let cache_key = CacheKey::for_request(request);

        match self.cache.get(&cache_key).await {
            Ok(Some(bytes)) => match decode_outcome(&bytes) {
                Some(outcome) => {
                    tracing::info!(
                        cache_key = %cache_key,
                        match_type = %outcome.match_kind(),
                        "Cache hit for blacklist check"
                    );
                    self.stats.record_cache_hit();
                    self.stats.record_outcome(&outcome);
                    return Ok(outcome);
                }
                None => tracing::warn!(cache_key = %cache_key, "Discarding malformed cached outcome"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(cache_key = %cache_key, "Cache read failed, bypassing: {}", e),
        }
        self.stats.record_cache_miss();

        let outcome = match self.resolver.classify(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.stats.record_resolution_failure();
                return Err(e);
            }
        };
        self.stats.record_outcome(&outcome);

        match encode_outcome(&outcome) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&cache_key, bytes, self.ttl).await {
                    tracing::warn!(cache_key = %cache_key, "Error caching result: {}", e);
                    self.stats.record_cache_write_failure();
                }
            }
            Err(e) => {
                tracing::error!("Error serializing result for cache: {}", e);
                self.stats.record_cache_write_failure();
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FuzzyTier;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nik_key_ignores_fuzzy_fields() {
        let a = CheckRequest::new("John Doe")
            .unwrap()
            .with_identity_number("1234567890123456")
            .with_birth_place("Jakarta");
        let b = CheckRequest::new("Jane Roe")
            .unwrap()
            .with_identity_number("1234567890123456")
            .with_birth_date(date(1990, 1, 1));

        assert_eq!(CacheKey::for_request(&a), "blacklist:nik:1234567890123456");
        assert_eq!(CacheKey::for_request(&a), CacheKey::for_request(&b));
    }

    #[test]
    fn test_fuzzy_key_format() {
        let request = CheckRequest::new("John Doe")
            .unwrap()
            .with_birth_place("Jakarta")
            .with_birth_date(date(1990, 1, 1));

        assert_eq!(
            CacheKey::for_request(&request),
            "blacklist:name:8=John Doe:7=Jakarta:10=1990-01-01"
        );
    }

    #[test]
    fn test_absent_place_differs_from_empty_place() {
        let absent = CheckRequest::new("John Doe").unwrap();
        let empty = CheckRequest::new("John Doe").unwrap().with_birth_place("");

        assert_eq!(CacheKey::for_request(&absent), "blacklist:name:8=John Doe:~:~");
        assert_ne!(CacheKey::for_request(&absent), CacheKey::for_request(&empty));
    }

    #[test]
    fn test_separator_in_values_does_not_collide() {
        let a = CheckRequest::new("a:b").unwrap().with_birth_place("c");
        let b = CheckRequest::new("a").unwrap().with_birth_place("b:c");

        assert_ne!(CacheKey::for_request(&a), CacheKey::for_request(&b));
    }

    #[test]
    fn test_outcome_round_trip_every_kind() {
        let outcomes = [
            MatchOutcome::exact("court order"),
            MatchOutcome::fuzzy(FuzzyTier::Full, "fraud"),
            MatchOutcome::fuzzy(FuzzyTier::DateOnly, "unpaid debt"),
            MatchOutcome::no_match(),
        ];

        for outcome in outcomes {
            let bytes = encode_outcome(&outcome).unwrap();
            assert_eq!(decode_outcome(&bytes), Some(outcome));
        }
    }

    #[test]
    fn test_malformed_payloads_decode_to_none() {
        assert_eq!(decode_outcome(b"not json"), None);
        assert_eq!(decode_outcome(br#"{"blacklisted":true}"#), None);
        assert_eq!(
            decode_outcome(br#"{"blacklisted":true,"details":"x","match_kind":"none"}"#),
            None
        );
    }
}
