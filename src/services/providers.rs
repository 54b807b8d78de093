use chrono::NaiveDate;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::CandidateRecord;

/// Failure reported by a blacklist data provider
#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Cache connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Keyed lookup of a blacklist entry by identity number (NIK)
pub trait ExactLookup: Send + Sync {
    fn lookup_by_id(
        &self,
        identity_number: &str,
    ) -> impl Future<Output = Result<Option<CandidateRecord>, DataAccessError>> + Send;
}

/// Name similarity search over blacklist entries
///
/// Implementations return at most the configured number of candidates, each
/// scoring strictly above the similarity threshold, best score first. Birth
/// place and birth date, when given, may be used to narrow the search.
pub trait SimilaritySearch: Send + Sync {
    fn search_similar(
        &self,
        name: &str,
        birth_place: Option<&str>,
        birth_date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<CandidateRecord>, DataAccessError>> + Send;
}

/// Byte-oriented key-value store with per-entry expiry
pub trait OutcomeCache: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, CacheError>> + Send;

    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;
}

impl<T: ExactLookup> ExactLookup for Arc<T> {
    fn lookup_by_id(
        &self,
        identity_number: &str,
    ) -> impl Future<Output = Result<Option<CandidateRecord>, DataAccessError>> + Send {
        (**self).lookup_by_id(identity_number)
    }
}

impl<T: SimilaritySearch> SimilaritySearch for Arc<T> {
    fn search_similar(
        &self,
        name: &str,
        birth_place: Option<&str>,
        birth_date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<CandidateRecord>, DataAccessError>> + Send {
        (**self).search_similar(name, birth_place, birth_date)
    }
}

impl<T: OutcomeCache> OutcomeCache for Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, CacheError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).set(key, value, ttl)
    }
}
