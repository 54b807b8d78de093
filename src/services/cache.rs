use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::services::providers::{CacheError, OutcomeCache};

/// Entry held in the in-process tier, with the TTL it was written under
#[derive(Clone)]
struct L1Entry {
    bytes: Arc<[u8]>,
    ttl: Duration,
}

/// Expires each L1 entry after its own TTL
struct OutcomeExpiry;

impl moka::Expiry<String, L1Entry> for OutcomeExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &L1Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &L1Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Two-tier cache manager
///
/// L1 is an in-process moka cache, L2 is Redis and shared across instances.
/// Either tier may be absent: without Redis the manager runs on L1 alone,
/// and an L1 size of zero disables the in-process tier.
pub struct CacheManager {
    redis: Option<ConnectionManager>,
    l1_cache: Option<moka::future::Cache<String, L1Entry>>,
    l1_max_ttl: Duration,
}

impl CacheManager {
    /// Connect to Redis and build the L1 tier
    pub async fn new(
        redis_url: &str,
        l1_size: u64,
        max_ttl: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::ConnectTimeout(connect_timeout))??;

        Ok(Self {
            redis: Some(redis),
            l1_cache: build_l1(l1_size, max_ttl),
            l1_max_ttl: max_ttl,
        })
    }

    /// L1-only cache, used when Redis is not reachable
    pub fn in_memory(l1_size: u64, max_ttl: Duration) -> Self {
        Self {
            redis: None,
            l1_cache: build_l1(l1_size, max_ttl),
            l1_max_ttl: max_ttl,
        }
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Get raw bytes from cache (L1 first, then L2)
    ///
    /// An L2 hit is copied into L1 for whatever lifetime Redis has left on it.
    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        if let Some(l1) = &self.l1_cache {
            if let Some(entry) = l1.get(key).await {
                tracing::trace!("L1 cache hit: {}", key);
                return Ok(Some(entry.bytes.to_vec()));
            }
        }

        let Some(redis) = &self.redis else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        let mut conn = redis.clone();
        let (value, pttl_ms): (Option<Vec<u8>>, i64) = redis::pipe()
            .cmd("GET")
            .arg(key)
            .cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await?;

        let Some(bytes) = value else {
            tracing::trace!("Cache miss: {}", key);
            return Ok(None);
        };

        tracing::trace!("L2 cache hit: {}", key);
        if let Some(l1) = &self.l1_cache {
            let entry = L1Entry {
                bytes: Arc::from(bytes.as_slice()),
                ttl: remaining_ttl(pttl_ms, self.l1_max_ttl),
            };
            l1.insert(key.to_string(), entry).await;
        }

        Ok(Some(bytes))
    }

    /// Set raw bytes in both tiers with an explicit TTL
    pub async fn set_bytes(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        if let Some(l1) = &self.l1_cache {
            let entry = L1Entry {
                bytes: Arc::from(value.as_slice()),
                ttl: ttl.min(self.l1_max_ttl),
            };
            l1.insert(key.to_string(), entry).await;
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.clone();
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(ttl.as_secs().max(1))
                .arg(value)
                .query_async(&mut conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Ping Redis; an L1-only manager reports unhealthy
    pub async fn health_check(&self) -> bool {
        let Some(redis) = &self.redis else {
            return false;
        };

        let mut conn = redis.clone();
        let pong: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }
}

/// L1 lifetime for an entry promoted from Redis
///
/// `PTTL` answers -1 for a key without expiry and -2 for a missing key; both
/// fall back to the L1 ceiling, as does anything longer than it.
fn remaining_ttl(pttl_ms: i64, max_ttl: Duration) -> Duration {
    u64::try_from(pttl_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map_or(max_ttl, |ms| Duration::from_millis(ms).min(max_ttl))
}

fn build_l1(l1_size: u64, max_ttl: Duration) -> Option<moka::future::Cache<String, L1Entry>> {
    (l1_size > 0).then(|| {
        moka::future::CacheBuilder::new(l1_size)
            .time_to_live(max_ttl)
            .expire_after(OutcomeExpiry)
            .build()
    })
}

impl OutcomeCache for CacheManager {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.get_bytes(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        self.set_bytes(key, value, ttl).await
    }
}
