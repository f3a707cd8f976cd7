use redis::{aio::ConnectionManager, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a JSON value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        value
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| json_error("Deserialization error", e))
    }

    /// Set a JSON value with a TTL (at least one second)
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> redis::RedisResult<()> {
        let serialized =
            serde_json::to_string(value).map_err(|e| json_error("Serialization error", e))?;

        redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut self.connection.clone())
            .await
    }

    /// Delete keys from cache
    pub async fn delete(&self, keys: &[String]) -> redis::RedisResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        redis::cmd("DEL")
            .arg(keys)
            .query_async(&mut self.connection.clone())
            .await
    }
}

fn json_error(context: &'static str, e: serde_json::Error) -> RedisError {
    RedisError::from((redis::ErrorKind::TypeError, context, e.to_string()))
}

/// Cache key generators
pub mod keys {
    use uuid::Uuid;

    /// Key for one contractor's dashboard payload
    pub fn dashboard(contractor_id: Uuid) -> String {
        format!("contractor:{contractor_id}:dashboard")
    }

    /// Key for the fleet-wide stats payload
    pub fn fleet_stats() -> &'static str {
        "contractors:stats"
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dashboard_ttl: Duration,
    pub stats_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dashboard_ttl: Duration::from_secs(60),
            stats_ttl: Duration::from_secs(120),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            dashboard_ttl: parse_duration_secs("CACHE_TTL_DASHBOARD", 60),
            stats_ttl: parse_duration_secs("CACHE_TTL_STATS", 120),
        }
    }
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    std::env::var(env_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

/// Best-effort read-through cache for report payloads.
///
/// Redis is optional: without it every lookup misses and every write is a
/// no-op. Cache errors are logged and never reach the caller.
#[derive(Clone)]
pub struct ResponseCache {
    redis: Option<RedisCache>,
    config: CacheConfig,
}

impl ResponseCache {
    pub fn disabled() -> Self {
        Self {
            redis: None,
            config: CacheConfig::default(),
        }
    }

    /// Connect to Redis when a URL is configured. A failed connection disables
    /// caching instead of aborting start-up.
    pub async fn connect(redis_url: Option<&str>, config: CacheConfig) -> Self {
        let Some(url) = redis_url else {
            tracing::info!("REDIS_URL not set, response cache disabled");
            return Self::disabled();
        };

        match RedisCache::new(url).await {
            Ok(redis) => {
                tracing::info!("Connected to Redis");
                Self {
                    redis: Some(redis),
                    config,
                }
            }
            Err(e) => {
                tracing::warn!("Redis unavailable, response cache disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub async fn dashboard(&self, contractor_id: Uuid) -> Option<serde_json::Value> {
        self.get(&keys::dashboard(contractor_id)).await
    }

    pub async fn store_dashboard<T: Serialize>(&self, contractor_id: Uuid, value: &T) {
        self.set(&keys::dashboard(contractor_id), value, self.config.dashboard_ttl)
            .await;
    }

    pub async fn fleet_stats(&self) -> Option<serde_json::Value> {
        self.get(keys::fleet_stats()).await
    }

    pub async fn store_fleet_stats<T: Serialize>(&self, value: &T) {
        self.set(keys::fleet_stats(), value, self.config.stats_ttl)
            .await;
    }

    /// Drop everything derived from one contractor's data.
    pub async fn invalidate_contractor(&self, contractor_id: Uuid) {
        let Some(redis) = &self.redis else { return };
        let stale = [
            keys::dashboard(contractor_id),
            keys::fleet_stats().to_string(),
        ];
        if let Err(e) = redis.delete(&stale).await {
            tracing::warn!(%contractor_id, "Cache invalidation failed: {e}");
        }
    }

    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let redis = self.redis.as_ref()?;
        match redis.get::<serde_json::Value>(key).await {
            Ok(value) => value,
            Err(e) => {
                // Cache error - fall back to the database
                tracing::warn!(key, "Cache error: {e}");
                None
            }
        }
    }

    async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(redis) = &self.redis else { return };
        if let Err(e) = redis.set(key, value, ttl).await {
            tracing::warn!(key, "Cache write failed: {e}");
        }
    }
}
