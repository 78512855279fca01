use tracing::info;

use crate::database::Database;
use crate::redis_client::RedisClient;

pub mod events;
pub mod seats;

#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
    db: Database,
}

impl CacheService {
    pub fn new(redis: RedisClient, db: Database) -> Self {
        Self { redis, db }
    }

    // Warm the cache at startup so the first catalog hit is already served
    // from Redis.
    pub async fn warmup_cache(&self) {
        info!("Starting cache warmup...");

        match self.get_events().await {
            Ok(events) => info!("Loaded {} events", events.len()),
            Err(e) => tracing::warn!("Cache warmup skipped events: {}", e),
        }

        info!("Cache warmup done");
    }
}
