use redis::AsyncCommands;
use tracing::info;

use crate::cache::CacheService;
use crate::models::Event;

const EVENTS_KEY: &str = "events";
const EVENTS_TTL_SECS: u64 = 3600;

impl CacheService {
    /// Event catalog, cache first. Redis being down degrades to a database
    /// read; a database failure is the caller's problem.
    pub async fn get_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        if let Ok(events) = self.get_events_from_cache().await {
            return Ok(events);
        }

        let events = self.load_events_from_db().await?;
        let _ = self.save_events_to_cache(&events).await;
        Ok(events)
    }

    /// Drops the cached catalog after a write so the next read refills it.
    pub async fn invalidate_events(&self) {
        let mut conn = self.redis.conn.clone();
        let _: Result<(), _> = conn.del(EVENTS_KEY).await;
        info!("Invalidated events cache");
    }

    async fn load_events_from_db(&self) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, title, event_type, location, date_time, total_seats, banner_url
             FROM events
             ORDER BY date_time",
        )
        .fetch_all(&self.db.pool)
        .await
    }

    // === Cache plumbing ===

    async fn get_events_from_cache(&self) -> Result<Vec<Event>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        let data: String = conn.get(EVENTS_KEY).await?;
        let events: Vec<Event> = serde_json::from_str(&data)
            .map_err(|_| redis::RedisError::from((redis::ErrorKind::TypeError, "Parse error")))?;
        Ok(events)
    }

    async fn save_events_to_cache(&self, events: &[Event]) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(events).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(EVENTS_KEY, data, EVENTS_TTL_SECS).await
    }
}
