use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::warn;

#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(RedisClient { conn })
    }

    /// Fire-and-forget publish of a JSON payload. Subscribers are an
    /// optional extra, so failures are logged and swallowed.
    pub async fn publish_json(&self, channel: &str, payload: &serde_json::Value) {
        let mut conn = self.conn.clone();
        let result: Result<i64, _> = conn.publish(channel, payload.to_string()).await;
        if let Err(e) = result {
            warn!("Failed to publish to {}: {}", channel, e);
        }
    }
}
