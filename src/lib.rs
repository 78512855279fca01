pub mod config;
pub mod database;
pub mod redis_client;
pub mod mailer;
pub mod error;
pub mod models;
pub mod pricing;
pub mod controllers;
pub mod middleware;
pub mod cache;
pub mod flow;

use std::sync::Arc;

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub redis: redis_client::RedisClient,
    pub cache: cache::CacheService,
    pub mailer: mailer::Mailer,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;

        db.run_migrations().await?;

        let redis = redis_client::RedisClient::new(&config.redis.url).await?;
        let cache = cache::CacheService::new(redis.clone(), db.clone());

        let mailer = mailer::Mailer::new(config.smtp.clone());
        if !mailer.is_configured() {
            tracing::info!("SMTP not configured, booking confirmation emails disabled");
        }

        Ok(Arc::new(Self {
            db,
            redis,
            cache,
            mailer,
            config,
        }))
    }
}
