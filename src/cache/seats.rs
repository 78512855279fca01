use redis::AsyncCommands;
use tracing::{info, warn};

use crate::cache::CacheService;
use crate::models::SeatCode;

fn booked_set_key(show_id: i64) -> String {
    format!("show:{}:booked_seats", show_id)
}

impl CacheService {
    /// Booked seat labels for a show. Postgres is the source of truth; the
    /// Redis set mirrors it for cheap membership reads. The result is the
    /// union of both, sorted, so a stale mirror can only over-report.
    pub async fn booked_seats(&self, show_id: i64) -> Result<Vec<String>, sqlx::Error> {
        let db_seats: Vec<String> =
            sqlx::query_scalar("SELECT seat_label FROM booking_seats WHERE show_id = $1")
                .bind(show_id)
                .fetch_all(&self.db.pool)
                .await?;

        let key = booked_set_key(show_id);
        let mut conn = self.redis.conn.clone();

        if !db_seats.is_empty() {
            let refresh: Result<i64, _> = conn.sadd(&key, &db_seats).await;
            if let Err(e) = refresh {
                warn!("Failed to refresh booked-seat set for show {}: {}", show_id, e);
            }
        }

        let mirrored: Result<Vec<String>, _> = conn.smembers(&key).await;
        let mut seats = match mirrored {
            Ok(seats) if !seats.is_empty() => seats,
            _ => db_seats,
        };
        seats.sort();
        seats.dedup();
        Ok(seats)
    }

    /// Adds freshly committed seats to the mirror. Called after the booking
    /// transaction commits, so the set never holds seats that could still
    /// roll back.
    pub async fn mark_booked(&self, show_id: i64, seats: &[SeatCode]) {
        if seats.is_empty() {
            return;
        }
        let labels: Vec<String> = seats.iter().map(ToString::to_string).collect();
        let mut conn = self.redis.conn.clone();
        let result: Result<i64, _> = conn.sadd(booked_set_key(show_id), labels).await;
        if let Err(e) = result {
            warn!("Failed to mirror booked seats for show {}: {}", show_id, e);
        }
    }

    /// Drops booked-seat mirrors for shows that ended over a day ago. The
    /// ledger rows stay; only the Redis working set is reclaimed.
    pub async fn prune_finished_shows(&self) {
        let stale_ids: Vec<i64> = match sqlx::query_scalar(
            "SELECT id FROM shows WHERE show_time < NOW() - INTERVAL '1 day'",
        )
        .fetch_all(&self.db.pool)
        .await
        {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Prune scan failed: {}", e);
                return;
            }
        };

        if stale_ids.is_empty() {
            return;
        }

        let mut conn = self.redis.conn.clone();
        let mut pipe = redis::pipe();
        for show_id in &stale_ids {
            pipe.del(booked_set_key(*show_id));
        }
        let deleted: Result<Vec<i64>, _> = pipe.query_async(&mut conn).await;
        match deleted {
            Ok(_) => info!("Pruned booked-seat sets for {} finished shows", stale_ids.len()),
            Err(e) => warn!("Prune delete failed: {}", e),
        }
    }
}
