//! stash.rs
//!
//! Short-lived parking for booking sessions. When an unauthenticated patron
//! is bounced to login mid-flow, the session is stashed under a one-time
//! key; after login the key restores the session exactly once. Entries
//! expire so an abandoned login cannot resurrect a stale seat pick hours
//! later.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::flow::session::BookingSession;

/// How long a parked session survives by default.
pub const DEFAULT_STASH_TTL: Duration = Duration::from_secs(15 * 60);

struct StashEntry {
    stored_at: Instant,
    session: BookingSession,
}

pub struct SessionStash {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, StashEntry>>,
}

impl Default for SessionStash {
    fn default() -> Self {
        Self::new(DEFAULT_STASH_TTL)
    }
}

impl SessionStash {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Parks a session and returns the one-time key that restores it.
    pub fn stash(&self, session: BookingSession) -> Uuid {
        let key = Uuid::new_v4();
        let mut entries = self.entries.lock().unwrap();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() <= ttl);
        entries.insert(
            key,
            StashEntry {
                stored_at: Instant::now(),
                session,
            },
        );
        key
    }

    /// Takes a parked session out. The entry is consumed either way, so a
    /// second restore with the same key returns `None`.
    pub fn restore(&self, key: Uuid) -> Option<BookingSession> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.remove(&key)?;
        if entry.stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.session)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> BookingSession {
        BookingSession::new(7, 12, 3, 200).unwrap()
    }

    #[test]
    fn restores_exactly_once() {
        let stash = SessionStash::default();
        let key = stash.stash(session());
        assert_eq!(stash.restore(key), Some(session()));
        assert_eq!(stash.restore(key), None);
    }

    #[test]
    fn unknown_keys_restore_nothing() {
        let stash = SessionStash::default();
        stash.stash(session());
        assert_eq!(stash.restore(Uuid::new_v4()), None);
        assert_eq!(stash.len(), 1);
    }

    #[test]
    fn expired_entries_are_gone() {
        let stash = SessionStash::new(Duration::from_millis(0));
        let key = stash.stash(session());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(stash.restore(key), None);
    }

    #[test]
    fn stashing_prunes_expired_entries() {
        let stash = SessionStash::new(Duration::from_millis(0));
        stash.stash(session());
        std::thread::sleep(Duration::from_millis(5));
        stash.stash(session());
        assert_eq!(stash.len(), 1);
    }
}
