//! Per-session slot holding the canonical uploaded bytes and file name.
//!
//! One slot per session id. A later `put` replaces the earlier blob wholesale and
//! concurrent writers for the same session race with last-write-wins.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// Key under which the original file name is stored.
pub const FILE_NAME_KEY: &str = "filename";
/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone)]
struct SessionSlot {
    blob: Option<Vec<u8>>,
    strings: HashMap<String, String>,
    expires_at: SystemTime,
}

/// In-memory session store with idle expiry.
#[derive(Debug)]
pub struct SessionStore {
    slots: RwLock<HashMap<String, SessionSlot>>,
    ttl: Duration,
}

/// Create a fresh session id.
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            slots: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn with_slot<T>(&self, session_id: &str, f: impl FnOnce(&mut SessionSlot) -> T) -> T {
        let now = SystemTime::now();
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.retain(|_, slot| slot.expires_at > now);

        let slot = slots.entry(session_id.to_string()).or_insert_with(|| SessionSlot {
            blob: None,
            strings: HashMap::new(),
            expires_at: now,
        });
        slot.expires_at = now + self.ttl;
        f(slot)
    }

    fn read_slot<T>(&self, session_id: &str, f: impl FnOnce(&SessionSlot) -> Option<T>) -> Option<T> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots
            .get(session_id)
            .filter(|slot| slot.expires_at > SystemTime::now())
            .and_then(f)
    }

    /// Store the uploaded bytes, replacing whatever the session held.
    pub fn put(&self, session_id: &str, blob: Vec<u8>) {
        self.with_slot(session_id, |slot| slot.blob = Some(blob));
    }

    pub fn get(&self, session_id: &str) -> Option<Vec<u8>> {
        self.read_slot(session_id, |slot| slot.blob.clone())
    }

    pub fn put_string(&self, session_id: &str, key: &str, value: &str) {
        self.with_slot(session_id, |slot| {
            slot.strings.insert(key.to_string(), value.to_string());
        });
    }

    pub fn get_string(&self, session_id: &str, key: &str) -> Option<String> {
        self.read_slot(session_id, |slot| slot.strings.get(key).cloned())
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let now = SystemTime::now();
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.values().filter(|slot| slot.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
