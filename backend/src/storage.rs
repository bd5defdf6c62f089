use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

// 1. SessionStorage Contract
/// SessionStorage
///
/// The raw key/value medium behind the session store, scoped by session id.
/// It knows nothing about what the values mean; parsing and validation live in
/// `session::SessionService`. Swapping the implementation (in-memory, or a shared
/// cache in a multi-instance deployment) does not touch the handlers.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Reads one value. `None` when the session or the key does not exist.
    async fn get_item(&self, session_id: Uuid, key: &str) -> Option<String>;

    /// Writes one value, creating the session entry if needed.
    async fn set_item(&self, session_id: Uuid, key: &str, value: String);

    /// Removes one value. Removing an absent key is a no-op.
    async fn remove_item(&self, session_id: Uuid, key: &str);

    /// Drops every session last written before `cutoff`. Returns how many went.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> usize;
}

/// One session's fields plus the time of its last write.
struct StoredSession {
    fields: HashMap<String, String>,
    touched_at: DateTime<Utc>,
}

impl Default for StoredSession {
    fn default() -> Self {
        Self {
            fields: HashMap::new(),
            touched_at: Utc::now(),
        }
    }
}

// 2. The In-Process Implementation
/// MemorySessionStorage
///
/// Holds every session in a single map behind an async `RwLock`. Each call takes
/// the lock for exactly one read or write, so no lock is held across an await
/// point in the callers.
#[derive(Default)]
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<Uuid, StoredSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that still hold at least one value.
    pub async fn session_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get_item(&self, session_id: Uuid, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(&session_id)
            .and_then(|stored| stored.fields.get(key))
            .cloned()
    }

    async fn set_item(&self, session_id: Uuid, key: &str, value: String) {
        let mut entries = self.entries.write().await;
        let stored = entries.entry(session_id).or_default();
        stored.fields.insert(key.to_string(), value);
        stored.touched_at = Utc::now();
    }

    async fn remove_item(&self, session_id: Uuid, key: &str) {
        let mut entries = self.entries.write().await;
        if let Some(stored) = entries.get_mut(&session_id) {
            stored.fields.remove(key);
            // Drop empty sessions so logged-out ids do not accumulate.
            if stored.fields.is_empty() {
                entries.remove(&session_id);
            }
        }
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, stored| stored.touched_at >= cutoff);
        before - entries.len()
    }
}

/// StorageState
///
/// The shared handle to the session medium.
pub type StorageState = Arc<dyn SessionStorage>;
