//! Wallet Session Store
//!
//! The browser dashboard kept the connected address in localStorage so a
//! reload picked the wallet straight back up. The gateway equivalent is a
//! small JSON file of connected sessions under the data directory. Loading
//! tolerates a missing or corrupt file; persistence failures are logged
//! and never fail a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

const SESSIONS_FILE: &str = "sessions.json";

/// A connected wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSession {
    pub id: Uuid,
    pub address: String,
    pub chain_id: u64,
    pub connected_at: DateTime<Utc>,
}

/// In-memory session map with JSON file persistence
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, WalletSession>>,
    path: PathBuf,
}

impl SessionStore {
    /// Open the store, loading any previously persisted sessions
    pub fn open(data_dir: &Path) -> Self {
        if let Err(e) = std::fs::create_dir_all(data_dir) {
            tracing::warn!("Failed to create data dir {:?}: {}", data_dir, e);
        }

        let path = data_dir.join(SESSIONS_FILE);
        let sessions = Self::load(&path);

        Self {
            sessions: RwLock::new(sessions),
            path,
        }
    }

    fn load(path: &Path) -> HashMap<Uuid, WalletSession> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return HashMap::new(),
        };

        match serde_json::from_str::<Vec<WalletSession>>(&content) {
            Ok(list) => list.into_iter().map(|s| (s.id, s)).collect(),
            Err(e) => {
                tracing::warn!("Ignoring corrupt session file {:?}: {}", path, e);
                HashMap::new()
            }
        }
    }

    /// Register a connected wallet and persist the session
    pub async fn connect(&self, address: String, chain_id: u64) -> WalletSession {
        let session = WalletSession {
            id: Uuid::new_v4(),
            address,
            chain_id,
            connected_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        self.persist(&sessions);

        session
    }

    /// Look up a session by id
    pub async fn get(&self, id: &Uuid) -> Option<WalletSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove a session. Returns the removed session if it existed.
    pub async fn disconnect(&self, id: &Uuid) -> Option<WalletSession> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(id);
        if removed.is_some() {
            self.persist(&sessions);
        }
        removed
    }

    /// Number of connected sessions
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn persist(&self, sessions: &HashMap<Uuid, WalletSession>) {
        let mut list: Vec<&WalletSession> = sessions.values().collect();
        list.sort_by_key(|s| s.connected_at);

        match serde_json::to_string_pretty(&list) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::warn!("Failed to persist sessions to {:?}: {}", self.path, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize sessions: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());

        let session = store
            .connect("0x1234567890abcdef1234567890abcdef12345678".to_string(), 31337)
            .await;

        let found = store.get(&session.id).await.unwrap();
        assert_eq!(found.address, "0x1234567890abcdef1234567890abcdef12345678");
        assert_eq!(found.chain_id, 31337);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let id = {
            let store = SessionStore::open(dir.path());
            let session = store.connect("0xabc".to_string(), 31337).await;
            session.id
        };

        let reopened = SessionStore::open(dir.path());
        let found = reopened.get(&id).await.unwrap();
        assert_eq!(found.address, "0xabc");
    }

    #[tokio::test]
    async fn test_disconnect_removes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());

        let session = store.connect("0xabc".to_string(), 1).await;
        assert!(store.disconnect(&session.id).await.is_some());
        assert!(store.get(&session.id).await.is_none());
        assert!(store.disconnect(&session.id).await.is_none());

        let reopened = SessionStore::open(dir.path());
        assert_eq!(reopened.count().await, 0);
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSIONS_FILE), "not json{{").unwrap();

        let store = SessionStore::open(dir.path());
        assert_eq!(store.count().await, 0);

        // Store remains usable and overwrites the bad file
        let session = store.connect("0xabc".to_string(), 1).await;
        assert!(store.get(&session.id).await.is_some());
    }
}
