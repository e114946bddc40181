//! Process-wide session registry.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::SessionMeta;

/// Mapping from session identifier to session metadata.
///
/// The registry lives for the duration of the process and is volatile by
/// design; it restarts empty. Identifiers are unguessable UUIDv4 tokens
/// since nothing else gates access to a session.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionMeta>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh opaque identifier and register it.
    pub async fn create(&self) -> (String, SessionMeta) {
        let id = Uuid::new_v4().to_string();
        let meta = self.track(&id).await;
        (id, meta)
    }

    /// Register `id` unless it is already known, returning the stored
    /// metadata either way. A single write-lock section keeps concurrent
    /// first contacts for the same id from racing.
    pub async fn track(&self, id: &str) -> SessionMeta {
        let mut sessions = self.sessions.write().await;
        *sessions.entry(id.to_string()).or_insert_with(|| {
            info!("Registered session: {id}");
            SessionMeta {
                created_at: Utc::now(),
            }
        })
    }

    pub async fn exists(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn get(&self, id: &str) -> Option<SessionMeta> {
        self.sessions.read().await.get(id).copied()
    }

    /// Remove a session. Removing an unknown id is a no-op.
    pub async fn remove(&self, id: &str) {
        if self.sessions.write().await.remove(id).is_some() {
            info!("Removed session: {id}");
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn create_registers_a_unique_id() {
        let registry = SessionRegistry::new();
        let (first, _) = registry.create().await;
        let (second, _) = registry.create().await;

        assert_ne!(first, second);
        assert!(registry.exists(&first).await);
        assert!(registry.exists(&second).await);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn track_is_insert_if_absent() {
        let registry = SessionRegistry::new();
        let first = registry.track("abc").await;
        let second = registry.track("abc").await;

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn get_unknown_returns_none() {
        let registry = SessionRegistry::new();
        assert!(registry.get("missing").await.is_none());
        assert!(!registry.exists("missing").await);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.create().await;

        registry.remove(&id).await;
        assert!(!registry.exists(&id).await);

        // Second removal of the same id must be a silent no-op.
        registry.remove(&id).await;
        registry.remove("never-existed").await;
    }

    #[tokio::test]
    async fn concurrent_first_contact_registers_once() {
        let registry = Arc::new(SessionRegistry::new());

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.track("shared").await })
            })
            .collect();

        let mut stamps = Vec::new();
        for task in tasks {
            if let Ok(meta) = task.await {
                stamps.push(meta.created_at);
            }
        }

        assert_eq!(registry.len().await, 1);
        assert!(stamps.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
