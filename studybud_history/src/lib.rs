#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Durable conversation history backed by SQLite.
//!
//! Messages are stored one row each; the auto-increment primary key is the
//! authoritative ordering within a session, so insertion order survives
//! timestamp-resolution ties.

mod entity;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
};
use std::path::PathBuf;
use studybud_core::{HistoryStore, Role, StoredMessage};
use tracing::info;

use crate::entity::conversations;

fn is_table_already_exists_error(err: &DbErr) -> bool {
    err.to_string().contains("table") && err.to_string().contains("already exists")
}

/// SQLite-backed [`HistoryStore`].
pub struct ConversationStore {
    db: DatabaseConnection,
}

impl ConversationStore {
    /// Open (or create) the store at the given file path.
    pub async fn new(db_path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::connect(&format!("sqlite:{}?mode=rwc", db_path.display())).await
    }

    /// Connect to an arbitrary database URL (`sqlite::memory:` in tests).
    pub async fn connect(db_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database: {}", db_url);

        let db = Database::connect(db_url).await?;

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let stmt = schema.create_table_from_entity(conversations::Entity);
        match db.execute_unprepared(&backend.build(&stmt).to_string()).await {
            Ok(_) => {}
            Err(e) if is_table_already_exists_error(&e) => {
                info!("Table already exists, skipping creation");
            }
            Err(e) => return Err(e.into()),
        }

        info!("ConversationStore initialized");
        Ok(Self { db })
    }
}

#[async_trait]
impl HistoryStore for ConversationStore {
    async fn append(&self, session_id: &str, role: Role, text: &str) -> anyhow::Result<()> {
        conversations::ActiveModel {
            session_id: Set(session_id.to_string()),
            role: Set(role.as_str().to_string()),
            message: Set(text.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!("Appended {} message to session: {session_id}", role.as_str());
        Ok(())
    }

    async fn list(&self, session_id: &str, limit: u64) -> anyhow::Result<Vec<StoredMessage>> {
        let mut rows = conversations::Entity::find()
            .filter(conversations::Column::SessionId.eq(session_id))
            .order_by_desc(conversations::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;
        rows.reverse();

        Ok(rows
            .into_iter()
            .map(|row| StoredMessage {
                role: Role::parse(&row.role),
                text: row.message,
                timestamp: row.created_at.and_utc(),
            })
            .collect())
    }

    async fn clear(&self, session_id: &str) -> anyhow::Result<()> {
        let result = conversations::Entity::delete_many()
            .filter(conversations::Column::SessionId.eq(session_id))
            .exec(&self.db)
            .await?;

        info!(
            "Cleared {} messages for session: {session_id}",
            result.rows_affected
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn memory_store() -> ConversationStore {
        ConversationStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn list_preserves_append_order() {
        let store = memory_store().await;

        store.append("s1", Role::User, "first").await.unwrap();
        store.append("s1", Role::Bot, "second").await.unwrap();
        store.append("s1", Role::User, "third").await.unwrap();

        let messages = store.list("s1", 50).await.unwrap();
        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Bot);
    }

    #[tokio::test]
    async fn list_bounds_to_most_recent_entries() {
        let store = memory_store().await;

        for i in 0..5 {
            store
                .append("s1", Role::User, &format!("msg {i}"))
                .await
                .unwrap();
        }

        let messages = store.list("s1", 2).await.unwrap();
        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["msg 3", "msg 4"]);
    }

    #[tokio::test]
    async fn sessions_are_partitioned() {
        let store = memory_store().await;

        store.append("a", Role::User, "for a").await.unwrap();
        store.append("b", Role::User, "for b").await.unwrap();

        let messages = store.list("a", 50).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "for a");
    }

    #[tokio::test]
    async fn clear_removes_only_the_target_session() {
        let store = memory_store().await;

        store.append("a", Role::User, "for a").await.unwrap();
        store.append("b", Role::User, "for b").await.unwrap();

        store.clear("a").await.unwrap();

        assert!(store.list("a", 50).await.unwrap().is_empty());
        assert_eq!(store.list("b", 50).await.unwrap().len(), 1);

        // Clearing again, or clearing an unknown session, is a no-op.
        store.clear("a").await.unwrap();
        store.clear("never-seen").await.unwrap();
    }

    #[tokio::test]
    async fn list_unknown_session_is_empty() {
        let store = memory_store().await;
        assert!(store.list("missing", 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn timestamps_are_monotonic_in_list_order() {
        let store = memory_store().await;

        for i in 0..4 {
            store
                .append("s1", Role::User, &format!("msg {i}"))
                .await
                .unwrap();
        }

        let messages = store.list("s1", 50).await.unwrap();
        assert!(
            messages
                .windows(2)
                .all(|pair| pair[0].timestamp <= pair[1].timestamp)
        );
    }
}
