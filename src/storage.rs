use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::RwLock;

/// Keys under which the app keeps its state.
pub mod keys {
    pub const DAILY_CALORIES: &str = "dailyCalories";
    pub const DAILY_FOODS: &str = "dailyFoods";
    pub const USER_PROFILE: &str = "userProfile";
    pub const ONBOARDING_COMPLETE: &str = "hasCompletedOnboarding";
}

/// String-to-string store the app persists its JSON blobs into.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Write several keys. Backends that can should make this all-or-nothing.
    async fn set_many(&self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }
}

const UPSERT: &str = r#"
    INSERT INTO kv_store (key, value)
    VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
"#;

#[derive(Clone)]
pub struct SqliteStore {
    db: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(r#"SELECT value FROM kv_store WHERE key = ?1"#)
            .bind(key)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("kv get {key}"))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .execute(&self.db)
            .await
            .with_context(|| format!("kv set {key}"))?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(*key)
                .bind(value.as_str())
                .execute(&mut *tx)
                .await
                .with_context(|| format!("kv set {key}"))?;
        }
        tx.commit().await.context("commit tx")?;
        Ok(())
    }
}

/// Process-local store, lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> anyhow::Result<()> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}
