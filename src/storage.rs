use std::future::Future;

use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};

use crate::entities::local_storage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend: {0}")]
    Backend(#[from] sea_orm::DbErr),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-keyed record store. Values are opaque text; callers own the encoding.
pub trait LocalStorage: Send + Sync {
    fn get_item(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Overwrites whatever was stored under `key`.
    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

#[derive(Clone)]
pub struct SqliteStorage {
    db: DatabaseConnection,
}

impl SqliteStorage {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl LocalStorage for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = local_storage::Entity::find_by_id(key.to_string()).one(&self.db).await?;
        Ok(row.map(|r| r.value))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let model = local_storage::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now_sec()),
        };

        local_storage::Entity::insert(model)
            .on_conflict(
                OnConflict::column(local_storage::Column::Key)
                    .update_columns([
                        local_storage::Column::Value,
                        local_storage::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        tracing::trace!(key = %key, bytes = value.len(), "stored item");
        Ok(())
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
