use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Account;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Persistent account records keyed by id, with a secondary lookup by client.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts the record when its id is not stored yet, otherwise overwrites it.
    async fn save(&self, account: Account) -> Result<Account, StoreError>;

    /// Rewrites the mutable columns of an existing record. `None` when the id
    /// is no longer stored; a missing record is never inserted.
    async fn update(&self, account: Account) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Records owned by `client_id` in creation order; empty when there are none.
    async fn find_by_client_id(&self, client_id: Uuid) -> Result<Vec<Account>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Account>, StoreError>;

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Returns how many records were removed (0 or 1).
    async fn delete_by_id(&self, id: Uuid) -> Result<u64, StoreError>;

    fn backend_name(&self) -> &'static str;
}
