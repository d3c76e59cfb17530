use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::db::account_queries;
use crate::models::Account;
use crate::store::{AccountStore, StoreError};

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn save(&self, account: Account) -> Result<Account, StoreError> {
        Ok(account_queries::upsert(&self.pool, &account).await?)
    }

    async fn update(&self, account: Account) -> Result<Option<Account>, StoreError> {
        Ok(account_queries::update(&self.pool, &account).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(account_queries::fetch_one(&self.pool, id).await?)
    }

    async fn find_by_client_id(&self, client_id: Uuid) -> Result<Vec<Account>, StoreError> {
        Ok(account_queries::fetch_by_client(&self.pool, client_id).await?)
    }

    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(account_queries::fetch_all(&self.pool).await?)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(account_queries::exists(&self.pool, id).await?)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<u64, StoreError> {
        Ok(account_queries::delete(&self.pool, id).await?)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
