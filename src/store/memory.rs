use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::Account;
use crate::store::{AccountStore, StoreError};

/// Insertion-ordered store kept in process memory.
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<Vec<Account>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

// same columns the postgres upsert and update rewrite
fn overwrite(existing: &mut Account, account: Account) -> Account {
    existing.acc_type = account.acc_type;
    existing.acc_status = account.acc_status;
    existing.initial_deposit = account.initial_deposit;
    existing.currency = account.currency;
    existing.branch_id = account.branch_id;
    existing.clone()
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn save(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write();
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => Ok(overwrite(existing, account)),
            None => {
                accounts.push(account.clone());
                Ok(account)
            }
        }
    }

    async fn update(&self, account: Account) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.write();
        Ok(accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .map(|existing| overwrite(existing, account)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_client_id(&self, client_id: Uuid) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .iter()
            .filter(|a| a.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.read().clone())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.accounts.read().iter().any(|a| a.id == id))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut accounts = self.accounts.write();
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok((before - accounts.len()) as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, AccountType, NewAccount};
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn account_for(client_id: Uuid, branch_id: i32) -> Account {
        Account::new(NewAccount {
            client_id,
            acc_type: AccountType::Savings,
            acc_status: AccountStatus::Active,
            initial_deposit: BigDecimal::from_str("100.00").unwrap(),
            currency: "USD".to_string(),
            branch_id,
        })
    }

    #[tokio::test]
    async fn test_save_inserts_then_overwrites() {
        let store = InMemoryAccountStore::new();
        let mut account = account_for(Uuid::new_v4(), 1);

        store.save(account.clone()).await.unwrap();
        assert_eq!(store.len(), 1);

        account.branch_id = 9;
        let saved = store.save(account.clone()).await.unwrap();
        assert_eq!(saved.branch_id, 9);
        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(account.id).await.unwrap().unwrap().branch_id, 9);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_opening_date() {
        let store = InMemoryAccountStore::new();
        let account = account_for(Uuid::new_v4(), 1);
        store.save(account.clone()).await.unwrap();

        let mut changed = account.clone();
        changed.opening_date = account.opening_date + chrono::Duration::days(3);
        let saved = store.save(changed).await.unwrap();
        assert_eq!(saved.opening_date, account.opening_date);
    }

    #[tokio::test]
    async fn test_update_never_inserts_missing_record() {
        let store = InMemoryAccountStore::new();
        let mut account = store.save(account_for(Uuid::new_v4(), 1)).await.unwrap();

        account.branch_id = 5;
        let updated = store.update(account.clone()).await.unwrap().unwrap();
        assert_eq!(updated.branch_id, 5);

        store.delete_by_id(account.id).await.unwrap();
        assert!(store.update(account.clone()).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_client_keeps_insertion_order() {
        let store = InMemoryAccountStore::new();
        let client = Uuid::new_v4();
        let first = store.save(account_for(client, 1)).await.unwrap();
        store.save(account_for(Uuid::new_v4(), 2)).await.unwrap();
        let second = store.save(account_for(client, 3)).await.unwrap();

        let found = store.find_by_client_id(client).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);

        assert!(store.find_by_client_id(Uuid::new_v4()).await.unwrap().is_empty());
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_reports_removed_rows() {
        let store = InMemoryAccountStore::new();
        let account = store.save(account_for(Uuid::new_v4(), 1)).await.unwrap();

        assert!(store.exists_by_id(account.id).await.unwrap());
        assert_eq!(store.delete_by_id(account.id).await.unwrap(), 1);
        assert_eq!(store.delete_by_id(account.id).await.unwrap(), 0);
        assert!(!store.exists_by_id(account.id).await.unwrap());
    }
}
