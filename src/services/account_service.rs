use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Account, AccountResponse, NewAccount, UpdateAccountRequest};
use crate::services::audit::{AuditSink, UNKNOWN_ACTOR};
use crate::store::AccountStore;

/// A single field rewritten by an update, rendered for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub attribute: &'static str,
    pub before: String,
    pub after: String,
}

fn apply_change<T: PartialEq + fmt::Display>(
    changes: &mut Vec<FieldChange>,
    attribute: &'static str,
    current: &mut T,
    incoming: Option<T>,
) {
    if let Some(value) = incoming {
        if *current != value {
            changes.push(FieldChange {
                attribute,
                before: current.to_string(),
                after: value.to_string(),
            });
            *current = value;
        }
    }
}

fn ensure_not_nil(id: Uuid, label: &str) -> Result<(), AppError> {
    if id.is_nil() {
        return Err(AppError::InvalidRequest(format!("{} must not be nil", label)));
    }
    Ok(())
}

/// Two decimals, half-up.
fn format_amount(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Account not found with ID: {}", id))
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    audit: Arc<dyn AuditSink>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { store, audit }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn audit_enabled(&self) -> bool {
        self.audit.is_enabled()
    }

    pub async fn create(
        &self,
        input: NewAccount,
        actor: Option<&str>,
    ) -> Result<AccountResponse, AppError> {
        info!("Creating new account for client ID: {}", input.client_id);
        ensure_not_nil(input.client_id, "Client ID")?;

        let remarks = format!(
            "Account created with type: {}, initial deposit: {} {}, at branch ID: {}",
            input.acc_type,
            format_amount(&input.initial_deposit),
            input.currency,
            input.branch_id
        );
        let saved = self.store.save(Account::new(input)).await?;
        info!("Account created successfully with ID: {}", saved.id);

        self.audit.send_create_log(
            actor.unwrap_or(UNKNOWN_ACTOR),
            &saved.client_id.to_string(),
            &remarks,
        );
        Ok(AccountResponse::from(saved))
    }

    pub async fn delete(&self, id: Uuid, actor: Option<&str>) -> Result<(), AppError> {
        info!("Attempting to delete account with ID: {}", id);
        ensure_not_nil(id, "Account ID")?;

        let account = match self.store.find_by_id(id).await? {
            Some(account) => account,
            None => {
                warn!("Account with ID {} not found for deletion", id);
                return Err(not_found(id));
            }
        };

        // a concurrent delete may have won between the lookup and here
        if self.store.delete_by_id(id).await? == 0 {
            warn!("Account with ID {} was removed before it could be deleted", id);
            return Err(not_found(id));
        }
        info!("Account with ID {} deleted successfully", id);

        let client_id = account.client_id.to_string();
        let remarks = format!("Account for {} with ID {} deleted.", client_id, id);
        self.audit
            .send_delete_log(actor.unwrap_or(UNKNOWN_ACTOR), &client_id, &remarks);
        Ok(())
    }

    pub async fn get_by_id(
        &self,
        id: Uuid,
        actor: Option<&str>,
    ) -> Result<Option<AccountResponse>, AppError> {
        info!("Retrieving account with ID: {}", id);
        ensure_not_nil(id, "Account ID")?;

        match self.store.find_by_id(id).await? {
            Some(account) => {
                let client_id = account.client_id.to_string();
                let remarks = format!("Account for {} with ID {} accessed.", client_id, id);
                self.audit
                    .send_read_log(actor.unwrap_or(UNKNOWN_ACTOR), &client_id, &remarks);
                Ok(Some(AccountResponse::from(account)))
            }
            None => {
                warn!("Account not found with ID: {}", id);
                Ok(None)
            }
        }
    }

    pub async fn get_by_client_id(
        &self,
        client_id: Uuid,
        actor: Option<&str>,
    ) -> Result<Vec<AccountResponse>, AppError> {
        info!("Retrieving accounts for client ID: {}", client_id);
        ensure_not_nil(client_id, "Client ID")?;

        let accounts = self.store.find_by_client_id(client_id).await?;
        info!("Found {} accounts for client ID: {}", accounts.len(), client_id);

        let actor = actor.unwrap_or(UNKNOWN_ACTOR);
        let remarks = format!(
            "Retrieved {} accounts for client {} by agent {}.",
            accounts.len(),
            client_id,
            actor
        );
        self.audit.send_read_log(actor, &client_id.to_string(), &remarks);

        Ok(accounts.into_iter().map(AccountResponse::from).collect())
    }

    pub async fn get_all(&self) -> Result<Vec<AccountResponse>, AppError> {
        info!("Retrieving all accounts");
        let accounts = self.store.find_all().await?;
        info!("Found {} total accounts", accounts.len());
        Ok(accounts.into_iter().map(AccountResponse::from).collect())
    }

    /// Applies the fields present in `input`; absent fields keep their stored value.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAccountRequest,
        actor: Option<&str>,
    ) -> Result<AccountResponse, AppError> {
        info!("Updating account with ID: {}", id);
        ensure_not_nil(id, "Account ID")?;

        let mut account = match self.store.find_by_id(id).await? {
            Some(account) => account,
            None => {
                warn!("Account with ID {} not found for update", id);
                return Err(not_found(id));
            }
        };

        let mut changes = Vec::new();
        apply_change(&mut changes, "Account Type", &mut account.acc_type, input.acc_type);
        apply_change(&mut changes, "Account Status", &mut account.acc_status, input.acc_status);
        apply_change(
            &mut changes,
            "Initial Deposit",
            &mut account.initial_deposit,
            input.initial_deposit,
        );
        apply_change(&mut changes, "Currency", &mut account.currency, input.currency);
        apply_change(&mut changes, "Branch ID", &mut account.branch_id, input.branch_id);

        // a concurrent delete leaves nothing to update; the row is not recreated
        let updated = match self.store.update(account).await? {
            Some(updated) => updated,
            None => {
                warn!("Account with ID {} was removed before it could be updated", id);
                return Err(not_found(id));
            }
        };
        info!(
            "Account with ID {} updated successfully ({} field(s) changed)",
            id,
            changes.len()
        );

        if !changes.is_empty() {
            self.audit_update(actor.unwrap_or(UNKNOWN_ACTOR), &updated, &changes);
        }
        Ok(AccountResponse::from(updated))
    }

    // One consolidated event; names, before and after values are joined with " | ".
    fn audit_update(&self, actor: &str, account: &Account, changes: &[FieldChange]) {
        let names: Vec<&str> = changes.iter().map(|c| c.attribute).collect();
        let before: Vec<&str> = changes.iter().map(|c| c.before.as_str()).collect();
        let after: Vec<&str> = changes.iter().map(|c| c.after.as_str()).collect();
        let remarks = format!(
            "Updated attributes for account ID {}: [{}]",
            account.id,
            names.join(", ")
        );
        self.audit.send_update_log(
            actor,
            &account.client_id.to_string(),
            &names.join(" | "),
            &before.join(" | "),
            &after.join(" | "),
            &remarks,
        );
    }
}
