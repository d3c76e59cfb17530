use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "account_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Savings,
    Checking,
    Investment,
    Business,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "SAVINGS",
            AccountType::Checking => "CHECKING",
            AccountType::Investment => "INVESTMENT",
            AccountType::Business => "BUSINESS",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "account_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Pending,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Inactive => "INACTIVE",
            AccountStatus::Pending => "PENDING",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// A bank account owned by a client. Column names follow the `account` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Account {
    #[sqlx(rename = "account_id")]
    pub id: Uuid,
    pub client_id: Uuid,
    #[sqlx(rename = "account_type")]
    pub acc_type: AccountType,
    #[sqlx(rename = "account_status")]
    pub acc_status: AccountStatus,
    pub opening_date: DateTime<Utc>,
    pub initial_deposit: BigDecimal,
    pub currency: String,
    pub branch_id: i32,
}

impl Account {
    pub fn new(input: NewAccount) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id: input.client_id,
            acc_type: input.acc_type,
            acc_status: input.acc_status,
            opening_date: Utc::now(),
            initial_deposit: input.initial_deposit,
            currency: input.currency,
            branch_id: input.branch_id,
        }
    }
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub client_id: Uuid,
    pub acc_type: AccountType,
    pub acc_status: AccountStatus,
    pub initial_deposit: BigDecimal,
    pub currency: String,
    pub branch_id: i32,
}

// Every field is optional so that missing values surface as validation
// failures ("... is required") rather than as malformed JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub client_id: Option<Uuid>,
    pub acc_type: Option<AccountType>,
    pub acc_status: Option<AccountStatus>,
    pub initial_deposit: Option<BigDecimal>,
    pub currency: Option<String>,
    pub branch_id: Option<i32>,
}

/// Partial update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub acc_type: Option<AccountType>,
    pub acc_status: Option<AccountStatus>,
    pub initial_deposit: Option<BigDecimal>,
    pub currency: Option<String>,
    pub branch_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub acc_type: AccountType,
    pub acc_status: AccountStatus,
    pub opening_date: DateTime<Utc>,
    pub initial_deposit: BigDecimal,
    pub currency: String,
    pub branch_id: i32,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            client_id: account.client_id,
            acc_type: account.acc_type,
            acc_status: account.acc_status,
            opening_date: account.opening_date,
            initial_deposit: account.initial_deposit,
            currency: account.currency,
            branch_id: account.branch_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_enums_use_upper_case_names_on_the_wire() {
        assert_eq!(serde_json::to_string(&AccountType::Savings).unwrap(), "\"SAVINGS\"");
        assert_eq!(serde_json::to_string(&AccountStatus::Inactive).unwrap(), "\"INACTIVE\"");
        let parsed: AccountType = serde_json::from_str("\"BUSINESS\"").unwrap();
        assert_eq!(parsed, AccountType::Business);
        assert!(serde_json::from_str::<AccountType>("\"savings\"").is_err());
    }

    #[test]
    fn test_update_request_distinguishes_absent_fields() {
        let req: UpdateAccountRequest =
            serde_json::from_str(r#"{"accType":"CHECKING"}"#).unwrap();
        assert_eq!(req.acc_type, Some(AccountType::Checking));
        assert!(req.acc_status.is_none());
        assert!(req.initial_deposit.is_none());
        assert!(req.currency.is_none());
        assert!(req.branch_id.is_none());
    }

    #[test]
    fn test_response_is_a_field_copy() {
        let account = Account::new(NewAccount {
            client_id: Uuid::new_v4(),
            acc_type: AccountType::Investment,
            acc_status: AccountStatus::Pending,
            initial_deposit: BigDecimal::from_str("250.50").unwrap(),
            currency: "EUR".to_string(),
            branch_id: 7,
        });
        let response = AccountResponse::from(account.clone());

        assert_eq!(response.id, account.id);
        assert_eq!(response.client_id, account.client_id);
        assert_eq!(response.opening_date, account.opening_date);
        assert_eq!(response.initial_deposit, account.initial_deposit);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["accType"], "INVESTMENT");
        assert_eq!(json["accStatus"], "PENDING");
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["branchId"], 7);
    }
}
