use bigdecimal::{BigDecimal, Zero};
use std::fmt;

use crate::models::{CreateAccountRequest, NewAccount, UpdateAccountRequest};

const CURRENCY_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Violations collected from one request, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// One violation is surfaced verbatim, several as `{field=message, ...}`.
impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [] => f.write_str("Validation failed"),
            [only] => f.write_str(&only.message),
            many => {
                let pairs: Vec<String> = many
                    .iter()
                    .map(|v| format!("{}={}", v.field, v.message))
                    .collect();
                write!(f, "Multiple validation errors: {{{}}}", pairs.join(", "))
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

// initial_deposit is NUMERIC(12,2): at most 10 integer digits and 2 decimals.
const DEPOSIT_SCALE: i64 = 2;
const DEPOSIT_LIMIT: i64 = 10_000_000_000;

fn check_deposit(errors: &mut ValidationErrors, deposit: &BigDecimal) {
    if deposit <= &BigDecimal::zero() {
        errors.add("initialDeposit", "Initial deposit must be positive");
    } else if deposit.with_scale(DEPOSIT_SCALE) != *deposit {
        errors.add("initialDeposit", "Initial deposit must have at most 2 decimal places");
    } else if deposit >= &BigDecimal::from(DEPOSIT_LIMIT) {
        errors.add("initialDeposit", "Initial deposit must be less than 10000000000");
    }
}

fn check_branch(errors: &mut ValidationErrors, branch_id: i32) {
    if branch_id <= 0 {
        errors.add("branchId", "Branch ID must be positive");
    }
}

fn currency_len_ok(currency: &str) -> bool {
    currency.chars().count() == CURRENCY_LEN
}

/// Validates a create request and yields the checked values.
pub fn validate_create(req: &CreateAccountRequest) -> Result<NewAccount, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if req.client_id.is_none() {
        errors.add("clientId", "Client ID is required");
    }
    if req.acc_type.is_none() {
        errors.add("accType", "Account type is required");
    }
    if req.acc_status.is_none() {
        errors.add("accStatus", "Account status is required");
    }
    match &req.initial_deposit {
        None => errors.add("initialDeposit", "Initial deposit is required"),
        Some(deposit) => check_deposit(&mut errors, deposit),
    }
    match req.currency.as_deref() {
        None => errors.add("currency", "Currency is required"),
        Some(c) if c.trim().is_empty() => errors.add("currency", "Currency is required"),
        Some(c) if !currency_len_ok(c) => errors.add("currency", "Currency must be 3 characters"),
        Some(_) => {}
    }
    match req.branch_id {
        None => errors.add("branchId", "Branch ID is required"),
        Some(branch_id) => check_branch(&mut errors, branch_id),
    }

    errors.into_result()?;

    match (
        req.client_id,
        req.acc_type,
        req.acc_status,
        req.initial_deposit.clone(),
        req.currency.clone(),
        req.branch_id,
    ) {
        (
            Some(client_id),
            Some(acc_type),
            Some(acc_status),
            Some(initial_deposit),
            Some(currency),
            Some(branch_id),
        ) => Ok(NewAccount {
            client_id,
            acc_type,
            acc_status,
            initial_deposit,
            currency,
            branch_id,
        }),
        _ => Err(ValidationErrors::default()),
    }
}

/// Checks only the fields an update request actually carries.
pub fn validate_update(req: &UpdateAccountRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if let Some(deposit) = &req.initial_deposit {
        check_deposit(&mut errors, deposit);
    }
    if let Some(currency) = req.currency.as_deref() {
        if !currency_len_ok(currency) {
            errors.add("currency", "Currency must be 3 characters");
        } else if currency.trim().is_empty() {
            errors.add("currency", "Currency must not be blank");
        }
    }
    if let Some(branch_id) = req.branch_id {
        check_branch(&mut errors, branch_id);
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, AccountType};
    use std::str::FromStr;
    use uuid::Uuid;

    fn valid_create() -> CreateAccountRequest {
        CreateAccountRequest {
            client_id: Some(Uuid::new_v4()),
            acc_type: Some(AccountType::Savings),
            acc_status: Some(AccountStatus::Active),
            initial_deposit: Some(BigDecimal::from_str("1000.00").unwrap()),
            currency: Some("USD".to_string()),
            branch_id: Some(1),
        }
    }

    #[test]
    fn test_valid_create_yields_new_account() {
        let req = valid_create();
        let new_account = validate_create(&req).unwrap();
        assert_eq!(Some(new_account.client_id), req.client_id);
        assert_eq!(new_account.currency, "USD");
        assert_eq!(new_account.branch_id, 1);
    }

    #[test]
    fn test_negative_deposit_is_rejected() {
        let mut req = valid_create();
        req.initial_deposit = Some(BigDecimal::from_str("-100.00").unwrap());
        let err = validate_create(&req).unwrap_err();
        assert_eq!(err.to_string(), "Initial deposit must be positive");
    }

    #[test]
    fn test_zero_deposit_is_rejected() {
        let mut req = valid_create();
        req.initial_deposit = Some(BigDecimal::zero());
        assert!(validate_create(&req).is_err());
    }

    #[test]
    fn test_deposit_must_fit_the_column() {
        let mut req = valid_create();
        req.initial_deposit = Some(BigDecimal::from_str("0.001").unwrap());
        assert_eq!(
            validate_create(&req).unwrap_err().to_string(),
            "Initial deposit must have at most 2 decimal places"
        );

        req.initial_deposit = Some(BigDecimal::from_str("10000000000").unwrap());
        assert_eq!(
            validate_create(&req).unwrap_err().to_string(),
            "Initial deposit must be less than 10000000000"
        );

        // trailing zeros and the largest storable amount are fine
        req.initial_deposit = Some(BigDecimal::from_str("12.5000").unwrap());
        assert!(validate_create(&req).is_ok());
        req.initial_deposit = Some(BigDecimal::from_str("9999999999.99").unwrap());
        assert!(validate_create(&req).is_ok());
    }

    #[test]
    fn test_update_checks_deposit_scale() {
        let req = UpdateAccountRequest {
            initial_deposit: Some(BigDecimal::from_str("5.125").unwrap()),
            ..Default::default()
        };
        let err = validate_update(&req).unwrap_err();
        assert_eq!(err.violations()[0].field, "initialDeposit");
    }

    #[test]
    fn test_short_currency_is_rejected() {
        let mut req = valid_create();
        req.currency = Some("US".to_string());
        let err = validate_create(&req).unwrap_err();
        assert_eq!(err.to_string(), "Currency must be 3 characters");
    }

    #[test]
    fn test_blank_currency_is_required() {
        let mut req = valid_create();
        req.currency = Some("   ".to_string());
        let err = validate_create(&req).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.to_string(), "Currency is required");
    }

    #[test]
    fn test_missing_fields_are_reported_together() {
        let err = validate_create(&CreateAccountRequest::default()).unwrap_err();
        assert_eq!(err.violations().len(), 6);
        let message = err.to_string();
        assert!(message.starts_with("Multiple validation errors: {clientId=Client ID is required"));
        assert!(message.contains("branchId=Branch ID is required"));
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(validate_update(&UpdateAccountRequest::default()).is_ok());
    }

    #[test]
    fn test_update_checks_present_fields() {
        let req = UpdateAccountRequest {
            initial_deposit: Some(BigDecimal::from_str("-1").unwrap()),
            currency: Some("EURO".to_string()),
            branch_id: Some(0),
            ..Default::default()
        };
        let err = validate_update(&req).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["initialDeposit", "currency", "branchId"]);
    }

    #[test]
    fn test_update_rejects_blank_currency() {
        let req = UpdateAccountRequest {
            currency: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_update(&req).unwrap_err().to_string(),
            "Currency must not be blank"
        );
    }
}
