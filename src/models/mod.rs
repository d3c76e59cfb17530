mod account;

pub use account::{
    Account, AccountResponse, AccountStatus, AccountType, CreateAccountRequest, NewAccount,
    UpdateAccountRequest,
};
