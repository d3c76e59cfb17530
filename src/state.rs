use crate::services::account_service::AccountService;

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
}
