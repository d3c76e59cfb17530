use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::{AccountResponse, CreateAccountRequest, UpdateAccountRequest};
use crate::state::AppState;
use crate::validation;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_account).get(list_accounts))
        .route("/client/:client_id", get(list_client_accounts))
        .route(
            "/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// Optional `?userId=` used only for audit attribution.
#[derive(Debug, Default, Deserialize)]
pub struct ActorParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl ActorParams {
    fn actor(&self) -> Result<Option<&str>, AppError> {
        match self.user_id.as_deref() {
            Some(user_id) if user_id.trim().is_empty() => {
                Err(AppError::InvalidRequest("userId must not be blank".to_string()))
            }
            other => Ok(other),
        }
    }
}

#[axum::debug_handler]
pub async fn create_account(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ActorParams>,
    AppJson(data): AppJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let actor = params.actor()?;
    info!("POST /accounts - Creating account for client {:?} by user {:?}", data.client_id, actor);

    let input = validation::validate_create(&data)?;
    let account = state.accounts.create(input, actor).await.map_err(|e| {
        error!("Failed to create account: {}", e);
        e
    })?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    info!("GET /accounts - Fetching all accounts");
    let accounts = state.accounts.get_all().await.map_err(|e| {
        error!("Failed to fetch accounts: {}", e);
        e
    })?;
    Ok(Json(accounts))
}

pub async fn list_client_accounts(
    State(state): State<AppState>,
    AppPath(client_id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ActorParams>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let actor = params.actor()?;
    info!("GET /accounts/client/{} - Fetching client accounts", client_id);
    let accounts = state
        .accounts
        .get_by_client_id(client_id, actor)
        .await
        .map_err(|e| {
            error!("Failed to fetch accounts for client {}: {}", client_id, e);
            e
        })?;
    Ok(Json(accounts))
}

pub async fn get_account(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ActorParams>,
) -> Result<Json<AccountResponse>, AppError> {
    let actor = params.actor()?;
    info!("GET /accounts/{} - Fetching account by user {:?}", id, actor);
    let account = state
        .accounts
        .get_by_id(id, actor)
        .await
        .map_err(|e| {
            error!("Failed to fetch account {}: {}", id, e);
            e
        })?
        .ok_or_else(|| AppError::NotFound(format!("Account not found with ID: {}", id)))?;
    Ok(Json(account))
}

pub async fn update_account(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ActorParams>,
    AppJson(data): AppJson<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let actor = params.actor()?;
    info!("PUT /accounts/{} - Updating account by user {:?}", id, actor);

    validation::validate_update(&data)?;
    let account = state.accounts.update(id, data, actor).await.map_err(|e| {
        error!("Failed to update account {}: {}", id, e);
        e
    })?;
    Ok(Json(account))
}

pub async fn delete_account(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<ActorParams>,
) -> Result<StatusCode, AppError> {
    let actor = params.actor()?;
    info!("DELETE /accounts/{} - Deleting account by user {:?}", id, actor);
    state.accounts.delete(id, actor).await.map_err(|e| {
        error!("Failed to delete account {}: {}", id, e);
        e
    })?;
    Ok(StatusCode::NO_CONTENT)
}
