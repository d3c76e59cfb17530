use sqlx::PgPool;
use uuid::Uuid;
use crate::models::Account;

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT account_id, client_id, account_type, account_status, opening_date,
                initial_deposit, currency, branch_id
         FROM account
         ORDER BY opening_date ASC"
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT account_id, client_id, account_type, account_status, opening_date,
                initial_deposit, currency, branch_id
         FROM account
         WHERE account_id = $1"
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_client(pool: &PgPool, client_id: Uuid) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT account_id, client_id, account_type, account_status, opening_date,
                initial_deposit, currency, branch_id
         FROM account
         WHERE client_id = $1
         ORDER BY opening_date ASC"
    )
    .bind(client_id)
    .fetch_all(pool)
    .await
}

// opening_date and client_id are never rewritten once the row exists.
pub async fn upsert(pool: &PgPool, account: &Account) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "INSERT INTO account (account_id, client_id, account_type, account_status, opening_date,
                              initial_deposit, currency, branch_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (account_id)
         DO UPDATE SET
             account_type = EXCLUDED.account_type,
             account_status = EXCLUDED.account_status,
             initial_deposit = EXCLUDED.initial_deposit,
             currency = EXCLUDED.currency,
             branch_id = EXCLUDED.branch_id
         RETURNING account_id, client_id, account_type, account_status, opening_date,
                   initial_deposit, currency, branch_id"
    )
    .bind(account.id)
    .bind(account.client_id)
    .bind(account.acc_type)
    .bind(account.acc_status)
    .bind(account.opening_date)
    .bind(&account.initial_deposit)
    .bind(&account.currency)
    .bind(account.branch_id)
    .fetch_one(pool)
    .await
}

pub async fn update(pool: &PgPool, account: &Account) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "UPDATE account
         SET account_type = $2,
             account_status = $3,
             initial_deposit = $4,
             currency = $5,
             branch_id = $6
         WHERE account_id = $1
         RETURNING account_id, client_id, account_type, account_status, opening_date,
                   initial_deposit, currency, branch_id"
    )
    .bind(account.id)
    .bind(account.acc_type)
    .bind(account.acc_status)
    .bind(&account.initial_deposit)
    .bind(&account.currency)
    .bind(account.branch_id)
    .fetch_optional(pool)
    .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM account WHERE account_id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM account WHERE account_id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
