//! Defines the endpoint for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::Account,
    endpoints,
    user::UserId,
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating an account.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    /// The account name.
    pub name: String,
    /// The balance in dollars.
    pub balance: Decimal,
}

/// A route handler for creating a new account, redirects to the accounts view on success.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<AccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_account(user_id, &form, &connection) {
        tracing::error!("Could not create account with {form:?}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

pub fn create_account(
    user_id: UserId,
    form: &AccountForm,
    connection: &Connection,
) -> Result<Account, Error> {
    let name = form.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    connection.execute(
        "INSERT INTO account (user_id, name, balance) VALUES (?1, ?2, ?3)",
        params![user_id.as_i64(), name, form.balance.to_string()],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Account {
        id,
        user_id,
        name: name.to_owned(),
        balance: form.balance,
    })
}
