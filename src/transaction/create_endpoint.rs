//! Defines the endpoint for recording a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{AccountId, get_account},
    endpoints,
    timezone::get_local_offset,
    transaction::core::{NewTransaction, TransactionKind, create_transaction},
    user::UserId,
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for recording a transaction.
///
/// The transaction date and kind are not part of the form: the date is the
/// current date and the kind follows the sign of the value.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    /// Text detailing the transaction.
    pub description: String,
    /// The account to record the transaction against.
    pub account: AccountId,
    /// The value of the transaction in dollars.
    pub value: Decimal,
}

/// A route handler for recording a new transaction, redirects to the
/// transactions view on success.
///
/// The submitted account must be owned by the acting user. The response does
/// not reveal whether an out-of-scope account exists.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_timezone) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match get_account(form.account, &connection) {
        Ok(account) if account.user_id == user_id => {}
        Ok(_) | Err(Error::NotFound) => {
            return Error::InvalidAccount(Some(form.account)).into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not look up account {}: {error}", form.account);
            return error.into_alert_response();
        }
    }

    let kind = if form.value.is_sign_negative() {
        TransactionKind::Expense
    } else {
        TransactionKind::Income
    };

    let new_transaction = NewTransaction {
        account_id: form.account,
        description: form.description,
        value: form.value,
        date: today,
        kind,
    };

    if let Err(error) = create_transaction(new_transaction, &connection) {
        tracing::error!("could not create transaction: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
