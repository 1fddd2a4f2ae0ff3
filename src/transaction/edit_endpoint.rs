//! Defines the endpoint for updating an existing transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    account::{AccountId, get_account},
    database_id::TransactionId,
    endpoints,
    transaction::core::{NewTransaction, TransactionKind, update_transaction},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for the full transaction editor. Every field is required.
#[derive(Debug, Deserialize)]
pub struct EditTransactionForm {
    /// Text detailing the transaction.
    pub description: String,
    /// The account the transaction belongs to.
    pub account: AccountId,
    /// The value of the transaction in dollars.
    pub value: Decimal,
    /// When the transaction happened.
    pub transaction_date: Date,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
}

/// A route handler for updating a transaction, redirects to the transactions
/// view on success.
///
/// The chosen account only has to exist, the full editor does not scope
/// accounts to the acting user.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<EditTransactionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match get_account(form.account, &connection) {
        Ok(_) => {}
        Err(Error::NotFound) => {
            return Error::InvalidAccount(Some(form.account)).into_alert_response();
        }
        Err(error) => {
            tracing::error!("could not look up account {}: {error}", form.account);
            return error.into_alert_response();
        }
    }

    let updated_fields = NewTransaction {
        account_id: form.account,
        description: form.description,
        value: form.value,
        date: form.transaction_date,
        kind: form.kind,
    };

    match update_transaction(transaction_id, &updated_fields, &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingTransaction.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
