//! Defines the endpoint for recording a transfer between two accounts.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
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
    transfer::core::{NewTransfer, record_transfer},
};

/// The state needed to record a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransferState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The form data for recording a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferForm {
    /// Text detailing the transfer.
    pub description: String,
    /// The account the money is taken from.
    pub account_origin: AccountId,
    /// The account the money is paid into.
    pub account_destination: AccountId,
    /// The amount of money to move.
    pub value: Decimal,
}

/// A route handler for recording a transfer, redirects to the transactions
/// view on success.
///
/// Both accounts only have to exist. The origin and destination may be the
/// same account and neither is scoped to the acting user. See DESIGN.md.
pub async fn create_transfer_endpoint(
    State(state): State<CreateTransferState>,
    Form(form): Form<TransferForm>,
) -> Response {
    let Some(local_timezone) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let today = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    for account_id in [form.account_origin, form.account_destination] {
        match get_account(account_id, &connection) {
            Ok(_) => {}
            Err(Error::NotFound) => {
                return Error::InvalidAccount(Some(account_id)).into_alert_response();
            }
            Err(error) => {
                tracing::error!("could not look up account {account_id}: {error}");
                return error.into_alert_response();
            }
        }
    }

    let transfer = NewTransfer {
        description: form.description,
        account_origin: form.account_origin,
        account_destination: form.account_destination,
        value: form.value,
        date: today,
    };

    if let Err(error) = record_transfer(transfer, &mut connection) {
        tracing::error!("could not record transfer: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
