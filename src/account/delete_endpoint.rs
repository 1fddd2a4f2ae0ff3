//! Defines the endpoint for deleting the account chosen on the deletion page.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, account::core::AccountId, endpoints};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for deleting an account.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountForm {
    /// The account chosen for deletion.
    pub account: AccountId,
}

/// A route handler for deleting an account, redirects to the accounts view on success.
///
/// The account's transactions are removed by the cascade policy on the
/// transaction table.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    Form(form): Form<DeleteAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_account(form.account, &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::DeleteMissingAccount.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete account {}: {error}", form.account);
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn delete_account(id: AccountId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM account WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}

#[cfg(test)]
mod delete_account_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::State,
        http::{HeaderValue, StatusCode},
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        account::core::get_account,
        db::initialize,
        endpoints,
        test_utils::{insert_test_account, insert_test_user},
    };

    use super::{DeleteAccountForm, DeleteAccountState, delete_account_endpoint};

    fn get_test_state() -> (DeleteAccountState, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(&connection, "test", "test@email.com");
        let account_id = insert_test_account(&connection, user.id, "Checking", "123.45");

        (
            DeleteAccountState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            account_id,
        )
    }

    #[tokio::test]
    async fn deletes_chosen_account() {
        let (state, account_id) = get_test_state();

        let response = delete_account_endpoint(
            State(state.clone()),
            Form(DeleteAccountForm {
                account: account_id,
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("hx-redirect"),
            Some(&HeaderValue::from_str(endpoints::ACCOUNTS_VIEW).unwrap())
        );

        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_account(account_id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn deleting_account_cascades_to_transactions() {
        let (state, account_id) = get_test_state();

        {
            let connection = state.db_connection.lock().unwrap();
            connection
                .execute(
                    "INSERT INTO \"transaction\" (account_id, description, value, date, kind) \
                    VALUES (?1, 'Coffee', '-4.50', '2026-08-07', 'expense')",
                    (account_id,),
                )
                .unwrap();
        }

        delete_account_endpoint(
            State(state.clone()),
            Form(DeleteAccountForm {
                account: account_id,
            }),
        )
        .await;

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 0, "want transactions deleted with their account");
    }

    #[tokio::test]
    async fn deleting_missing_account_returns_alert() {
        let (state, _) = get_test_state();

        let response =
            delete_account_endpoint(State(state), Form(DeleteAccountForm { account: 42 })).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
