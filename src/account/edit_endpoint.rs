//! Defines the endpoint for updating an account's name and balance.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{AppState, Error, account::core::AccountId, endpoints};

/// The state needed to edit an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditAccountForm {
    name: String,
    balance: Decimal,
}

/// A route handler for updating an account, redirects to the accounts view on success.
pub async fn edit_account_endpoint(
    State(state): State<EditAccountState>,
    Path(account_id): Path<AccountId>,
    Form(form): Form<EditAccountForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_account(account_id, &form, &connection) {
        Ok(rows_affected) if rows_affected != 0 => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Ok(_) => Error::UpdateMissingAccount.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

type RowsAffected = usize;

fn update_account(
    id: AccountId,
    account: &EditAccountForm,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let name = account.name.trim();

    if name.is_empty() {
        return Err(Error::EmptyAccountName);
    }

    connection
        .execute(
            "UPDATE account SET name = ?1, balance = ?2 WHERE id = ?3",
            params![name, account.balance.to_string(), id],
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod edit_account_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        extract::{Path, State},
        http::{HeaderValue, StatusCode},
    };
    use rusqlite::Connection;
    use rust_decimal::Decimal;

    use crate::{
        account::core::get_account,
        db::initialize,
        endpoints,
        test_utils::{insert_test_account, insert_test_user},
    };

    use super::{EditAccountForm, EditAccountState, edit_account_endpoint};

    fn get_test_state() -> (EditAccountState, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(&connection, "test", "test@email.com");
        let account_id = insert_test_account(&connection, user.id, "Checking", "123.45");

        (
            EditAccountState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            account_id,
        )
    }

    #[tokio::test]
    async fn can_update_account() {
        let (state, account_id) = get_test_state();

        let form = EditAccountForm {
            name: "Renamed".to_owned(),
            balance: "999.99".parse::<Decimal>().unwrap(),
        };

        let response =
            edit_account_endpoint(State(state.clone()), Path(account_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("hx-redirect"),
            Some(&HeaderValue::from_str(endpoints::ACCOUNTS_VIEW).unwrap())
        );

        let connection = state.db_connection.lock().unwrap();
        let account = get_account(account_id, &connection).unwrap();
        assert_eq!(account.name, "Renamed");
        assert_eq!(account.balance, "999.99".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn update_missing_account_returns_alert() {
        let (state, _) = get_test_state();

        let form = EditAccountForm {
            name: "Renamed".to_owned(),
            balance: Decimal::ZERO,
        };

        let response = edit_account_endpoint(State(state), Path(42), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_with_non_numeric_balance_does_not_mutate_account() {
        use axum::{Router, routing::put};
        use axum_test::TestServer;

        let (state, account_id) = get_test_state();

        let app = Router::new()
            .route(endpoints::ACCOUNT, put(edit_account_endpoint))
            .with_state(state.clone());
        let server = TestServer::new(app);

        let response = server
            .put(&crate::endpoints::format_endpoint(
                endpoints::ACCOUNT,
                account_id,
            ))
            .form(&[("name", "Renamed"), ("balance", "not a number")])
            .await;

        // The form extractor rejects the submission before the handler runs.
        assert!(
            response.status_code().is_client_error(),
            "want a client error, got {}",
            response.status_code()
        );

        let connection = state.db_connection.lock().unwrap();
        let account = get_account(account_id, &connection).unwrap();
        assert_eq!(account.name, "Checking");
        assert_eq!(account.balance, "123.45".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn update_with_empty_name_does_not_mutate_account() {
        let (state, account_id) = get_test_state();

        let form = EditAccountForm {
            name: "".to_owned(),
            balance: Decimal::ZERO,
        };

        let response =
            edit_account_endpoint(State(state.clone()), Path(account_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        let account = get_account(account_id, &connection).unwrap();
        assert_eq!(account.name, "Checking");
        assert_eq!(account.balance, "123.45".parse::<Decimal>().unwrap());
    }
}
