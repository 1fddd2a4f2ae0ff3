//! Defines the route handler for the page for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::get_accounts_by_user,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        account_select, base,
    },
    navigation::NavBar,
    user::UserId,
};

/// The state needed for the create transaction page.
#[derive(Debug, Clone)]
pub struct CreateTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for recording a new transaction.
///
/// The account drop-down offers exactly the accounts owned by the acting
/// user. Narrowing the choices here, before validation runs, is what stops a
/// user from attaching a transaction to someone else's account.
pub async fn get_create_transaction_page(
    State(state): State<CreateTransactionPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_accounts_by_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "New Transaction" }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                class="space-y-4 md:space-y-6 w-full"
            {
                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        type="text"
                        name="description"
                        id="description"
                        placeholder="Insert the description of transaction"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (account_select("Account", "account", &accounts, None))

                div
                {
                    label for="value" class=(FORM_LABEL_STYLE) { "Value" }

                    input
                        type="number"
                        name="value"
                        id="value"
                        step="0.01"
                        placeholder="Insert the value"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Record"
                }
            }
        }
    );

    Ok(base("New Transaction", &content).into_response())
}

#[cfg(test)]
mod create_transaction_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        endpoints,
        test_utils::{
            assert_hx_endpoint, assert_valid_html, insert_test_account, insert_test_user,
            must_get_form, parse_html_document,
        },
    };

    use super::{CreateTransactionPageState, get_create_transaction_page};

    #[tokio::test]
    async fn account_choices_are_scoped_to_the_acting_user() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(&connection, "owner", "owner@email.com");
        let other = insert_test_user(&connection, "other", "other@email.com");
        insert_test_account(&connection, user.id, "Checking", "100");
        insert_test_account(&connection, user.id, "Savings", "200");
        insert_test_account(&connection, other.id, "Hidden", "9000");

        let state = CreateTransactionPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_create_transaction_page(State(state), Extension(user.id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");

        let option_selector = scraper::Selector::parse("select[name=account] option").unwrap();
        let option_names = form
            .select(&option_selector)
            .filter(|option| option.value().attr("value") != Some(""))
            .map(|option| option.text().collect::<String>().trim().to_string())
            .collect::<Vec<_>>();

        assert_eq!(option_names, vec!["Checking", "Savings"]);
    }
}
