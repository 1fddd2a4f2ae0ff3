//! Defines the route handler for the page for editing an account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::{AccountId, get_account},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the edit account page.
#[derive(Debug, Clone)]
pub struct EditAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for editing the name and balance of an account.
pub async fn get_edit_account_page(
    State(state): State<EditAccountPageState>,
    Path(account_id): Path<AccountId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let account = get_account(account_id, &connection)?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();
    let update_url = format_endpoint(endpoints::ACCOUNT, account.id);

    let content = html!(
        (nav_bar)

        main class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Edit Account" }

            form
                hx-put=(update_url)
                class="space-y-4 md:space-y-6 w-full"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Account name" }

                    input
                        type="text"
                        name="name"
                        id="name"
                        placeholder="Enter account name"
                        required
                        value=(account.name)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="balance" class=(FORM_LABEL_STYLE) { "Balance" }

                    input
                        type="number"
                        name="balance"
                        id="balance"
                        step="0.01"
                        placeholder="Enter account balance"
                        required
                        value=(account.balance)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Save"
                }
            }
        }
    );

    Ok(base("Edit Account", &content).into_response())
}

#[cfg(test)]
mod edit_account_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_hx_endpoint, assert_valid_html, insert_test_account, insert_test_user,
            must_get_form, parse_html_document,
        },
    };

    use super::{EditAccountPageState, get_edit_account_page};

    fn get_test_state() -> (EditAccountPageState, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(&connection, "test", "test@email.com");
        let account_id = insert_test_account(&connection, user.id, "Checking", "123.45");

        (
            EditAccountPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            account_id,
        )
    }

    #[tokio::test]
    async fn renders_form_with_current_values() {
        let (state, account_id) = get_test_state();

        let response = get_edit_account_page(State(state), Path(account_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::ACCOUNT, account_id),
            "hx-put",
        );

        let name_selector = scraper::Selector::parse("input[name=name]").unwrap();
        let name_input = form
            .select(&name_selector)
            .next()
            .expect("No name input found");
        assert_eq!(name_input.value().attr("value"), Some("Checking"));

        let balance_selector = scraper::Selector::parse("input[name=balance]").unwrap();
        let balance_input = form
            .select(&balance_selector)
            .next()
            .expect("No balance input found");
        assert_eq!(balance_input.value().attr("value"), Some("123.45"));
    }

    #[tokio::test]
    async fn returns_not_found_for_missing_account() {
        let (state, _) = get_test_state();

        let response = get_edit_account_page(State(state), Path(42)).await;

        let response = match response {
            Err(error) => {
                assert_eq!(error, Error::NotFound);
                error.into_response()
            }
            Ok(_) => panic!("want Err(Error::NotFound), got Ok"),
        };

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
