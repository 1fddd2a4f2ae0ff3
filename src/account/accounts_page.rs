//! Displays the acting user's accounts and their balances.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::get_accounts_by_user,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency,
    },
    navigation::NavBar,
    user::UserId,
};

/// The state needed for the [get_accounts_page] route handler.
#[derive(Debug, Clone)]
pub struct AccountsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The account data to display in the view
#[derive(Debug, PartialEq)]
struct AccountTableRow {
    name: String,
    balance: String,
    edit_url: String,
}

fn accounts_view(accounts: &[AccountTableRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE)
                        {
                            "Add Account"
                        }

                        a href=(endpoints::DELETE_ACCOUNT_VIEW) class=(LINK_STYLE)
                        {
                            "Delete Account"
                        }
                    }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Name"
                                }
                                th scope="col" class="px-6 py-3 text-right"
                                {
                                    "Balance"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    th
                                        scope="row"
                                        class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                                    {
                                        (account.name)
                                    }

                                    td class="px-6 py-4 text-right"
                                    {
                                        (account.balance)
                                    }

                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        a href=(account.edit_url) class=(LINK_STYLE) { "Edit" }
                                    }
                                }
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="3"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts found. Create an account "
                                        a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Accounts", &content)
}

/// Renders the accounts page showing the accounts owned by the acting user.
pub async fn get_accounts_page(
    State(state): State<AccountsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts: Vec<AccountTableRow> = get_accounts_by_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?
        .into_iter()
        .map(|account| AccountTableRow {
            name: account.name,
            balance: format_currency(account.balance),
            edit_url: format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id),
        })
        .collect();

    Ok(accounts_view(&accounts).into_response())
}

#[cfg(test)]
mod accounts_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        test_utils::{
            assert_content_type, assert_valid_html, insert_test_account, insert_test_user,
            parse_html_document,
        },
    };

    use super::{AccountsPageState, get_accounts_page};

    #[tokio::test]
    async fn lists_only_the_acting_users_accounts() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(&connection, "owner", "owner@email.com");
        let other = insert_test_user(&connection, "other", "other@email.com");
        insert_test_account(&connection, user.id, "Checking", "1234.56");
        insert_test_account(&connection, other.id, "Hidden", "9000");

        let state = AccountsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_accounts_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let row_selector = scraper::Selector::parse("tbody tr").unwrap();
        let rows = html.select(&row_selector).collect::<Vec<_>>();
        assert_eq!(rows.len(), 1, "want 1 table row, got {}", rows.len());

        let row_text = rows[0].text().collect::<String>();
        assert!(row_text.contains("Checking"));
        assert!(row_text.contains("$1234.56"));
        assert!(!row_text.contains("Hidden"));
    }

    #[tokio::test]
    async fn shows_placeholder_with_no_accounts() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = insert_test_user(&connection, "owner", "owner@email.com");

        let state = AccountsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_accounts_page(State(state), Extension(user.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let cell_selector = scraper::Selector::parse("td[colspan='3']").unwrap();
        let cell = html
            .select(&cell_selector)
            .next()
            .expect("Could not find the no-accounts table cell");

        assert!(cell.text().collect::<String>().contains("No accounts found"));
    }
}
