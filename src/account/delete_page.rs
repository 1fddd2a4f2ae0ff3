//! Defines the route handler for the page for choosing an account to delete.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::core::get_all_accounts,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, account_select, base},
    navigation::NavBar,
};

/// The state needed for the delete account page.
#[derive(Debug, Clone)]
pub struct DeleteAccountPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for choosing an account to delete.
///
/// The choices are not limited to the accounts owned by the acting user,
/// which mirrors the transfer form. See DESIGN.md.
pub async fn get_delete_account_page(
    State(state): State<DeleteAccountPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Delete Account" }

            p class="mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                "Deleting an account also deletes its transactions. This cannot be undone."
            }

            form
                hx-post=(endpoints::DELETE_ACCOUNT)
                hx-confirm="Are you sure you want to delete this account? This cannot be undone."
                class="space-y-4 md:space-y-6 w-full"
            {
                (account_select("Account", "account", &accounts, None))

                button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Delete"
                }
            }
        }
    );

    Ok(base("Delete Account", &content).into_response())
}
