//! Defines the route handler for the page for transferring money between accounts.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::get_all_accounts,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        account_select, base,
    },
    navigation::NavBar,
};

/// The state needed for the transfer page.
#[derive(Debug, Clone)]
pub struct TransferPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransferPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the page for transferring money between two accounts.
///
/// Both drop-downs offer every account and nothing stops choosing the same
/// account twice. See DESIGN.md.
pub async fn get_create_transfer_page(
    State(state): State<TransferPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::NEW_TRANSFER_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Transfer" }

            form
                hx-post=(endpoints::TRANSFERS_API)
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

                (account_select("Source account", "account_origin", &accounts, None))

                (account_select("Target account", "account_destination", &accounts, None))

                div
                {
                    label for="value" class=(FORM_LABEL_STYLE) { "Value" }

                    input
                        type="number"
                        name="value"
                        id="value"
                        step="0.01"
                        placeholder="Insert the value of transaction"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    "Transfer"
                }
            }
        }
    );

    Ok(base("Transfer", &content).into_response())
}
