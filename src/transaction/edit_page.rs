//! Defines the route handler for the page for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, get_all_accounts},
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, account_select,
        base,
    },
    navigation::NavBar,
    transaction::core::{Transaction, TransactionKind, get_transaction},
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn kind_radio_group(selected: TransactionKind) -> Markup {
    let is_expense = matches!(selected, TransactionKind::Expense);

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="transaction-kind-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="kind"
                        id="transaction-kind-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-kind-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }
    }
}

fn edit_transaction_form(transaction: &Transaction, accounts: &[Account]) -> Markup {
    let update_url = format_endpoint(endpoints::TRANSACTION, transaction.id);

    html! {
        form
            hx-put=(update_url)
            class="space-y-4 md:space-y-6 w-full"
        {
            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    type="text"
                    name="description"
                    id="description"
                    required
                    value=(transaction.description)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (account_select("Account", "account", accounts, Some(transaction.account_id)))

            div
            {
                label for="value" class=(FORM_LABEL_STYLE) { "Value" }

                input
                    type="number"
                    name="value"
                    id="value"
                    step="0.01"
                    required
                    value=(transaction.value)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="transaction_date" class=(FORM_LABEL_STYLE) { "Transaction date" }

                input
                    type="date"
                    name="transaction_date"
                    id="transaction_date"
                    required
                    value=(transaction.date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (kind_radio_group(transaction.kind))

            button type="submit" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                "Save"
            }
        }
    }
}

/// Renders the page for editing a transaction.
///
/// Unlike the creation form, the account drop-down offers every account, the
/// full editor only checks that the chosen account exists.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection)?;
    let accounts = get_all_accounts(&connection)
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;
    drop(connection);

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold my-4" { "Edit Transaction" }

            (edit_transaction_form(&transaction, &accounts))
        }
    );

    Ok(base("Edit Transaction", &content).into_response())
}
