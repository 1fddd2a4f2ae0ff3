//! Displays the transactions recorded against the acting user's accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links, format_currency,
    },
    navigation::NavBar,
    transaction::core::map_row_to_transaction,
    user::UserId,
};

/// The state needed for the [get_transactions_page] route handler.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The transaction data to display in the view
#[derive(Debug, PartialEq)]
struct TransactionTableRow {
    description: String,
    account_name: String,
    value: Decimal,
    date: Date,
    kind: String,
    edit_url: String,
    delete_url: String,
}

fn transactions_view(transactions: &[TransactionTableRow]) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let table_row = |transaction: &TransactionTableRow| {
        let action_links = edit_delete_action_links(
            &transaction.edit_url,
            &transaction.delete_url,
            &format!(
                "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
                transaction.description
            ),
            "closest tr",
            "delete",
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (transaction.description)
                }

                td class=(TABLE_CELL_STYLE) { (transaction.account_name) }

                td class="px-6 py-4 text-right" { (format_currency(transaction.value)) }

                td class=(TABLE_CELL_STYLE) { (transaction.date) }

                td class=(TABLE_CELL_STYLE) { (transaction.kind) }

                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (action_links)
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                        {
                            "Add Transaction"
                        }

                        a href=(endpoints::NEW_TRANSFER_VIEW) class=(LINK_STYLE)
                        {
                            "Transfer"
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class="px-6 py-3 text-right" { "Value" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (table_row(transaction))
                            }

                            @if transactions.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found. Record a transaction "
                                        a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
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

    base("Transactions", &content)
}

/// Renders the transactions page showing the transactions recorded against
/// the acting user's accounts, newest first.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    Ok(transactions_view(&transactions).into_response())
}

fn get_transactions_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<TransactionTableRow>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.account_id, t.description, t.value, t.date, t.kind, a.name \
            FROM \"transaction\" t \
            INNER JOIN account a ON t.account_id = a.id \
            WHERE a.user_id = :user_id \
            ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], |row| {
            let transaction = map_row_to_transaction(row)?;
            let account_name: String = row.get(6)?;

            Ok(TransactionTableRow {
                description: transaction.description,
                account_name,
                value: transaction.value,
                date: transaction.date,
                kind: transaction.kind.to_string(),
                edit_url: format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
                delete_url: format_endpoint(endpoints::TRANSACTION, transaction.id),
            })
        })?
        .map(|row_result| row_result.map_err(Error::from))
        .collect()
}
