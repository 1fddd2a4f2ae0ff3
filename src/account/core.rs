//! Defines the account model and the database queries for accounts.

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;

use crate::{Error, user::UserId};

/// The ID for a row in the account table.
pub type AccountId = i64;

/// A pot of money belonging to a user, e.g. a bank account or credit card.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// The name of the account.
    pub name: String,
    /// The amount of money currently in the account.
    pub balance: Decimal,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            balance TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserId::new(row.get(1)?);
    let name = row.get(2)?;
    let raw_balance: String = row.get(3)?;
    // Balances are stored as text so that no precision is lost to floating
    // point representation.
    let balance = raw_balance
        .parse::<Decimal>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    Ok(Account {
        id,
        user_id,
        name,
        balance,
    })
}

/// Get the account with `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `id` does not refer to an account, or
/// [Error::SqlError] if the query failed.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare("SELECT id, user_id, name, balance FROM account WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row_to_account)
        .map_err(|error| error.into())
}

/// Get the accounts owned by the user `user_id`, ordered by name.
///
/// Forms that must only offer a user their own accounts build their account
/// choices from this query.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query failed.
pub fn get_accounts_by_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, balance FROM account \
            WHERE user_id = :user_id ORDER BY name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}

/// Get every account in the database, ordered by name.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query failed.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare("SELECT id, user_id, name, balance FROM account ORDER BY name ASC")?
        .query_map([], map_row_to_account)?
        .map(|account_result| account_result.map_err(Error::from))
        .collect()
}
