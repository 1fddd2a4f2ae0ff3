//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, params, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, account::AccountId, database_id::TransactionId};

/// Whether a transaction brought money into an account or took money out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming into the account.
    Income,
    /// Money leaving the account.
    Expense,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::NotFound),
        }
    }
}

/// An event where money was either spent or earned against an account.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub value: Decimal,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
}

/// The details needed to create a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub value: Decimal,
    /// When the transaction happened.
    pub date: Date,
    /// Whether the transaction is an income or an expense.
    pub kind: TransactionKind,
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            value TEXT NOT NULL,
            date TEXT NOT NULL,
            kind TEXT NOT NULL,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_value: String = row.get(3)?;
    // Values are stored as text so that no precision is lost to floating
    // point representation.
    let value = raw_value
        .parse::<Decimal>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    let raw_kind: String = row.get(5)?;
    let kind = TransactionKind::from_str(&raw_kind)
        .map_err(|_| rusqlite::Error::InvalidColumnType(5, raw_kind, Type::Text))?;

    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        description: row.get(2)?,
        value,
        date: row.get(4)?,
        kind,
    })
}

/// Create a new transaction in the database.
///
/// The caller is responsible for checking that `account_id` is in the set of
/// accounts the acting user may record transactions against.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the insert failed.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (account_id, description, value, date, kind) \
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_transaction.account_id,
            new_transaction.description,
            new_transaction.value.to_string(),
            new_transaction.date,
            new_transaction.kind.to_string(),
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        account_id: new_transaction.account_id,
        description: new_transaction.description,
        value: new_transaction.value,
        date: new_transaction.date,
        kind: new_transaction.kind,
    })
}

/// Get the transaction with `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `id` does not refer to a transaction, or
/// [Error::SqlError] if the query failed.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, account_id, description, value, date, kind \
            FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_transaction)
        .map_err(|error| error.into())
}

type RowsAffected = usize;

/// Overwrite the transaction with `id` with the fields of `transaction`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the update failed.
pub fn update_transaction(
    id: TransactionId,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE \"transaction\" \
            SET account_id = ?1, description = ?2, value = ?3, date = ?4, kind = ?5 \
            WHERE id = ?6",
            params![
                transaction.account_id,
                transaction.description,
                transaction.value.to_string(),
                transaction.date,
                transaction.kind.to_string(),
                id,
            ],
        )
        .map_err(Error::from)
}

/// Delete the transaction with `id`.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the delete failed.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM \"transaction\" WHERE id = :id", &[(":id", &id)])
        .map_err(Error::from)
}
