//! Records a transfer between two accounts as a pair of transactions.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    Error,
    account::AccountId,
    transaction::{NewTransaction, Transaction, TransactionKind, create_transaction},
};

/// A transfer of money between two accounts.
///
/// A transfer is not stored as its own record: recording it writes an expense
/// against the origin account and a matching income against the destination
/// account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransfer {
    /// Text detailing the transfer.
    pub description: String,
    /// The account the money is taken from.
    pub account_origin: AccountId,
    /// The account the money is paid into.
    pub account_destination: AccountId,
    /// The amount of money to move.
    pub value: Decimal,
    /// When the transfer happened.
    pub date: Date,
}

/// Record `transfer` as two offsetting transactions.
///
/// Both transactions are written in one SQL transaction: either the debit
/// and the credit both exist afterwards, or neither does.
///
/// The caller is responsible for checking that both account IDs refer to
/// existing accounts.
///
/// # Errors
///
/// Returns an [Error::SqlError] if either insert failed.
pub fn record_transfer(
    transfer: NewTransfer,
    connection: &mut Connection,
) -> Result<(Transaction, Transaction), Error> {
    let sql_transaction = connection.transaction()?;

    let debit = create_transaction(
        NewTransaction {
            account_id: transfer.account_origin,
            description: transfer.description.clone(),
            value: -transfer.value,
            date: transfer.date,
            kind: TransactionKind::Expense,
        },
        &sql_transaction,
    )?;

    let credit = create_transaction(
        NewTransaction {
            account_id: transfer.account_destination,
            description: transfer.description,
            value: transfer.value,
            date: transfer.date,
            kind: TransactionKind::Income,
        },
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok((debit, credit))
}

#[cfg(test)]
mod record_transfer_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        db::initialize,
        test_utils::{insert_test_account, insert_test_user},
        transaction::TransactionKind,
    };

    use super::{NewTransfer, record_transfer};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_test_transfer(origin: i64, destination: i64) -> NewTransfer {
        NewTransfer {
            description: "Savings top up".to_owned(),
            account_origin: origin,
            account_destination: destination,
            value: "250.00".parse::<Decimal>().unwrap(),
            date: date!(2026 - 08 - 07),
        }
    }

    #[test]
    fn records_two_offsetting_transactions() {
        let mut conn = get_test_connection();
        let user = insert_test_user(&conn, "test", "test@email.com");
        let origin = insert_test_account(&conn, user.id, "Checking", "1000");
        let destination = insert_test_account(&conn, user.id, "Savings", "0");

        let (debit, credit) =
            record_transfer(new_test_transfer(origin, destination), &mut conn).unwrap();

        assert_eq!(debit.account_id, origin);
        assert_eq!(debit.kind, TransactionKind::Expense);
        assert_eq!(credit.account_id, destination);
        assert_eq!(credit.kind, TransactionKind::Income);
        assert_eq!(debit.value + credit.value, Decimal::ZERO);
        assert_eq!(debit.description, credit.description);
    }

    #[test]
    fn failed_transfer_writes_nothing() {
        let mut conn = get_test_connection();
        let user = insert_test_user(&conn, "test", "test@email.com");
        let origin = insert_test_account(&conn, user.id, "Checking", "1000");

        // The destination account does not exist, so the second insert
        // violates the foreign key and the whole transfer must roll back.
        let result = record_transfer(new_test_transfer(origin, 42), &mut conn);

        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(id) FROM \"transaction\"", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 0, "want no transactions after a failed transfer");
    }
}
