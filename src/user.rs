//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name. May be empty.
    pub last_name: String,
    /// The name the user logs in with. Unique across users.
    pub username: String,
    /// The email address associated with the user. Unique across users.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// The details needed to create a new user.
///
/// The caller should ensure the username and email are not already in use,
/// the database UNIQUE constraints are the backstop for concurrent sign ups.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The user's given name.
    pub first_name: String,
    /// The user's family name. May be empty.
    pub last_name: String,
    /// The name the user logs in with.
    pub username: String,
    /// The email address to associate with the user.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// This function will return a:
/// - [Error::DuplicateEmail] if the given email address is already in use,
/// - [Error::DuplicateUsername] if the given username is already taken,
/// - [Error::SqlError] if an unexpected SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (first_name, last_name, username, email, password) \
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &new_user.first_name,
            &new_user.last_name,
            &new_user.username,
            &new_user.email.to_string(),
            new_user.password_hash.as_ref(),
        ),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        username: new_user.username,
        email: new_user.email,
        password_hash: new_user.password_hash,
    })
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let raw_email: String = row.get(4)?;
    let raw_password_hash: String = row.get(5)?;

    Ok(User {
        id: UserId::new(raw_id),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        username: row.get(3)?,
        email: EmailAddress::new_unchecked(raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, first_name, last_name, username, email, password \
            FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_row_to_user)
        .map_err(|error| error.into())
}

/// Get the user from the database that logs in with `username`.
///
/// # Errors
///
/// This function will return an error if:
/// - `username` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(
            "SELECT id, first_name, last_name, username, email, password \
            FROM user WHERE username = :username",
        )?
        .query_row(&[(":username", &username)], map_row_to_user)
        .map_err(|error| error.into())
}

/// Check whether a user with `email` is already registered.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn email_exists(email: &EmailAddress, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM user WHERE email = :email",
        &[(":email", &email.to_string())],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Check whether a user with `username` is already registered.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn username_exists(username: &str, connection: &Connection) -> Result<bool, Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM user WHERE username = :username",
        &[(":username", &username)],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

/// Parse an email address from a form field.
///
/// # Errors
///
/// Returns the underlying parse error if `raw_email` is not a syntactically
/// valid email address.
pub fn parse_email(raw_email: &str) -> Result<EmailAddress, email_address::Error> {
    EmailAddress::from_str(raw_email.trim())
}
