//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use axum::{Extension, Json, extract::State};
use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error, PasswordHash,
    app_state::lock_connection,
    auth::Session,
};

/// The display currency given to users who do not choose one at registration.
pub const DEFAULT_CURRENCY: &str = "INR";

/// The maximum number of characters in a user's name.
pub const MAX_NAME_LENGTH: usize = 255;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user goes by.
    pub name: String,
    /// The user's email address, used to log in. Always lowercase.
    pub email: String,
    /// The ISO 4217 code of the currency amounts are displayed in, e.g. "NZD".
    pub currency: String,
    /// The user's password hash.
    #[serde(skip_serializing)]
    pub password_hash: PasswordHash,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated details needed to register a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The name the user goes by.
    pub name: String,
    /// The user's email address, normalised to lowercase.
    pub email: String,
    /// The display currency code.
    pub currency: String,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
}

/// Trim `name` and check that it is not empty or too long.
///
/// # Errors
/// Returns [Error::EmptyName] or [Error::FieldTooLong].
pub fn validate_user_name(name: &str) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyName("name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::FieldTooLong {
            field: "name",
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_owned())
}

/// Check that `email` is a valid email address and normalise it to lowercase.
///
/// # Errors
/// Returns [Error::InvalidEmail] if `email` is not a valid address.
pub fn validate_email(email: &str) -> Result<String, Error> {
    let email = email.trim();

    EmailAddress::from_str(email)
        .map(|address| address.as_str().to_lowercase())
        .map_err(|_| Error::InvalidEmail(email.to_owned()))
}

/// Check that `currency` is a three letter uppercase code such as "USD".
///
/// `None` gives [DEFAULT_CURRENCY].
///
/// # Errors
/// Returns [Error::InvalidCurrency] for anything else.
pub fn validate_currency(currency: Option<&str>) -> Result<String, Error> {
    match currency {
        None => Ok(DEFAULT_CURRENCY.to_owned()),
        Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) => {
            Ok(code.to_owned())
        }
        Some(code) => Err(Error::InvalidCurrency(code.to_owned())),
    }
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
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                currency TEXT NOT NULL,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if the email is already registered, or
/// [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO user (name, email, currency, password, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            &new_user.name,
            &new_user.email,
            &new_user.currency,
            new_user.password_hash.as_ref(),
            created_at,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        currency: new_user.currency,
        password_hash: new_user.password_hash,
        created_at,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(4)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        currency: row.get(3)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        created_at: row.get(5)?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(
            "SELECT id, name, email, currency, password, created_at FROM user WHERE id = :id",
        )?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`, compared case-insensitively.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the email address.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(
            "SELECT id, name, email, currency, password, created_at FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &email.trim().to_lowercase())], map_user_row)
        .map_err(|error| error.into())
}

/// Route handler that returns the authenticated user.
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(session.user_id, &connection)?;

    Ok(Json(user))
}
