//! Bearer tokens for API authentication.
//!
//! The plain token is only ever returned to the client once. The database
//! stores its SHA-256 digest, so a leaked database cannot be used to log in.

use rand::{Rng, distributions::Alphanumeric};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::{Error, UserID};

/// The number of characters in a freshly generated token.
pub const TOKEN_LENGTH: usize = 64;

/// Generate a random alphanumeric token.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// The lowercase hex SHA-256 digest of `token`.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Create the table for storing token digests.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_token_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS api_token (
                token_hash TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create a new token for `user_id` that stays valid for `duration`.
///
/// Returns the plain token, which should be handed to the client.
///
/// # Errors
///
/// Returns [Error::SqlError] if the token could not be saved.
pub fn issue_token(
    user_id: UserID,
    duration: Duration,
    connection: &Connection,
) -> Result<String, Error> {
    let token = generate_token();
    let expires_at = OffsetDateTime::now_utc() + duration;

    connection.execute(
        "INSERT INTO api_token (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
        (
            hash_token(&token),
            user_id.as_i64(),
            expires_at.unix_timestamp(),
        ),
    )?;

    Ok(token)
}

/// Find the user that `token` was issued to.
///
/// # Errors
///
/// Returns [Error::Unauthorized] if the token is unknown or has expired.
pub fn get_user_id_for_token(token: &str, connection: &Connection) -> Result<UserID, Error> {
    let row: Option<(i64, i64)> = connection
        .query_row(
            "SELECT user_id, expires_at FROM api_token WHERE token_hash = ?1",
            [hash_token(token)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((user_id, expires_at))
            if expires_at > OffsetDateTime::now_utc().unix_timestamp() =>
        {
            Ok(UserID::new(user_id))
        }
        Some(_) => {
            tracing::debug!("Rejected expired token for request");
            Err(Error::Unauthorized)
        }
        None => Err(Error::Unauthorized),
    }
}

/// Delete `token` so it can no longer be used.
///
/// Revoking a token that does not exist is not an error.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn revoke_token(token: &str, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "DELETE FROM api_token WHERE token_hash = ?1",
        [hash_token(token)],
    )?;

    Ok(())
}

/// Remove every token that has expired, returning how many were removed.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn delete_expired_tokens(connection: &Connection) -> Result<usize, Error> {
    let deleted = connection.execute(
        "DELETE FROM api_token WHERE expires_at <= ?1",
        [OffsetDateTime::now_utc().unix_timestamp()],
    )?;

    Ok(deleted)
}
