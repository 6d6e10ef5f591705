//! Budget Tracker is a web service for tracking personal income and expenses.
//!
//! This library provides a JSON REST API for managing categories and
//! transactions, and derives dashboard statistics (balances, monthly trends and
//! category breakdowns) from a user's transactions.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod extract;
mod logging;
mod patch;
mod routing;
mod statistics;
mod timezone;
mod transaction;
mod transaction_type;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, DEFAULT_TOKEN_DURATION};
pub use auth::{PasswordHash, ValidatedPassword, delete_expired_tokens};
pub use category::{Category, CategoryId, create_default_categories, get_all_categories};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use statistics::{
    CategoryStat, MonthlyBucket, Totals, compute_category_breakdown, compute_monthly_trend,
    compute_totals,
};
pub use timezone::{get_local_offset, today};
pub use transaction::{Transaction, TransactionBuilder, create_transaction};
pub use transaction_type::TransactionType;
pub use user::{NewUser, User, UserID, create_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired bearer token.
    #[error("unauthenticated")]
    Unauthorized,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The password and its confirmation did not match.
    #[error("the password confirmation does not match")]
    PasswordMismatch,

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address is already registered.
    #[error("the email has already been taken")]
    DuplicateEmail,

    /// The currency code is not three uppercase ASCII letters, e.g. "NZD".
    #[error("\"{0}\" is not a valid currency code")]
    InvalidCurrency(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A required name field was empty or only whitespace.
    #[error("{0} cannot be empty")]
    EmptyName(&'static str),

    /// A text field exceeded its maximum length in characters.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// The name of the offending field.
        field: &'static str,
        /// The maximum number of characters allowed.
        max: usize,
    },

    /// A transaction amount was negative, infinite or not a number.
    #[error("{0} is not a valid amount, amounts must be a finite number zero or greater")]
    InvalidAmount(f64),

    /// The category ID used for a transaction did not match one of the user's categories.
    #[error("the category ID {0:?} does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// A transaction was assigned a category of the other type, e.g. an
    /// expense filed under an income category.
    #[error("{transaction_type} transactions cannot use {category_type} categories")]
    CategoryTypeMismatch {
        /// The type of the transaction.
        transaction_type: TransactionType,
        /// The type of the category.
        category_type: TransactionType,
    },

    /// The request body was missing, was not JSON or did not have the expected fields.
    #[error("{message}")]
    InvalidJson {
        /// The status code chosen by the JSON extractor, e.g. 400 for malformed JSON.
        status: StatusCode,
        /// What was wrong with the body.
        message: String,
    },

    /// A query parameter for filtering or windowing could not be understood.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Malformed data reached the statistics engine, e.g. a negative amount.
    ///
    /// The stores are expected to reject such data before it is saved, so
    /// seeing this error means the database holds rows that bypassed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are also reported as not found so that
    /// their existence is not leaked.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code used when this error is sent to a client.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson { status, .. } => *status,
            Error::InvalidFilter(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory => StatusCode::NOT_FOUND,
            Error::TooWeak(_)
            | Error::PasswordMismatch
            | Error::InvalidEmail(_)
            | Error::DuplicateEmail
            | Error::InvalidCurrency(_)
            | Error::EmptyName(_)
            | Error::FieldTooLong { .. }
            | Error::InvalidAmount(_)
            | Error::InvalidCategory(_)
            | Error::CategoryTypeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server errors are not intended to be shown to the client.
        let message = if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use crate::{Error, TransactionType};

    async fn response_parts(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        (status, serde_json::from_slice(&body).expect("Body is not JSON"))
    }

    #[tokio::test]
    async fn client_errors_include_message() {
        let (status, body) = response_parts(Error::CategoryTypeMismatch {
            transaction_type: TransactionType::Expense,
            category_type: TransactionType::Income,
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["message"],
            "expense transactions cannot use income categories"
        );
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (status, body) = response_parts(Error::HashingError("salt mine flooded".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !body["message"].as_str().unwrap().contains("salt mine"),
            "internal details leaked: {body}"
        );
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, _) = response_parts(Error::DeleteMissingCategory).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
