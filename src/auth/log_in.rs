//! This file defines the route for handling log-in requests.
//! The auth module handles the lower level token logic.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error, User,
    app_state::lock_connection,
    auth::{AuthState, token::issue_token},
    extract::JsonBody,
    user::get_user_by_email,
};

/// The credentials sent with a log-in request.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// The email the user registered with.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
}

/// The response body for a successful registration or log-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// A short human readable status message.
    pub message: String,
    /// The authenticated user.
    pub user: User,
    /// The bearer token to send with later requests.
    pub token: String,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request a new bearer token is issued.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password.
pub async fn log_in(
    State(state): State<AuthState>,
    JsonBody(credentials): JsonBody<LogInData>,
) -> Result<Json<AuthResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let user = match get_user_by_email(&credentials.email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    let is_password_valid = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| {
            tracing::error!("Error verifying password: {error}");
            Error::HashingError(error.to_string())
        })?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let token = issue_token(user.id, state.token_duration, &connection)?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        message: "Login successful".to_owned(),
        user,
        token,
    }))
}
