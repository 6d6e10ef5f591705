//! Handles requests to register a new user.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::{
    Error,
    app_state::lock_connection,
    auth::{AuthResponse, AuthState, PasswordHash, ValidatedPassword, token::issue_token},
    category::create_default_categories,
    extract::JsonBody,
    user::{NewUser, create_user, validate_currency, validate_email, validate_user_name},
};

/// The data for registering a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    /// The name the user goes by.
    pub name: String,
    /// The email used to log in.
    pub email: String,
    /// The password to use for the new account.
    pub password: String,
    /// The password typed a second time.
    pub password_confirmation: String,
    /// The display currency, defaults to "INR".
    #[serde(default)]
    pub currency: Option<String>,
}

/// A route handler for registering a new user.
///
/// The new user is given the default set of categories and a bearer token.
///
/// # Errors
///
/// Returns a 422 error if any of the fields are invalid, the passwords do not
/// match, the password is too weak, or the email is already registered.
pub async fn register_user(
    State(state): State<AuthState>,
    JsonBody(form): JsonBody<RegisterForm>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let name = validate_user_name(&form.name)?;
    let email = validate_email(&form.email)?;
    let currency = validate_currency(form.currency.as_deref())?;

    if form.password != form.password_confirmation {
        return Err(Error::PasswordMismatch);
    }

    let password = ValidatedPassword::new(&form.password, &[name.as_str(), email.as_str()])?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost).inspect_err(
        |error| tracing::error!("an error occurred while hashing a password: {error}"),
    )?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = connection.unchecked_transaction()?;

    let user = create_user(
        NewUser {
            name,
            email,
            currency,
            password_hash,
        },
        &transaction,
    )?;
    create_default_categories(user.id, &transaction)?;
    let token = issue_token(user.id, state.token_duration, &transaction)?;

    transaction.commit()?;

    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful".to_owned(),
            user,
            token,
        }),
    ))
}
