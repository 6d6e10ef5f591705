//! Authentication middleware that resolves bearer tokens into a [Session].

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error, UserID, app_state::lock_connection, auth::token::get_user_id_for_token,
};

/// The authenticated caller of a request.
///
/// Protected route handlers receive it with `Extension(session): Extension<Session>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// The user the presented token was issued to.
    pub user_id: UserID,
}

/// The state needed for authentication.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
    /// How long newly issued tokens stay valid.
    pub token_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_duration: state.token_duration,
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// A [Session] is placed into the request extensions and the request executed
/// normally if the token is valid, otherwise a 401 response is returned.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(&mut parts, &state)
        .await
    {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_owned(),
        Err(error) => {
            tracing::debug!("Rejected request without a bearer token: {error}");
            return Error::Unauthorized.into_response();
        }
    };

    let user_id = {
        let connection = match lock_connection(&state.db_connection) {
            Ok(connection) => connection,
            Err(error) => return error.into_response(),
        };

        match get_user_id_for_token(&token, &connection) {
            Ok(user_id) => user_id,
            Err(error) => return error.into_response(),
        }
    };

    parts.extensions.insert(Session { user_id });
    let request = Request::from_parts(parts, body);

    next.run(request).await
}
