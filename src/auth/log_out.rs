//! Handles log-out requests by revoking the presented token.

use axum::{Json, extract::State};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde_json::{Value, json};

use crate::{
    Error,
    app_state::lock_connection,
    auth::{AuthState, token::revoke_token},
};

/// Invalidate the bearer token used to make this request.
///
/// Other tokens held by the same user stay valid.
pub async fn log_out(
    State(state): State<AuthState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    revoke_token(bearer.token(), &connection)?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}
