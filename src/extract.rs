//! Request extractors that report failures as an [Error] JSON response.

use axum::extract::{FromRequest, rejection::JsonRejection};

use crate::Error;

/// A JSON request body.
///
/// Works like [axum::Json], except that a missing content type, malformed
/// JSON or missing fields give a `{"message": ...}` body instead of plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidJson {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}
