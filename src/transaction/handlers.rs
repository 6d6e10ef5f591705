//! Route handlers for the transaction endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::Date;

use crate::{
    AppState, Error, TransactionType, UserID,
    app_state::lock_connection,
    auth::Session,
    category::{CategoryId, get_category},
    extract::JsonBody,
    statistics::{TransactionFilter, TransactionQuery},
    transaction::{
        Transaction, TransactionId, create_transaction, delete_transaction, get_transaction,
        list_transactions, update_transaction,
    },
};

/// The state needed for the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The JSON body for creating a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub date: Date,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// The JSON body for a partial transaction update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionUpdate {
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<Date>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "crate::patch::deserialize_patch")]
    pub description: Option<Option<String>>,
    /// `null` removes the transaction from its category.
    #[serde(default, deserialize_with = "crate::patch::deserialize_patch")]
    pub category_id: Option<Option<CategoryId>>,
}

impl TransactionUpdate {
    fn apply(self, transaction: Transaction) -> Transaction {
        Transaction {
            transaction_type: self
                .transaction_type
                .unwrap_or(transaction.transaction_type),
            amount: self.amount.unwrap_or(transaction.amount),
            date: self.date.unwrap_or(transaction.date),
            description: match self.description {
                Some(description) => description.unwrap_or_default(),
                None => transaction.description.clone(),
            },
            category_id: self.category_id.unwrap_or(transaction.category_id),
            ..transaction
        }
    }
}

/// Check that `category_id` is one of the user's categories and is meant for
/// transactions of `transaction_type`.
///
/// # Errors
/// Returns [Error::InvalidCategory] if the user has no such category, or
/// [Error::CategoryTypeMismatch] if the category is for the other type.
fn validate_category(
    category_id: Option<CategoryId>,
    transaction_type: TransactionType,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(id) = category_id else {
        return Ok(());
    };

    let category = match get_category(id, user_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::InvalidCategory(category_id)),
        Err(error) => return Err(error),
    };

    if category.category_type != transaction_type {
        return Err(Error::CategoryTypeMismatch {
            transaction_type,
            category_type: category.category_type,
        });
    }

    Ok(())
}

/// List the user's transactions, narrowed by the `q`, `type`, `category_id`,
/// `from_date` and `to_date` query parameters.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let filter = TransactionFilter::try_from(query)?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(session.user_id, &filter, &connection)?;

    Ok(Json(transactions))
}

/// Record a new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    JsonBody(form): JsonBody<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = lock_connection(&state.db_connection)?;
    validate_category(
        form.category_id,
        form.transaction_type,
        session.user_id,
        &connection,
    )?;

    let builder = Transaction::build(form.amount, form.date, form.transaction_type)
        .description(form.description.as_deref().unwrap_or_default())
        .category_id(form.category_id);
    let transaction = create_transaction(session.user_id, builder, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Show one of the user's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let transaction = get_transaction(transaction_id, session.user_id, &connection)?;

    Ok(Json(transaction))
}

/// Change some or all of a transaction's fields.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    Path(transaction_id): Path<TransactionId>,
    JsonBody(update): JsonBody<TransactionUpdate>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = match get_transaction(transaction_id, session.user_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
        Err(error) => return Err(error),
    };
    let transaction = update.apply(transaction);
    validate_category(
        transaction.category_id,
        transaction.transaction_type,
        session.user_id,
        &connection,
    )?;

    let transaction = update_transaction(transaction, &connection)?;

    Ok(Json(transaction))
}

/// Delete one of the user's transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session): Extension<Session>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(transaction_id, session.user_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
