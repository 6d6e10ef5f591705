//! Database query helpers for listing a user's transactions.

use rusqlite::{Connection, params_from_iter, types::Value};

use crate::{
    Error, UserID,
    statistics::{CategoryFilter, TransactionFilter, TypeFilter, filter_transactions},
};

use super::core::{Transaction, map_transaction_row};

/// Get the user's transactions that match `filter`, newest first.
///
/// The type, category and date conditions run in SQL. The text query runs in
/// memory, so the result is exactly what [filter_transactions] would give for
/// the user's full transaction list.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut conditions = vec!["user_id = ?".to_owned()];
    let mut params = vec![Value::Integer(user_id.as_i64())];

    if let TypeFilter::Only(transaction_type) = filter.transaction_type {
        conditions.push("type = ?".to_owned());
        params.push(Value::Text(transaction_type.as_str().to_owned()));
    }

    if let CategoryFilter::Only(category_id) = filter.category {
        conditions.push("category_id = ?".to_owned());
        params.push(Value::Integer(category_id));
    }

    if let Some(date_from) = filter.date_from {
        conditions.push("date >= ?".to_owned());
        params.push(Value::Text(date_from.to_string()));
    }

    if let Some(date_to) = filter.date_to {
        conditions.push("date <= ?".to_owned());
        params.push(Value::Text(date_to.to_string()));
    }

    // Sort by date, and then ID so transactions added on the same day list newest first
    let query = format!(
        "SELECT id, user_id, amount, type, category_id, date, description, created_at, updated_at \
        FROM \"transaction\" \
        WHERE {} \
        ORDER BY date DESC, id DESC",
        conditions.join(" AND ")
    );

    let transactions = connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(match filter.text_query {
        Some(_) => filter_transactions(&transactions, filter),
        None => transactions,
    })
}
