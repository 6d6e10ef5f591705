//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{Error, TransactionType, UserID, category::CategoryId};

/// Database identifier for a transaction.
pub type TransactionId = i64;

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned in this transaction. Never negative.
    pub amount: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: Date, transaction_type: TransactionType) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            transaction_type,
            description: String::new(),
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Transaction::build(45.99, date!(2025 - 01 - 15), TransactionType::Expense)
///     .description("Coffee shop purchase")
///     .category_id(Some(3));
/// let transaction = create_transaction(user_id, builder, &connection)?;
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction.
    ///
    /// Always zero or positive, [TransactionType] says which way the money moved.
    pub amount: f64,

    /// The date when the transaction occurred.
    pub date: Date,

    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,

    /// A human-readable description of the transaction.
    ///
    /// # Examples
    /// - `"Salary - January 2025"`
    /// - `"Starbucks #1234 - Downtown"`
    pub description: String,

    /// The category of the transaction, e.g. "Food & Dining", "Transport".
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

/// Check that `amount` can be stored as a transaction amount.
///
/// # Errors
/// Returns [Error::InvalidAmount] if `amount` is negative, infinite or NaN.
pub fn validate_amount(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidAmount(amount))
    }
}

/// The current time truncated to whole seconds.
fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now - Duration::nanoseconds(now.nanosecond() as i64)
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

fn map_category_error(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidCategory(category_id),
        error => error.into(),
    }
}

/// Create a new transaction for `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not a finite number,
/// - or [Error::InvalidCategory] if specified category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(builder.amount)?;
    let now = now_utc();

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, amount, type, category_id, date, description, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
             RETURNING id, user_id, amount, type, category_id, date, description, created_at, updated_at",
        )?
        .query_row(
            (
                user_id.as_i64(),
                builder.amount,
                builder.transaction_type,
                builder.category_id,
                builder.date,
                builder.description,
                now,
            ),
            map_transaction_row,
        )
        .map_err(|error| map_category_error(error, builder.category_id))?;

    Ok(transaction)
}

/// Retrieve one of `user_id`'s transactions from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, user_id, amount, type, category_id, date, description, created_at, updated_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get all of a user's transactions, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_all_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, type, category_id, date, description, created_at, updated_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Save the editable fields of `transaction` and bump its `updated_at` time.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative or not a finite number,
/// - [Error::UpdateMissingTransaction] if the transaction does not exist for its user,
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    transaction: Transaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate_amount(transaction.amount)?;
    let updated_at = now_utc();

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
             SET amount = ?1, type = ?2, category_id = ?3, date = ?4, description = ?5, updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            (
                transaction.amount,
                transaction.transaction_type,
                transaction.category_id,
                transaction.date,
                &transaction.description,
                updated_at,
                transaction.id,
                transaction.user_id.as_i64(),
            ),
        )
        .map_err(|error| map_category_error(error, transaction.category_id))?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(Transaction {
        updated_at,
        ..transaction
    })
}

/// Delete one of `user_id`'s transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not exist for the user.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category_id INTEGER,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Covers the per-user listing order and the date range filters.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        transaction_type: row.get(3)?,
        category_id: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, TransactionType,
        category::{CategoryColor, CategoryName, NewCategory, create_category, delete_category},
        test_utils::{create_test_user, get_test_db_connection},
        transaction::{
            Transaction, create_transaction, delete_transaction, get_all_transactions,
            get_transaction, update_transaction,
        },
        user::UserID,
    };

    fn get_connection_and_user() -> (Connection, UserID) {
        let conn = get_test_db_connection();
        let user = create_test_user("test@example.com", &conn);
        (conn, user.id)
    }

    #[test]
    fn create_succeeds() {
        let (conn, user_id) = get_connection_and_user();
        let amount = 12.3;

        let result = create_transaction(
            user_id,
            Transaction::build(amount, date!(2025 - 10 - 05), TransactionType::Expense)
                .description("Lunch"),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.amount, amount);
                assert_eq!(transaction.user_id, user_id);
                assert_eq!(transaction.description, "Lunch");
                assert_eq!(transaction.created_at, transaction.updated_at);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let (conn, user_id) = get_connection_and_user();

        let result = create_transaction(
            user_id,
            Transaction::build(-1.0, date!(2025 - 10 - 05), TransactionType::Expense),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidAmount(-1.0)));
    }

    #[test]
    fn create_fails_on_invalid_category_id() {
        let (conn, user_id) = get_connection_and_user();
        let category_id = Some(42);

        let result = create_transaction(
            user_id,
            Transaction::build(123.45, date!(2025 - 10 - 04), TransactionType::Expense)
                .category_id(category_id),
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category_id)));
    }

    #[test]
    fn get_returns_transaction_for_owner_only() {
        let (conn, user_id) = get_connection_and_user();
        let other_user = create_test_user("other@example.com", &conn);
        let transaction = create_transaction(
            user_id,
            Transaction::build(5.0, date!(2025 - 10 - 04), TransactionType::Income),
            &conn,
        )
        .unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &conn),
            Ok(transaction.clone())
        );
        assert_eq!(
            get_transaction(transaction.id, other_user.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_all_orders_by_date_then_creation_descending() {
        let (conn, user_id) = get_connection_and_user();
        let create = |amount: f64, date| {
            create_transaction(
                user_id,
                Transaction::build(amount, date, TransactionType::Expense),
                &conn,
            )
            .unwrap()
        };
        let old = create(1.0, date!(2025 - 01 - 01));
        let first_today = create(2.0, date!(2025 - 02 - 01));
        let second_today = create(3.0, date!(2025 - 02 - 01));

        let ids: Vec<i64> = get_all_transactions(user_id, &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(ids, vec![second_today.id, first_today.id, old.id]);
    }

    #[test]
    fn update_changes_fields() {
        let (conn, user_id) = get_connection_and_user();
        let transaction = create_transaction(
            user_id,
            Transaction::build(5.0, date!(2025 - 10 - 04), TransactionType::Expense),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            Transaction {
                amount: 7.5,
                description: "Updated".to_owned(),
                ..transaction.clone()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(get_transaction(transaction.id, user_id, &conn), Ok(updated));
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (conn, user_id) = get_connection_and_user();
        let transaction = create_transaction(
            user_id,
            Transaction::build(5.0, date!(2025 - 10 - 04), TransactionType::Expense),
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            Transaction {
                id: transaction.id + 100,
                ..transaction
            },
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_transaction() {
        let (conn, user_id) = get_connection_and_user();
        let transaction = create_transaction(
            user_id,
            Transaction::build(5.0, date!(2025 - 10 - 04), TransactionType::Expense),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, user_id, &conn).unwrap();

        assert_eq!(
            get_transaction(transaction.id, user_id, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(transaction.id, user_id, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn deleting_category_uncategorizes_transactions() {
        let (conn, user_id) = get_connection_and_user();
        let category = create_category(
            user_id,
            NewCategory {
                name: CategoryName::new_unchecked("Food"),
                category_type: TransactionType::Expense,
                color: CategoryColor::default(),
                icon: None,
                is_custom: true,
            },
            &conn,
        )
        .unwrap();
        let transaction = create_transaction(
            user_id,
            Transaction::build(5.0, date!(2025 - 10 - 04), TransactionType::Expense)
                .category_id(Some(category.id)),
            &conn,
        )
        .unwrap();

        delete_category(category.id, user_id, &conn).unwrap();

        let got = get_transaction(transaction.id, user_id, &conn).unwrap();
        assert_eq!(got.category_id, None);
    }
}
