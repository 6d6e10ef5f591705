//! Database operations for categories.
//!
//! Every query is scoped to a user, so a category owned by someone else
//! behaves exactly like one that does not exist.

use rusqlite::{Connection, Row};

use crate::{
    Error, TransactionType, UserID,
    category::{Category, CategoryColor, CategoryId, CategoryName, NewCategory},
};

/// The categories every user starts with: (name, type, color, icon).
const DEFAULT_CATEGORIES: [(&str, TransactionType, &str, &str); 9] = [
    ("Salary", TransactionType::Income, "#22c55e", "briefcase"),
    ("Freelance", TransactionType::Income, "#10b981", "laptop"),
    ("Investments", TransactionType::Income, "#14b8a6", "trending-up"),
    ("Food & Dining", TransactionType::Expense, "#f97316", "utensils"),
    ("Transport", TransactionType::Expense, "#3b82f6", "car"),
    ("Shopping", TransactionType::Expense, "#ec4899", "shopping-bag"),
    ("Bills & Utilities", TransactionType::Expense, "#ef4444", "receipt"),
    ("Entertainment", TransactionType::Expense, "#8b5cf6", "film"),
    ("Health", TransactionType::Expense, "#06b6d4", "heart-pulse"),
];

/// Create a category and return it with its generated ID.
pub fn create_category(
    user_id: UserID,
    category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, type, color, icon, is_custom)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        (
            user_id.as_i64(),
            category.name.as_ref(),
            category.category_type,
            category.color.as_ref(),
            &category.icon,
            category.is_custom,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name: category.name,
        category_type: category.category_type,
        color: category.color,
        icon: category.icon,
        is_custom: category.is_custom,
    })
}

/// Give a new user the default income and expense categories.
pub fn create_default_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|&(name, category_type, color, icon)| {
            create_category(
                user_id,
                NewCategory {
                    name: CategoryName::new_unchecked(name),
                    category_type,
                    color: CategoryColor::new_unchecked(color),
                    icon: Some(icon.to_owned()),
                    is_custom: false,
                },
                connection,
            )
        })
        .collect()
}

/// Retrieve a single category owned by `user_id`.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, color, icon, is_custom FROM category
             WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's categories ordered alphabetically by name.
pub fn get_all_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, type, color, icon, is_custom FROM category
             WHERE user_id = :user_id ORDER BY name ASC, id ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Save the editable fields of `category`. Returns an error if the category doesn't exist.
pub fn update_category(category: &Category, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, type = ?2, color = ?3, icon = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            category.name.as_ref(),
            category.category_type,
            category.color.as_ref(),
            &category.icon,
            category.id,
            category.user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category by ID. Returns an error if the category doesn't exist.
///
/// Transactions in the category are kept and become uncategorized.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            color TEXT NOT NULL,
            icon TEXT,
            is_custom INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;
    let raw_color: String = row.get(4)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        category_type: row.get(3)?,
        color: CategoryColor::new_unchecked(&raw_color),
        icon: row.get(5)?,
        is_custom: row.get(6)?,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error, TransactionType,
        category::{
            CategoryColor, CategoryName, NewCategory, create_category, create_default_categories,
            delete_category, get_all_categories, get_category, update_category,
        },
        test_utils::{create_test_user, get_test_db_connection},
        user::UserID,
    };

    fn new_category(name: &str, category_type: TransactionType) -> NewCategory {
        NewCategory {
            name: CategoryName::new_unchecked(name),
            category_type,
            color: CategoryColor::default(),
            icon: None,
            is_custom: true,
        }
    }

    fn get_connection_and_user() -> (Connection, UserID) {
        let connection = get_test_db_connection();
        let user = create_test_user("test@example.com", &connection);
        (connection, user.id)
    }

    #[test]
    fn create_category_succeeds() {
        let (connection, user_id) = get_connection_and_user();
        let name = CategoryName::new("Categorically a category").unwrap();

        let category = create_category(
            user_id,
            new_category(name.as_ref(), TransactionType::Expense),
            &connection,
        );

        let got_category = category.expect("Could not create category");
        assert!(got_category.id > 0);
        assert_eq!(got_category.name, name);
        assert_eq!(got_category.user_id, user_id);
    }

    #[test]
    fn create_category_fails_with_invalid_user_id() {
        let connection = get_test_db_connection();

        let result = create_category(
            UserID::new(42),
            new_category("Foo", TransactionType::Expense),
            &connection,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn get_category_succeeds() {
        let (connection, user_id) = get_connection_and_user();
        let inserted = create_category(
            user_id,
            new_category("Foo", TransactionType::Income),
            &connection,
        )
        .unwrap();

        let selected = get_category(inserted.id, user_id, &connection);

        assert_eq!(Ok(inserted), selected);
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let (connection, user_id) = get_connection_and_user();
        let inserted = create_category(
            user_id,
            new_category("Foo", TransactionType::Income),
            &connection,
        )
        .unwrap();

        let selected = get_category(inserted.id + 123, user_id, &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_category_owned_by_other_user_returns_not_found() {
        let (connection, user_id) = get_connection_and_user();
        let other_user = create_test_user("other@example.com", &connection);
        let inserted = create_category(
            other_user.id,
            new_category("Theirs", TransactionType::Expense),
            &connection,
        )
        .unwrap();

        let selected = get_category(inserted.id, user_id, &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn get_all_categories_orders_by_name_and_filters_by_user() {
        let (connection, user_id) = get_connection_and_user();
        let other_user = create_test_user("other@example.com", &connection);
        create_category(user_id, new_category("Rent", TransactionType::Expense), &connection)
            .unwrap();
        create_category(user_id, new_category("Bonus", TransactionType::Income), &connection)
            .unwrap();
        create_category(
            other_user.id,
            new_category("Coffee", TransactionType::Expense),
            &connection,
        )
        .unwrap();

        let names: Vec<String> = get_all_categories(user_id, &connection)
            .expect("Could not get all categories")
            .into_iter()
            .map(|category| category.name.to_string())
            .collect();

        assert_eq!(names, vec!["Bonus", "Rent"]);
    }

    #[test]
    fn create_default_categories_gives_income_and_expense_categories() {
        let (connection, user_id) = get_connection_and_user();

        let categories = create_default_categories(user_id, &connection).unwrap();

        assert_eq!(categories.len(), 9);
        let income_count = categories
            .iter()
            .filter(|category| category.category_type == TransactionType::Income)
            .count();
        assert_eq!(income_count, 3);
        assert!(categories.iter().all(|category| !category.is_custom));
    }

    #[test]
    fn update_category_succeeds() {
        let (connection, user_id) = get_connection_and_user();
        let mut category = create_category(
            user_id,
            new_category("Original", TransactionType::Expense),
            &connection,
        )
        .unwrap();

        category.name = CategoryName::new_unchecked("Updated");
        category.icon = Some("star".to_owned());
        let result = update_category(&category, &connection);

        assert!(result.is_ok());
        let updated = get_category(category.id, user_id, &connection).unwrap();
        assert_eq!(updated, category);
    }

    #[test]
    fn update_category_owned_by_other_user_fails() {
        let (connection, user_id) = get_connection_and_user();
        let other_user = create_test_user("other@example.com", &connection);
        let mut category = create_category(
            other_user.id,
            new_category("Theirs", TransactionType::Expense),
            &connection,
        )
        .unwrap();

        category.user_id = user_id;
        let result = update_category(&category, &connection);

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn delete_category_succeeds() {
        let (connection, user_id) = get_connection_and_user();
        let category = create_category(
            user_id,
            new_category("Doomed", TransactionType::Expense),
            &connection,
        )
        .unwrap();

        delete_category(category.id, user_id, &connection).unwrap();

        assert_eq!(
            get_category(category.id, user_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_missing_category_fails() {
        let (connection, user_id) = get_connection_and_user();

        let result = delete_category(999, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }
}
