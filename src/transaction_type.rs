//! The income/expense flag shared by transactions and categories.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in JSON, query strings and the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::InvalidFilter(format!(
                "\"{other}\" is not a transaction type, expected \"income\" or \"expense\""
            ))),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("invalid transaction type {other:?}").into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, TransactionType};

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let result = "Income".parse::<TransactionType>();

        assert!(matches!(result, Err(Error::InvalidFilter(_))));
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();

        assert_eq!(json, "\"expense\"");
    }

    #[test]
    fn round_trips_through_sqlite() {
        let conn = Connection::open_in_memory().unwrap();

        let got: TransactionType = conn
            .query_row("SELECT ?1", [TransactionType::Income], |row| row.get(0))
            .unwrap();

        assert_eq!(got, TransactionType::Income);
    }

    #[test]
    fn reading_unknown_value_from_sqlite_fails() {
        let conn = Connection::open_in_memory().unwrap();

        let got = conn.query_row("SELECT 'transfer'", [], |row| {
            row.get::<_, TransactionType>(0)
        });

        assert!(got.is_err());
    }
}
