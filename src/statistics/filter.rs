//! Narrowing a transaction list by text, type, category and date.

use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, Transaction, TransactionType, category::CategoryId};

/// The query string value that switches a type or category filter off.
const ALL: &str = "all";

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Which transaction types to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    /// Keep income and expenses.
    #[default]
    All,
    /// Keep only transactions of this type.
    Only(TransactionType),
}

/// Which categories to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Keep every transaction, categorised or not.
    #[default]
    All,
    /// Keep only transactions in this category.
    Only(CategoryId),
}

/// The conditions a transaction must meet to be listed. All conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Text that must appear in the description, ignoring case.
    pub text_query: Option<String>,
    /// Income, expenses or both.
    pub transaction_type: TypeFilter,
    /// One category or all of them.
    pub category: CategoryFilter,
    /// The earliest date to keep, inclusive.
    pub date_from: Option<Date>,
    /// The latest date to keep, inclusive.
    pub date_to: Option<Date>,
}

impl TransactionFilter {
    fn matches(&self, transaction: &Transaction, lowercase_query: Option<&str>) -> bool {
        if let Some(query) = lowercase_query
            && !transaction.description.to_lowercase().contains(query)
        {
            return false;
        }

        if let TypeFilter::Only(transaction_type) = self.transaction_type
            && transaction.transaction_type != transaction_type
        {
            return false;
        }

        if let CategoryFilter::Only(category_id) = self.category
            && transaction.category_id != Some(category_id)
        {
            return false;
        }

        if self.date_from.is_some_and(|from| transaction.date < from) {
            return false;
        }

        !self.date_to.is_some_and(|to| transaction.date > to)
    }
}

/// Keep the transactions that satisfy every condition in `filter`, in their original order.
///
/// Filtering an already filtered list with the same filter changes nothing.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    let lowercase_query = filter
        .text_query
        .as_deref()
        .filter(|query| !query.is_empty())
        .map(str::to_lowercase);

    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction, lowercase_query.as_deref()))
        .cloned()
        .collect()
}

/// The raw query parameters for listing transactions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionQuery {
    /// Text to look for in descriptions.
    pub q: Option<String>,
    /// "income", "expense" or "all".
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// A category ID or "all".
    pub category_id: Option<String>,
    /// A "YYYY-MM-DD" date.
    pub from_date: Option<String>,
    /// A "YYYY-MM-DD" date.
    pub to_date: Option<String>,
}

/// Treat blank parameters the same as missing ones.
///
/// Not used for the text query, which is matched exactly as given.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Parse an optional "YYYY-MM-DD" query parameter called `name`.
///
/// # Errors
/// Returns [Error::InvalidFilter] if the value is not a valid date.
pub(crate) fn parse_date(value: Option<&str>, name: &str) -> Result<Option<Date>, Error> {
    non_blank(value)
        .map(|value| {
            Date::parse(value, DATE_FORMAT).map_err(|_| {
                Error::InvalidFilter(format!(
                    "{name} \"{value}\" is not a date in the format YYYY-MM-DD"
                ))
            })
        })
        .transpose()
}

impl TryFrom<TransactionQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: TransactionQuery) -> Result<Self, Self::Error> {
        let transaction_type = match non_blank(query.transaction_type.as_deref()) {
            None | Some(ALL) => TypeFilter::All,
            Some(value) => TypeFilter::Only(value.parse()?),
        };

        let category = match non_blank(query.category_id.as_deref()) {
            None | Some(ALL) => CategoryFilter::All,
            Some(value) => CategoryFilter::Only(value.parse().map_err(|_| {
                Error::InvalidFilter(format!("category_id \"{value}\" is not a category ID"))
            })?),
        };

        Ok(Self {
            text_query: query.q.filter(|q| !q.is_empty()),
            transaction_type,
            category,
            date_from: parse_date(query.from_date.as_deref(), "from_date")?,
            date_to: parse_date(query.to_date.as_deref(), "to_date")?,
        })
    }
}
