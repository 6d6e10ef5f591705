//! The aggregation engine: pure functions that summarise a user's transactions.
//!
//! Nothing in this module performs I/O or keeps state between calls. Callers
//! fetch fresh transaction and category lists and pass them in, so every
//! statistic reflects exactly the data it was given.

mod breakdown;
mod filter;
mod totals;
mod trend;

pub use breakdown::{CategoryStat, compute_category_breakdown};
pub(crate) use filter::parse_date;
pub use filter::{
    CategoryFilter, TransactionFilter, TransactionQuery, TypeFilter, filter_transactions,
};
pub use totals::{Totals, compute_totals};
pub use trend::{MonthlyBucket, compute_monthly_trend, month_label};

use crate::{Error, Transaction};

/// The label for transactions without a known category.
pub const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// The chart color for transactions without a known category.
pub const UNKNOWN_CATEGORY_COLOR: &str = "hsl(0, 0%, 50%)";

/// How many months the trend covers when the caller does not say.
pub const DEFAULT_TREND_WINDOW_MONTHS: usize = 6;

/// How many categories a breakdown keeps when the caller does not say.
pub const DEFAULT_BREAKDOWN_SIZE: usize = 5;

/// Reject transactions whose amounts cannot be summed meaningfully.
///
/// The stores never save such amounts, so this only trips on rows that were
/// written around them.
fn validate_amounts(transactions: &[Transaction]) -> Result<(), Error> {
    match transactions
        .iter()
        .find(|transaction| !transaction.amount.is_finite() || transaction.amount < 0.0)
    {
        Some(transaction) => {
            tracing::error!(
                "Transaction {} has invalid amount {}",
                transaction.id,
                transaction.amount
            );
            Err(Error::InvalidInput(format!(
                "transaction {} has the invalid amount {}",
                transaction.id, transaction.amount
            )))
        }
        None => Ok(()),
    }
}
