//! The JSON view models for the dashboard and analytics screens.

use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use crate::{
    Error, Transaction, TransactionType,
    category::{Category, CategoryId},
    statistics::{
        CategoryStat, DEFAULT_BREAKDOWN_SIZE, DEFAULT_TREND_WINDOW_MONTHS, MonthlyBucket, Totals,
        UNKNOWN_CATEGORY_COLOR, UNKNOWN_CATEGORY_NAME, compute_category_breakdown,
        compute_monthly_trend, compute_totals,
    },
    transaction::TransactionId,
};

/// How many transactions the dashboard lists under "recent".
pub(super) const RECENT_TRANSACTION_COUNT: usize = 5;

/// A transaction as shown in the dashboard's recent transactions table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub date: Date,
    pub description: String,
    pub category_id: Option<CategoryId>,
    /// The category's name, or "Unknown" if it has none.
    pub category_name: String,
    pub category_color: String,
}

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// The day the trend window ends on.
    pub reference_date: Date,
    pub totals: Totals,
    /// The biggest expense categories.
    pub spending_by_category: Vec<CategoryStat>,
    pub monthly_trend: Vec<MonthlyBucket>,
    pub recent_transactions: Vec<RecentTransaction>,
}

/// Everything the analytics screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub reference_date: Date,
    pub months: usize,
    pub monthly_trend: Vec<MonthlyBucket>,
    pub expense_breakdown: Vec<CategoryStat>,
    pub income_breakdown: Vec<CategoryStat>,
}

/// Build the dashboard from a user's transactions and categories.
///
/// `transactions` should be ordered newest first, the way the store returns
/// them, since the first few become the recent transactions.
///
/// # Errors
/// Returns [Error::InvalidInput] if a transaction has an invalid amount.
pub(super) fn build_dashboard(
    transactions: &[Transaction],
    categories: &[Category],
    reference_date: Date,
) -> Result<DashboardView, Error> {
    let totals = compute_totals(transactions)?;
    let spending_by_category = compute_category_breakdown(
        transactions,
        categories,
        TransactionType::Expense,
        DEFAULT_BREAKDOWN_SIZE,
    )?;
    let monthly_trend =
        compute_monthly_trend(transactions, DEFAULT_TREND_WINDOW_MONTHS, reference_date)?;

    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let recent_transactions = transactions
        .iter()
        .take(RECENT_TRANSACTION_COUNT)
        .map(|transaction| {
            let category = transaction
                .category_id
                .and_then(|id| categories_by_id.get(&id));

            RecentTransaction {
                id: transaction.id,
                transaction_type: transaction.transaction_type,
                amount: transaction.amount,
                date: transaction.date,
                description: transaction.description.clone(),
                category_id: transaction.category_id,
                category_name: category.map_or(UNKNOWN_CATEGORY_NAME.to_owned(), |category| {
                    category.name.to_string()
                }),
                category_color: category.map_or(UNKNOWN_CATEGORY_COLOR.to_owned(), |category| {
                    category.color.as_ref().to_owned()
                }),
            }
        })
        .collect();

    Ok(DashboardView {
        reference_date,
        totals,
        spending_by_category,
        monthly_trend,
        recent_transactions,
    })
}

/// Build the analytics charts: a trend over `months` months ending at
/// `reference_date` and the `top` biggest expense and income categories.
///
/// # Errors
/// Returns [Error::InvalidInput] if a transaction has an invalid amount.
pub(super) fn build_analytics(
    transactions: &[Transaction],
    categories: &[Category],
    reference_date: Date,
    months: usize,
    top: usize,
) -> Result<AnalyticsView, Error> {
    Ok(AnalyticsView {
        reference_date,
        months,
        monthly_trend: compute_monthly_trend(transactions, months, reference_date)?,
        expense_breakdown: compute_category_breakdown(
            transactions,
            categories,
            TransactionType::Expense,
            top,
        )?,
        income_breakdown: compute_category_breakdown(
            transactions,
            categories,
            TransactionType::Income,
            top,
        )?,
    })
}

#[cfg(test)]
mod view_tests {
    use time::macros::date;

    use crate::{
        Transaction, TransactionType,
        dashboard::view::{RECENT_TRANSACTION_COUNT, build_analytics, build_dashboard},
        statistics::{
            UNKNOWN_CATEGORY_COLOR, UNKNOWN_CATEGORY_NAME,
            test_fixtures::{category, transaction},
        },
    };

    fn in_category(mut transaction: Transaction, category_id: i64) -> Transaction {
        transaction.category_id = Some(category_id);
        transaction
    }

    #[test]
    fn dashboard_combines_engine_output() {
        let categories = vec![category(1, "Rent", TransactionType::Expense)];
        let transactions = vec![
            in_category(
                transaction(2, TransactionType::Expense, 300.0, date!(2024 - 06 - 02)),
                1,
            ),
            transaction(1, TransactionType::Income, 1000.0, date!(2024 - 06 - 01)),
        ];

        let got = build_dashboard(&transactions, &categories, date!(2024 - 06 - 15)).unwrap();

        assert_eq!(got.totals.balance, 700.0);
        assert_eq!(got.spending_by_category.len(), 1);
        assert_eq!(got.spending_by_category[0].name, "Rent");
        assert_eq!(got.monthly_trend.len(), 6);
        assert_eq!(got.monthly_trend[5].savings, 700.0);
        assert_eq!(got.recent_transactions.len(), 2);
    }

    #[test]
    fn recent_transactions_keep_order_and_limit() {
        let transactions: Vec<_> = (1..=8)
            .rev()
            .map(|id| transaction(id, TransactionType::Expense, 1.0, date!(2024 - 06 - 01)))
            .collect();

        let got = build_dashboard(&transactions, &[], date!(2024 - 06 - 15)).unwrap();

        let ids: Vec<_> = got.recent_transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), RECENT_TRANSACTION_COUNT);
        assert_eq!(ids, vec![8, 7, 6, 5, 4]);
    }

    #[test]
    fn recent_transactions_resolve_category() {
        let categories = vec![category(3, "Groceries", TransactionType::Expense)];
        let transactions = vec![
            in_category(
                transaction(1, TransactionType::Expense, 1.0, date!(2024 - 06 - 01)),
                3,
            ),
            transaction(2, TransactionType::Expense, 1.0, date!(2024 - 06 - 01)),
            in_category(
                transaction(3, TransactionType::Expense, 1.0, date!(2024 - 06 - 01)),
                99,
            ),
        ];

        let got = build_dashboard(&transactions, &categories, date!(2024 - 06 - 15)).unwrap();

        let recent = &got.recent_transactions;
        assert_eq!(recent[0].category_name, "Groceries");
        assert_eq!(recent[0].category_color, "#000003");
        assert_eq!(recent[1].category_name, UNKNOWN_CATEGORY_NAME);
        assert_eq!(recent[1].category_color, UNKNOWN_CATEGORY_COLOR);
        assert_eq!(recent[2].category_name, UNKNOWN_CATEGORY_NAME);
    }

    #[test]
    fn empty_dashboard_has_zeroed_trend() {
        let got = build_dashboard(&[], &[], date!(2024 - 01 - 10)).unwrap();

        assert_eq!(got.totals.balance, 0.0);
        assert!(got.spending_by_category.is_empty());
        assert!(got.recent_transactions.is_empty());
        assert!(
            got.monthly_trend
                .iter()
                .all(|bucket| bucket.income == 0.0 && bucket.expenses == 0.0)
        );
    }

    #[test]
    fn analytics_splits_breakdowns_by_type() {
        let categories = vec![
            category(1, "Salary", TransactionType::Income),
            category(2, "Food", TransactionType::Expense),
            category(3, "Travel", TransactionType::Expense),
        ];
        let transactions = vec![
            in_category(
                transaction(1, TransactionType::Income, 500.0, date!(2024 - 03 - 01)),
                1,
            ),
            in_category(
                transaction(2, TransactionType::Expense, 25.0, date!(2024 - 03 - 02)),
                2,
            ),
            in_category(
                transaction(3, TransactionType::Expense, 75.0, date!(2024 - 03 - 03)),
                3,
            ),
        ];

        let got =
            build_analytics(&transactions, &categories, date!(2024 - 03 - 31), 12, 1).unwrap();

        assert_eq!(got.months, 12);
        assert_eq!(got.monthly_trend.len(), 12);
        assert_eq!(got.expense_breakdown.len(), 1);
        assert_eq!(got.expense_breakdown[0].name, "Travel");
        assert_eq!(got.expense_breakdown[0].percentage, 75.0);
        assert_eq!(got.income_breakdown.len(), 1);
        assert_eq!(got.income_breakdown[0].name, "Salary");
    }

    #[test]
    fn invalid_amounts_are_reported() {
        let transactions = vec![transaction(
            1,
            TransactionType::Expense,
            f64::NAN,
            date!(2024 - 03 - 01),
        )];

        assert!(build_dashboard(&transactions, &[], date!(2024 - 03 - 31)).is_err());
    }
}
