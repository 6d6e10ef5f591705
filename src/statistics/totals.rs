use serde::Serialize;

use crate::{Error, Transaction, TransactionType, statistics::validate_amounts};

/// The overall income, expenses and balance of a list of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    /// The sum of all income.
    pub total_income: f64,
    /// The sum of all expenses.
    pub total_expenses: f64,
    /// `total_income - total_expenses`.
    pub balance: f64,
}

/// Sum the income and expenses in `transactions`.
///
/// An empty list gives all zeros.
///
/// # Errors
/// Returns [Error::InvalidInput] if any amount is negative or not finite.
pub fn compute_totals(transactions: &[Transaction]) -> Result<Totals, Error> {
    validate_amounts(transactions)?;

    let (total_income, total_expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), transaction| {
                match transaction.transaction_type {
                    TransactionType::Income => (income + transaction.amount, expenses),
                    TransactionType::Expense => (income, expenses + transaction.amount),
                }
            });

    Ok(Totals {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    })
}
