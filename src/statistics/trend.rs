//! Monthly income, expense and savings buckets for trend charts.

use std::collections::HashMap;

use serde::Serialize;
use time::{Date, Month};

use crate::{Error, Transaction, TransactionType, statistics::validate_amounts};

/// The income and expenses of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// The first day of the month.
    pub month: Date,
    /// The three-letter month name, e.g. "Jan".
    pub month_label: String,
    /// The sum of income in the month.
    pub income: f64,
    /// The sum of expenses in the month.
    pub expenses: f64,
    /// `income - expenses`.
    pub savings: f64,
}

/// Format the month of `date` as a three-letter abbreviation, e.g. "Jan".
pub fn month_label(date: Date) -> &'static str {
    match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn out_of_range(date: Date) -> Error {
    Error::InvalidInput(format!("the month window around {date} is out of range"))
}

/// The first day of `months` months after (or before, if negative) the month of `date`.
fn shift_month(date: Date, months: i64) -> Result<Date, Error> {
    let index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 + months;
    let year = i32::try_from(index.div_euclid(12)).map_err(|_| out_of_range(date))?;
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).map_err(|_| out_of_range(date))?;

    Date::from_calendar_date(year, month, 1).map_err(|_| out_of_range(date))
}

/// Bucket `transactions` by month over the `window_size_months` calendar months
/// ending with the month containing `reference_date`.
///
/// Buckets are oldest first and every month in the window gets one, even if it
/// has no transactions. Transactions outside the window are ignored.
///
/// # Errors
/// Returns [Error::InvalidInput] if any amount is negative or not finite, or
/// if the window reaches outside the supported date range.
pub fn compute_monthly_trend(
    transactions: &[Transaction],
    window_size_months: usize,
    reference_date: Date,
) -> Result<Vec<MonthlyBucket>, Error> {
    validate_amounts(transactions)?;

    let window = i64::try_from(window_size_months).map_err(|_| out_of_range(reference_date))?;
    let mut buckets = (0..window)
        .rev()
        .map(|months_ago| {
            shift_month(reference_date, -months_ago).map(|month| MonthlyBucket {
                month,
                month_label: month_label(month).to_owned(),
                income: 0.0,
                expenses: 0.0,
                savings: 0.0,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let bucket_index: HashMap<(i32, Month), usize> = buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| ((bucket.month.year(), bucket.month.month()), index))
        .collect();

    for transaction in transactions {
        let key = (transaction.date.year(), transaction.date.month());

        if let Some(&index) = bucket_index.get(&key) {
            let bucket = &mut buckets[index];
            match transaction.transaction_type {
                TransactionType::Income => bucket.income += transaction.amount,
                TransactionType::Expense => bucket.expenses += transaction.amount,
            }
        }
    }

    for bucket in &mut buckets {
        bucket.savings = bucket.income - bucket.expenses;
    }

    Ok(buckets)
}
