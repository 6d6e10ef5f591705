//! HTTP handlers for the dashboard and analytics endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, Transaction, UserID,
    app_state::lock_connection,
    auth::Session,
    category::{Category, get_all_categories},
    dashboard::view::{AnalyticsView, DashboardView, build_analytics, build_dashboard},
    statistics::{DEFAULT_BREAKDOWN_SIZE, DEFAULT_TREND_WINDOW_MONTHS, parse_date},
    timezone,
    transaction::get_all_transactions,
};

/// The largest trend window the analytics endpoint accepts, ten years.
const MAX_TREND_WINDOW_MONTHS: usize = 120;

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for accessing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// A "YYYY-MM-DD" date to use instead of today.
    pub reference_date: Option<String>,
}

/// The query parameters for the analytics charts.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// A "YYYY-MM-DD" date to use instead of today.
    pub reference_date: Option<String>,
    /// How many months the trend covers.
    pub months: Option<String>,
    /// How many categories each breakdown keeps.
    pub top: Option<String>,
}

/// Use the date given in the query, otherwise today in the local timezone.
fn resolve_reference_date(value: Option<&str>, local_timezone: &str) -> Result<Date, Error> {
    match parse_date(value, "reference_date")? {
        Some(date) => Ok(date),
        None => timezone::today(local_timezone),
    }
}

/// Parse an optional count parameter, falling back to `default` when it is missing.
fn parse_count(
    value: Option<&str>,
    name: &str,
    default: usize,
    max: usize,
) -> Result<usize, Error> {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(default);
    };

    match value.parse::<usize>() {
        Ok(count) if (1..=max).contains(&count) => Ok(count),
        _ => Err(Error::InvalidFilter(format!(
            "{name} must be a whole number from 1 to {max}, got \"{value}\""
        ))),
    }
}

/// Fetch the user's transactions and categories.
///
/// The lock is released before returning so that the statistics are computed
/// without holding up other requests.
fn load_user_data(
    db_connection: &Arc<Mutex<Connection>>,
    user_id: UserID,
) -> Result<(Vec<Transaction>, Vec<Category>), Error> {
    let connection = lock_connection(db_connection)?;
    let transactions = get_all_transactions(user_id, &connection)?;
    let categories = get_all_categories(user_id, &connection)?;

    Ok((transactions, categories))
}

/// Show the totals, top spending categories, recent months and latest transactions.
pub async fn get_dashboard(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, Error> {
    let reference_date =
        resolve_reference_date(query.reference_date.as_deref(), &state.local_timezone)?;
    let (transactions, categories) = load_user_data(&state.db_connection, session.user_id)?;

    let view = build_dashboard(&transactions, &categories, reference_date)?;

    Ok(Json(view))
}

/// Show the monthly trend and the income and expense breakdowns.
pub async fn get_analytics(
    State(state): State<DashboardState>,
    Extension(session): Extension<Session>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsView>, Error> {
    let reference_date =
        resolve_reference_date(query.reference_date.as_deref(), &state.local_timezone)?;
    let months = parse_count(
        query.months.as_deref(),
        "months",
        DEFAULT_TREND_WINDOW_MONTHS,
        MAX_TREND_WINDOW_MONTHS,
    )?;
    let top = parse_count(
        query.top.as_deref(),
        "top",
        DEFAULT_BREAKDOWN_SIZE,
        usize::MAX,
    )?;
    let (transactions, categories) = load_user_data(&state.db_connection, session.user_id)?;

    let view = build_analytics(&transactions, &categories, reference_date, months, top)?;

    Ok(Json(view))
}

#[cfg(test)]
mod parse_count_tests {
    use crate::{Error, dashboard::handlers::parse_count};

    #[test]
    fn missing_or_blank_uses_default() {
        assert_eq!(parse_count(None, "months", 6, 120), Ok(6));
        assert_eq!(parse_count(Some(" "), "months", 6, 120), Ok(6));
    }

    #[test]
    fn accepts_bounds() {
        assert_eq!(parse_count(Some("1"), "months", 6, 120), Ok(1));
        assert_eq!(parse_count(Some("120"), "months", 6, 120), Ok(120));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        for value in ["0", "121", "-1", "six"] {
            assert!(
                matches!(
                    parse_count(Some(value), "months", 6, 120),
                    Err(Error::InvalidFilter(_))
                ),
                "{value} should be rejected"
            );
        }
    }
}
