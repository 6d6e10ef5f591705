//! Dashboard module
//!
//! Provides the dashboard summary and the analytics charts. Both are built
//! from the statistics engine's output over the user's current transactions.

mod handlers;
mod view;

pub use handlers::{DashboardState, get_analytics, get_dashboard};
pub use view::{AnalyticsView, DashboardView, RecentTransaction};
