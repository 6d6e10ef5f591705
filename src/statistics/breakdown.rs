//! Per-category totals for pie and bar charts.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    Error, Transaction, TransactionType,
    category::{Category, CategoryId},
    statistics::{UNKNOWN_CATEGORY_COLOR, UNKNOWN_CATEGORY_NAME, validate_amounts},
};

/// The total spent or earned in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    /// The category, or `None` for transactions without a known category.
    pub category_id: Option<CategoryId>,
    /// The category name, or "Unknown".
    pub name: String,
    /// The category's chart color.
    pub color: String,
    /// The sum of the amounts in this category.
    pub total: f64,
    /// This category's share of the total across all categories, from 0 to 100.
    pub percentage: f64,
}

/// Group the transactions of `type_filter` by category and rank the groups by total.
///
/// Transactions with no category, or a category ID that is not in `categories`,
/// are pooled in a single "Unknown" group. Percentages are worked out over all
/// groups before the list is cut to the `top_n` largest. Groups with equal
/// totals keep the order in which they first appear in `transactions`.
///
/// The category's own type is not checked against `type_filter`.
///
/// # Errors
/// Returns [Error::InvalidInput] if any amount is negative or not finite.
pub fn compute_category_breakdown(
    transactions: &[Transaction],
    categories: &[Category],
    type_filter: TransactionType,
    top_n: usize,
) -> Result<Vec<CategoryStat>, Error> {
    validate_amounts(transactions)?;

    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let mut stats: Vec<CategoryStat> = Vec::new();
    let mut stat_index: HashMap<Option<CategoryId>, usize> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == type_filter)
    {
        let category = transaction
            .category_id
            .and_then(|id| categories_by_id.get(&id).copied());
        let key = category.map(|category| category.id);

        let index = *stat_index.entry(key).or_insert_with(|| {
            stats.push(match category {
                Some(category) => CategoryStat {
                    category_id: Some(category.id),
                    name: category.name.to_string(),
                    color: category.color.as_ref().to_owned(),
                    total: 0.0,
                    percentage: 0.0,
                },
                None => CategoryStat {
                    category_id: None,
                    name: UNKNOWN_CATEGORY_NAME.to_owned(),
                    color: UNKNOWN_CATEGORY_COLOR.to_owned(),
                    total: 0.0,
                    percentage: 0.0,
                },
            });
            stats.len() - 1
        });

        stats[index].total += transaction.amount;
    }

    let grand_total: f64 = stats.iter().map(|stat| stat.total).sum();
    if grand_total > 0.0 {
        for stat in &mut stats {
            stat.percentage = stat.total / grand_total * 100.0;
        }
    }

    // `sort_by` is stable, so ties stay in first-seen order.
    stats.sort_by(|a, b| b.total.total_cmp(&a.total));
    stats.truncate(top_n);

    Ok(stats)
}
