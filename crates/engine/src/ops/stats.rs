//! Dashboard aggregates over a user's budgets.
use serde::Serialize;

use crate::{Money, ResultEngine};

use super::Engine;

/// Per-budget share of the activity chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetActivity {
    pub category: String,
    pub spent: Money,
    pub remaining: Money,
}

/// Totals across every budget the user owns.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overview {
    pub budgets: usize,
    pub total: Money,
    pub spent: Money,
    pub remaining: Money,
    pub activity: Vec<BudgetActivity>,
}

impl Engine {
    /// Returns overall totals plus the per-budget breakdown, sorted by
    /// category for stable output.
    pub async fn overview(&self, user_id: &str) -> ResultEngine<Overview> {
        let budgets = self.list_budgets(user_id).await?;

        let total: Money = budgets.iter().map(|b| b.total).sum();
        let spent: Money = budgets.iter().map(|b| b.spent).sum();

        let mut activity: Vec<BudgetActivity> = budgets
            .iter()
            .map(|b| BudgetActivity {
                category: b.category.clone(),
                spent: b.spent,
                remaining: b.remaining(),
            })
            .collect();
        activity.sort_by(|a, b| a.category.cmp(&b.category));

        Ok(Overview {
            budgets: budgets.len(),
            total,
            spent,
            remaining: total - spent,
            activity,
        })
    }
}
