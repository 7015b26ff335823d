//! Budget CRUD, scoped to the calling user.
use serde_json::Value;

use crate::{
    Budget, BudgetChanges, Color, EngineError, Money, ResultEngine, budgets, expenses,
    store::StoreError,
};

use super::{Engine, normalize_required_text};

impl Engine {
    /// Returns all budgets owned by `user_id`. Order unspecified; consumers
    /// re-sort as needed.
    pub async fn list_budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        let docs = self
            .store()
            .query_eq(
                &budgets::collection(),
                "userId",
                &Value::String(user_id.to_string()),
            )
            .await?;
        docs.into_iter()
            .map(|doc| Budget::from_document(doc).map_err(EngineError::from))
            .collect()
    }

    /// Returns a single budget after the ownership check.
    pub async fn budget(&self, budget_id: &str, user_id: &str) -> ResultEngine<Budget> {
        self.require_budget(budget_id, user_id).await
    }

    /// Creates a budget with `spent = 0`, stamped with the caller's id.
    pub async fn new_budget(
        &self,
        category: &str,
        icon: &str,
        total: Money,
        color: Color,
        user_id: &str,
    ) -> ResultEngine<Budget> {
        let category = normalize_required_text(category, "category")?;
        if total.is_negative() {
            return Err(EngineError::Validation(
                "total must not be negative".to_string(),
            ));
        }

        let mut budget = Budget {
            id: String::new(),
            category,
            icon: icon.trim().to_string(),
            total,
            spent: Money::ZERO,
            color,
            user_id: user_id.to_string(),
        };
        budget.id = self
            .store()
            .insert(&budgets::collection(), budget.to_fields())
            .await?;

        tracing::info!(budget = %budget.id, user = user_id, "budget created");
        Ok(budget)
    }

    /// Updates the editable fields only. `spent` is derived and is never
    /// written by this operation.
    pub async fn update_budget(
        &self,
        budget_id: &str,
        changes: BudgetChanges,
        user_id: &str,
    ) -> ResultEngine<Budget> {
        let mut budget = self.require_budget(budget_id, user_id).await?;
        if changes.is_empty() {
            return Ok(budget);
        }

        let mut changes = changes;
        if let Some(category) = &changes.category {
            changes.category = Some(normalize_required_text(category, "category")?);
        }
        if let Some(total) = changes.total
            && total.is_negative()
        {
            return Err(EngineError::Validation(
                "total must not be negative".to_string(),
            ));
        }

        self.store()
            .update(&budgets::collection(), budget_id, changes.to_fields())
            .await
            .map_err(|err| match err {
                StoreError::Missing(_) => EngineError::NotFound(format!("budget {budget_id}")),
                other => EngineError::Store(other),
            })?;

        if let Some(category) = changes.category {
            budget.category = category;
        }
        if let Some(icon) = changes.icon {
            budget.icon = icon;
        }
        if let Some(total) = changes.total {
            budget.total = total;
        }
        if let Some(color) = changes.color {
            budget.color = color;
        }
        Ok(budget)
    }

    /// Removes a budget. The store does not cascade deletes, so child
    /// expenses are only removed when `purge_expenses` is set; otherwise
    /// they are left orphaned under the dead budget path.
    pub async fn delete_budget(
        &self,
        budget_id: &str,
        purge_expenses: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        self.require_budget(budget_id, user_id).await?;

        if purge_expenses {
            let docs = self
                .store()
                .query_eq(
                    &expenses::collection(budget_id),
                    "userId",
                    &Value::String(user_id.to_string()),
                )
                .await?;
            for doc in &docs {
                self.store()
                    .delete(&expenses::collection(budget_id), &doc.id)
                    .await?;
            }
            tracing::info!(
                budget = budget_id,
                removed = docs.len(),
                "purged child expenses"
            );
        }

        self.store().delete(&budgets::collection(), budget_id).await?;
        tracing::info!(budget = budget_id, user = user_id, "budget deleted");
        Ok(())
    }
}
