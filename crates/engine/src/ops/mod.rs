//! Engine operations.
//!
//! Every public operation takes the caller's `user_id` explicitly; the
//! presentation layer sources it once from the identity provider and threads
//! it through. Ownership is checked before any read or mutation: a record
//! owned by another user fails with [`EngineError::Forbidden`] and nothing
//! is written.
use std::sync::Arc;

use serde_json::Value;

use crate::{
    Budget, EngineError, Expense, Money, ResultEngine, budgets, expenses,
    store::{DocumentStore, Fields, StoreError},
};

mod budgets_ops;
mod expenses_ops;
mod stats;

pub use expenses_ops::RemovalTicket;
pub use stats::{BudgetActivity, Overview};

/// The consistency engine: keeps every budget's derived `spent` aggregate in
/// line with its child expenses and enforces per-user ownership.
///
/// Holds the injected document-store client; no ambient singletons.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn DocumentStore>,
}

impl Engine {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub(crate) async fn require_budget(
        &self,
        budget_id: &str,
        user_id: &str,
    ) -> ResultEngine<Budget> {
        let doc = self
            .store
            .get(&budgets::collection(), budget_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("budget {budget_id}")))?;
        let budget = Budget::from_document(doc)?;
        if budget.user_id != user_id {
            return Err(EngineError::Forbidden(format!(
                "budget {budget_id} belongs to another user"
            )));
        }
        Ok(budget)
    }

    pub(crate) async fn require_expense(
        &self,
        budget_id: &str,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        let doc = self
            .store
            .get(&expenses::collection(budget_id), expense_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("expense {expense_id}")))?;
        let expense = Expense::from_document(budget_id, doc)?;
        if expense.user_id != user_id {
            return Err(EngineError::Forbidden(format!(
                "expense {expense_id} belongs to another user"
            )));
        }
        Ok(expense)
    }

    /// Writes the derived `spent` aggregate. Internal only: `spent` is never
    /// settable through the public surface.
    pub(crate) async fn set_spent(&self, budget_id: &str, new_spent: Money) -> ResultEngine<()> {
        let mut fields = Fields::new();
        fields.insert(
            "spent".to_string(),
            serde_json::to_value(new_spent).unwrap_or(Value::Null),
        );
        self.store
            .update(&budgets::collection(), budget_id, fields)
            .await
            .map_err(|err| match err {
                StoreError::Missing(_) => EngineError::NotFound(format!("budget {budget_id}")),
                other => EngineError::Store(other),
            })
    }

    /// Full recomputation of `spent`: sums the amount of every expense
    /// currently under the budget for this user. Authoritative path that
    /// self-heals drift left behind by a partially failed incremental add.
    pub(crate) async fn resum(&self, budget_id: &str, user_id: &str) -> ResultEngine<Money> {
        let docs = self
            .store
            .query_eq(
                &expenses::collection(budget_id),
                "userId",
                &Value::String(user_id.to_string()),
            )
            .await?;

        let mut sum = Money::ZERO;
        for doc in docs {
            sum += Expense::from_document(budget_id, doc)?.amount;
        }
        Ok(sum)
    }
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}
