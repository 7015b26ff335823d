//! Expense operations and `spent` aggregate maintenance.
//!
//! Aggregate policy, two tiers:
//! - `add_expense` bumps the stored `spent` incrementally: one budget read,
//!   one aggregate write, no re-read of the expense set. Two racing sessions
//!   can lose an increment here (read-modify-write on a shared remote field,
//!   last write wins); the store offers no cross-document transaction to
//!   prevent it.
//! - removal and amount edits rewrite `spent` from a full resum of the
//!   remaining expenses. That path already reads the whole expense set, so
//!   it doubles as the reconciliation point that corrects accumulated drift.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    Budget, EngineError, Expense, ExpenseChanges, Money, ResultEngine, expenses,
    expenses::wire_date,
    store::{Fields, StoreError},
};

use super::{Engine, normalize_required_text};

/// Confirmation handle for a pending expense removal.
///
/// Step one (`request_expense_removal`) verifies ownership and names the
/// exact document; step two (`confirm_expense_removal`) re-verifies and
/// performs the delete. The core never blocks on a UI prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalTicket {
    pub token: Uuid,
    pub budget_id: String,
    pub expense_id: String,
}

impl Engine {
    /// Returns all expenses under `budget_id` owned by the caller.
    pub async fn list_expenses(
        &self,
        budget_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        self.require_budget(budget_id, user_id).await?;
        let docs = self
            .store()
            .query_eq(
                &expenses::collection(budget_id),
                "userId",
                &Value::String(user_id.to_string()),
            )
            .await?;
        docs.into_iter()
            .map(|doc| Expense::from_document(budget_id, doc).map_err(EngineError::from))
            .collect()
    }

    /// Creates an expense and bumps the budget's `spent` incrementally.
    ///
    /// Two writes with no atomicity across them: if the aggregate write
    /// fails after the expense insert, the stored `spent` is stale until the
    /// next resum. Returns the created expense and the budget's new state.
    pub async fn add_expense(
        &self,
        budget_id: &str,
        name: &str,
        amount: Money,
        date: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<(Expense, Budget)> {
        let name = normalize_required_text(name, "expense name")?;
        if !amount.is_positive() {
            return Err(EngineError::Validation(
                "amount must be positive".to_string(),
            ));
        }
        let date = match date {
            Some(raw) => wire_date::parse(raw).map_err(EngineError::Validation)?,
            None => Utc::now(),
        };

        let mut budget = self.require_budget(budget_id, user_id).await?;

        let mut expense = Expense {
            id: String::new(),
            budget_id: budget_id.to_string(),
            name,
            amount,
            date,
            user_id: user_id.to_string(),
        };
        expense.id = self
            .store()
            .insert(&expenses::collection(budget_id), expense.to_fields())
            .await?;

        budget.spent += amount;
        self.set_spent(budget_id, budget.spent).await?;

        tracing::info!(
            budget = budget_id,
            expense = %expense.id,
            amount = %amount,
            "expense added"
        );
        Ok((expense, budget))
    }

    /// Updates an expense's editable fields. An amount change rewrites the
    /// budget's `spent` from a full resum; name and date edits leave the
    /// aggregate alone.
    pub async fn edit_expense(
        &self,
        budget_id: &str,
        expense_id: &str,
        changes: ExpenseChanges,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        self.require_budget(budget_id, user_id).await?;
        let mut expense = self.require_expense(budget_id, expense_id, user_id).await?;
        if changes.is_empty() {
            return Ok(expense);
        }

        let mut fields = Fields::new();
        if let Some(name) = &changes.name {
            let name = normalize_required_text(name, "expense name")?;
            fields.insert("name".to_string(), Value::String(name.clone()));
            expense.name = name;
        }
        if let Some(amount) = changes.amount {
            if !amount.is_positive() {
                return Err(EngineError::Validation(
                    "amount must be positive".to_string(),
                ));
            }
            fields.insert(
                "amount".to_string(),
                serde_json::to_value(amount).unwrap_or(Value::Null),
            );
            expense.amount = amount;
        }
        if let Some(raw) = &changes.date {
            let date = wire_date::parse(raw).map_err(EngineError::Validation)?;
            fields.insert(
                "date".to_string(),
                Value::String(date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            );
            expense.date = date;
        }

        self.store()
            .update(&expenses::collection(budget_id), expense_id, fields)
            .await
            .map_err(|err| match err {
                StoreError::Missing(_) => EngineError::NotFound(format!("expense {expense_id}")),
                other => EngineError::Store(other),
            })?;

        if changes.amount.is_some() {
            let recomputed = self.resum(budget_id, user_id).await?;
            self.set_spent(budget_id, recomputed).await?;
        }

        Ok(expense)
    }

    /// First removal step: verifies the caller owns both records and returns
    /// a ticket naming the exact document to remove.
    pub async fn request_expense_removal(
        &self,
        budget_id: &str,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<RemovalTicket> {
        self.require_budget(budget_id, user_id).await?;
        let expense = self.require_expense(budget_id, expense_id, user_id).await?;
        Ok(RemovalTicket {
            token: Uuid::new_v4(),
            budget_id: budget_id.to_string(),
            expense_id: expense.id,
        })
    }

    /// Second removal step: deletes the expense, then rewrites `spent` from
    /// a full resum of the remaining expenses. Ownership is re-checked; a
    /// ticket whose expense is already gone fails with `NotFound` and leaves
    /// the aggregate untouched.
    pub async fn confirm_expense_removal(
        &self,
        ticket: &RemovalTicket,
        user_id: &str,
    ) -> ResultEngine<Budget> {
        let mut budget = self.require_budget(&ticket.budget_id, user_id).await?;
        let expense = self
            .require_expense(&ticket.budget_id, &ticket.expense_id, user_id)
            .await?;

        self.store()
            .delete(&expenses::collection(&ticket.budget_id), &expense.id)
            .await?;

        let recomputed = self.resum(&ticket.budget_id, user_id).await?;
        if recomputed != budget.spent - expense.amount {
            tracing::warn!(
                budget = %ticket.budget_id,
                stored = %budget.spent,
                recomputed = %recomputed,
                "spent aggregate had drifted, corrected by resum"
            );
        }
        self.set_spent(&ticket.budget_id, recomputed).await?;
        budget.spent = recomputed;

        tracing::info!(
            budget = %ticket.budget_id,
            expense = %ticket.expense_id,
            "expense removed"
        );
        Ok(budget)
    }
}
