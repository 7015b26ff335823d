//! Expense API endpoints, including the two-step removal flow.
use api_types::{
    budget::BudgetView,
    expense::{ExpenseCreated, ExpenseList, ExpenseNew, ExpenseUpdate, ExpenseView},
    removal::RemovalTicket,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::SecondsFormat;
use engine::{Expense, ExpenseChanges, Money};

use crate::{ServerError, budgets, server::ServerState, session::CurrentUser};

pub(crate) fn view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        budget_id: expense.budget_id,
        name: expense.name,
        amount: expense.amount.units(),
        date: expense.date.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Handle requests for listing a budget's expenses.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
) -> Result<Json<ExpenseList>, ServerError> {
    let expenses = state.engine.list_expenses(&budget_id, &user.0).await?;
    Ok(Json(ExpenseList {
        expenses: expenses.into_iter().map(view).collect(),
    }))
}

/// Handle requests for logging a new expense. Returns the expense together
/// with the budget's refreshed state.
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseCreated>, ServerError> {
    let amount = Money::from_units(payload.amount)?;
    let (expense, budget) = state
        .engine
        .add_expense(
            &budget_id,
            &payload.name,
            amount,
            payload.date.as_deref(),
            &user.0,
        )
        .await?;
    Ok(Json(ExpenseCreated {
        expense: view(expense),
        budget: budgets::view(budget),
    }))
}

/// Handle requests for editing an expense.
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path((budget_id, expense_id)): Path<(String, String)>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let changes = ExpenseChanges {
        name: payload.name,
        amount: payload.amount.map(Money::from_units).transpose()?,
        date: payload.date,
    };
    let expense = state
        .engine
        .edit_expense(&budget_id, &expense_id, changes, &user.0)
        .await?;
    Ok(Json(view(expense)))
}

/// First removal step: returns a confirmation ticket for the expense.
pub async fn request_removal(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path((budget_id, expense_id)): Path<(String, String)>,
) -> Result<Json<RemovalTicket>, ServerError> {
    let ticket = state
        .engine
        .request_expense_removal(&budget_id, &expense_id, &user.0)
        .await?;
    Ok(Json(RemovalTicket {
        token: ticket.token,
        budget_id: ticket.budget_id,
        expense_id: ticket.expense_id,
    }))
}

/// Second removal step: posts the ticket back to perform the delete.
/// Returns the budget with its recomputed `spent`.
pub async fn confirm_removal(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<RemovalTicket>,
) -> Result<Json<BudgetView>, ServerError> {
    let ticket = engine::RemovalTicket {
        token: payload.token,
        budget_id: payload.budget_id,
        expense_id: payload.expense_id,
    };
    let budget = state.engine.confirm_expense_removal(&ticket, &user.0).await?;
    Ok(Json(budgets::view(budget)))
}
