//! Budget API endpoints.
use api_types::budget::{BudgetList, BudgetNew, BudgetUpdate, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Budget, BudgetChanges, Color, Money};
use serde::Deserialize;

use crate::{ServerError, server::ServerState, session::CurrentUser};

pub(crate) fn view(budget: Budget) -> BudgetView {
    let remaining = budget.remaining();
    BudgetView {
        id: budget.id,
        category: budget.category,
        icon: budget.icon,
        total: budget.total.units(),
        spent: budget.spent.units(),
        remaining: remaining.units(),
        color: budget.color.as_str().to_string(),
    }
}

fn parse_color(tag: Option<&str>) -> Result<Color, ServerError> {
    match tag {
        Some(tag) => Color::try_from(tag).map_err(ServerError::from),
        None => Ok(Color::default()),
    }
}

/// Handle requests for listing the caller's budgets.
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetList>, ServerError> {
    let budgets = state.engine.list_budgets(&user.0).await?;
    Ok(Json(BudgetList {
        budgets: budgets.into_iter().map(view).collect(),
    }))
}

/// Handle requests for creating a new budget.
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<Json<BudgetView>, ServerError> {
    let total = Money::from_units(payload.total)?;
    let color = parse_color(payload.color.as_deref())?;
    let budget = state
        .engine
        .new_budget(
            &payload.category,
            payload.icon.as_deref().unwrap_or_default(),
            total,
            color,
            &user.0,
        )
        .await?;
    Ok(Json(view(budget)))
}

/// Handle requests for editing a budget's fields. `spent` is derived and
/// not editable here.
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<BudgetView>, ServerError> {
    let changes = BudgetChanges {
        category: payload.category,
        icon: payload.icon,
        total: payload.total.map(Money::from_units).transpose()?,
        color: payload
            .color
            .as_deref()
            .map(Color::try_from)
            .transpose()?,
    };
    let budget = state.engine.update_budget(&budget_id, changes, &user.0).await?;
    Ok(Json(view(budget)))
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveParams {
    /// Also delete the child expenses; the store does not cascade.
    #[serde(default)]
    pub purge: bool,
}

/// Handle requests for deleting a budget.
pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
    Query(params): Query<RemoveParams>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_budget(&budget_id, params.purge, &user.0)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
