//! Dashboard statistics endpoint.
use api_types::stats::{BudgetActivity, Overview};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, session::CurrentUser};

/// Handle requests for the caller's dashboard totals and activity breakdown.
pub async fn get_stats(
    Extension(user): Extension<CurrentUser>,
    State(state): State<ServerState>,
) -> Result<Json<Overview>, ServerError> {
    let overview = state.engine.overview(&user.0).await?;
    Ok(Json(Overview {
        budgets: overview.budgets,
        total: overview.total.units(),
        spent: overview.spent.units(),
        remaining: overview.remaining.units(),
        activity: overview
            .activity
            .into_iter()
            .map(|entry| BudgetActivity {
                category: entry.category,
                spent: entry.spent.units(),
                remaining: entry.remaining.units(),
            })
            .collect(),
    }))
}
