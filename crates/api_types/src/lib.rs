//! Request/response types shared by the HTTP server and its clients.
//!
//! Amounts are JSON numbers in currency units; colors are the palette tags
//! stored on the records (`bg-purple-500` and friends).
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category: String,
        pub icon: Option<String>,
        pub total: f64,
        pub color: Option<String>,
    }

    /// All fields optional; unset fields are left untouched. `spent` is
    /// derived and cannot be set through the API.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub category: Option<String>,
        pub icon: Option<String>,
        pub total: Option<f64>,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: String,
        pub category: String,
        pub icon: String,
        pub total: f64,
        pub spent: f64,
        pub remaining: f64,
        pub color: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetList {
        pub budgets: Vec<BudgetView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub name: String,
        pub amount: f64,
        /// RFC 3339 timestamp or plain `YYYY-MM-DD`; defaults to now.
        pub date: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub name: Option<String>,
        pub amount: Option<f64>,
        pub date: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: String,
        pub budget_id: String,
        pub name: String,
        pub amount: f64,
        /// Always RFC 3339 UTC on the way out.
        pub date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub expenses: Vec<ExpenseView>,
    }

    /// Expense creation also returns the budget's refreshed state so clients
    /// can repaint the progress bar without a second round trip.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub expense: ExpenseView,
        pub budget: super::budget::BudgetView,
    }
}

pub mod removal {
    use super::*;

    /// Confirmation handle for a pending expense removal: returned by the
    /// request step, posted back verbatim to confirm.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RemovalTicket {
        pub token: Uuid,
        pub budget_id: String,
        pub expense_id: String,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetActivity {
        pub category: String,
        pub spent: f64,
        pub remaining: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Overview {
        pub budgets: usize,
        pub total: f64,
        pub spent: f64,
        pub remaining: f64,
        pub activity: Vec<BudgetActivity>,
    }
}
