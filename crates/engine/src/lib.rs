//! Core of the budgeting service: the consistency engine and its
//! repository logic.
//!
//! Budgets carry a derived `spent` aggregate that must equal the sum of
//! their child expenses after every completed mutation. The engine owns
//! that invariant, plus the ownership invariant: no record is read or
//! mutated by a session whose user id does not match the record's owner.
//!
//! Persistence and identity are external: the engine only consumes an
//! injected [`store::DocumentStore`] client; user ids arrive as explicit
//! parameters on every operation.
pub use budgets::{Budget, BudgetChanges};
pub use color::Color;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseChanges};
pub use money::Money;
pub use ops::{BudgetActivity, Engine, Overview, RemovalTicket};

mod budgets;
mod color;
mod error;
mod expenses;
mod money;
mod ops;
pub mod store;

pub(crate) type ResultEngine<T> = Result<T, EngineError>;
