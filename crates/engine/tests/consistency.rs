use std::sync::Arc;

use serde_json::json;

use engine::{
    Budget, BudgetChanges, Color, Engine, EngineError, ExpenseChanges, Money,
    store::{DocumentStore, MemoryStore},
};

fn engine_with_store() -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = Engine::new(store.clone());
    (engine, store)
}

async fn food_budget(engine: &Engine, user: &str) -> Budget {
    engine
        .new_budget("Food", "🍕", Money::new(100_000), Color::Purple, user)
        .await
        .unwrap()
}

async fn remove_expense(engine: &Engine, budget_id: &str, expense_id: &str, user: &str) -> Budget {
    let ticket = engine
        .request_expense_removal(budget_id, expense_id, user)
        .await
        .unwrap();
    engine.confirm_expense_removal(&ticket, user).await.unwrap()
}

#[tokio::test]
async fn new_budget_starts_unspent() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;

    assert_eq!(budget.spent, Money::ZERO);
    assert_eq!(budget.total, Money::new(100_000));
    assert_eq!(budget.user_id, "alice");
    assert!(!budget.id.is_empty());
}

#[tokio::test]
async fn spent_tracks_adds_and_removals() {
    // End-to-end scenario: create, add two expenses, delete one.
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;

    let (lunch, budget_after) = engine
        .add_expense(&budget.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();
    assert_eq!(budget_after.spent, Money::new(25_000));

    let (_dinner, budget_after) = engine
        .add_expense(&budget.id, "Dinner", Money::new(30_000), None, "alice")
        .await
        .unwrap();
    assert_eq!(budget_after.spent, Money::new(55_000));

    let budget_after = remove_expense(&engine, &budget.id, &lunch.id, "alice").await;
    assert_eq!(budget_after.spent, Money::new(30_000));

    let remaining = engine.list_expenses(&budget.id, "alice").await.unwrap();
    let sum: Money = remaining.iter().map(|e| e.amount).sum();
    assert_eq!(budget_after.spent, sum);
}

#[tokio::test]
async fn spent_matches_sum_after_arbitrary_sequence() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;

    let mut ids = Vec::new();
    for (name, cents) in [("a", 101), ("b", 202), ("c", 33), ("d", 4004)] {
        let (expense, _) = engine
            .add_expense(&budget.id, name, Money::new(cents), None, "alice")
            .await
            .unwrap();
        ids.push(expense.id);
    }
    remove_expense(&engine, &budget.id, &ids[1], "alice").await;
    remove_expense(&engine, &budget.id, &ids[3], "alice").await;

    let stored = engine.budget(&budget.id, "alice").await.unwrap();
    let expenses = engine.list_expenses(&budget.id, "alice").await.unwrap();
    let sum: Money = expenses.iter().map(|e| e.amount).sum();
    assert_eq!(stored.spent, sum);
    assert_eq!(stored.spent, Money::new(101 + 33));
}

#[tokio::test]
async fn validation_rejects_bad_input() {
    let (engine, _store) = engine_with_store();

    let err = engine
        .new_budget("", "", Money::new(10_000), Color::Gray, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .new_budget("Food", "", Money::new(-500), Color::Gray, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let budget = food_budget(&engine, "alice").await;
    let err = engine
        .add_expense(&budget.id, "Coffee", Money::ZERO, None, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .add_expense(&budget.id, "   ", Money::new(100), None, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .add_expense(&budget.id, "Coffee", Money::new(100), Some("someday"), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Nothing was written by the rejected calls.
    let stored = engine.budget(&budget.id, "alice").await.unwrap();
    assert_eq!(stored.spent, Money::ZERO);
    assert!(engine.list_expenses(&budget.id, "alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn other_users_are_locked_out() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;
    let (expense, _) = engine
        .add_expense(&budget.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();

    let forbidden = |err: EngineError| matches!(err, EngineError::Forbidden(_));

    assert!(forbidden(engine.budget(&budget.id, "mallory").await.unwrap_err()));
    assert!(forbidden(
        engine
            .update_budget(
                &budget.id,
                BudgetChanges {
                    category: Some("Stolen".to_string()),
                    ..Default::default()
                },
                "mallory",
            )
            .await
            .unwrap_err()
    ));
    assert!(forbidden(
        engine.delete_budget(&budget.id, false, "mallory").await.unwrap_err()
    ));
    assert!(forbidden(
        engine.list_expenses(&budget.id, "mallory").await.unwrap_err()
    ));
    assert!(forbidden(
        engine
            .add_expense(&budget.id, "Theft", Money::new(1), None, "mallory")
            .await
            .unwrap_err()
    ));
    assert!(forbidden(
        engine
            .request_expense_removal(&budget.id, &expense.id, "mallory")
            .await
            .unwrap_err()
    ));

    // A ticket issued to the owner is still bound by the confirmer's session.
    let ticket = engine
        .request_expense_removal(&budget.id, &expense.id, "alice")
        .await
        .unwrap();
    assert!(forbidden(
        engine.confirm_expense_removal(&ticket, "mallory").await.unwrap_err()
    ));

    // No state change happened.
    let stored = engine.budget(&budget.id, "alice").await.unwrap();
    assert_eq!(stored.category, "Food");
    assert_eq!(stored.spent, Money::new(25_000));
    assert_eq!(engine.list_expenses(&budget.id, "alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn users_only_see_their_own_budgets() {
    let (engine, _store) = engine_with_store();
    food_budget(&engine, "alice").await;
    engine
        .new_budget("Rent", "", Money::new(80_000), Color::Blue, "bob")
        .await
        .unwrap();

    let mine = engine.list_budgets("alice").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].category, "Food");

    let theirs = engine.list_budgets("bob").await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].category, "Rent");
}

#[tokio::test]
async fn removal_resum_heals_drifted_aggregate() {
    let (engine, store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;
    let (lunch, _) = engine
        .add_expense(&budget.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();
    engine
        .add_expense(&budget.id, "Dinner", Money::new(30_000), None, "alice")
        .await
        .unwrap();

    // Simulate drift from a partially failed add in another session.
    store.overwrite_field(
        &engine::store::CollectionRef::top("budgets"),
        &budget.id,
        "spent",
        json!(999),
    );
    let drifted = engine.budget(&budget.id, "alice").await.unwrap();
    assert_eq!(drifted.spent, Money::new(99_900));

    let healed = remove_expense(&engine, &budget.id, &lunch.id, "alice").await;
    assert_eq!(healed.spent, Money::new(30_000));
}

#[tokio::test]
async fn second_removal_of_same_expense_fails_cleanly() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;
    let (lunch, _) = engine
        .add_expense(&budget.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();
    engine
        .add_expense(&budget.id, "Dinner", Money::new(30_000), None, "alice")
        .await
        .unwrap();

    let ticket = engine
        .request_expense_removal(&budget.id, &lunch.id, "alice")
        .await
        .unwrap();
    let after_first = engine.confirm_expense_removal(&ticket, "alice").await.unwrap();
    assert_eq!(after_first.spent, Money::new(30_000));

    let err = engine
        .confirm_expense_removal(&ticket, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let stored = engine.budget(&budget.id, "alice").await.unwrap();
    assert_eq!(stored.spent, Money::new(30_000));
}

#[tokio::test]
async fn amount_edit_triggers_resum() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;
    let (lunch, _) = engine
        .add_expense(&budget.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();
    engine
        .add_expense(&budget.id, "Dinner", Money::new(30_000), None, "alice")
        .await
        .unwrap();

    let edited = engine
        .edit_expense(
            &budget.id,
            &lunch.id,
            ExpenseChanges {
                amount: Some(Money::new(10_000)),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(edited.amount, Money::new(10_000));

    let stored = engine.budget(&budget.id, "alice").await.unwrap();
    assert_eq!(stored.spent, Money::new(40_000));
}

#[tokio::test]
async fn name_edit_leaves_aggregate_alone() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;
    let (lunch, _) = engine
        .add_expense(&budget.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();

    let edited = engine
        .edit_expense(
            &budget.id,
            &lunch.id,
            ExpenseChanges {
                name: Some("Brunch".to_string()),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(edited.name, "Brunch");

    let stored = engine.budget(&budget.id, "alice").await.unwrap();
    assert_eq!(stored.spent, Money::new(25_000));
}

#[tokio::test]
async fn budget_edit_never_touches_spent() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;
    engine
        .add_expense(&budget.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();

    let updated = engine
        .update_budget(
            &budget.id,
            BudgetChanges {
                category: Some("Groceries".to_string()),
                total: Some(Money::new(200_000)),
                color: Some(Color::Green),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();

    assert_eq!(updated.category, "Groceries");
    assert_eq!(updated.total, Money::new(200_000));
    assert_eq!(updated.color, Color::Green);
    assert_eq!(updated.spent, Money::new(25_000));

    let stored = engine.budget(&budget.id, "alice").await.unwrap();
    assert_eq!(stored.spent, Money::new(25_000));
}

#[tokio::test]
async fn delete_budget_purges_expenses_only_on_request() {
    let (engine, store) = engine_with_store();

    let kept = food_budget(&engine, "alice").await;
    engine
        .add_expense(&kept.id, "Lunch", Money::new(100), None, "alice")
        .await
        .unwrap();
    engine.delete_budget(&kept.id, false, "alice").await.unwrap();
    // The store does not cascade: the orphaned child document is still there.
    let orphans = store
        .list(&engine::store::CollectionRef::top("budgets").child(&kept.id, "expenses"))
        .await
        .unwrap();
    assert_eq!(orphans.len(), 1);

    let purged = food_budget(&engine, "alice").await;
    engine
        .add_expense(&purged.id, "Lunch", Money::new(100), None, "alice")
        .await
        .unwrap();
    engine.delete_budget(&purged.id, true, "alice").await.unwrap();
    let leftovers = store
        .list(&engine::store::CollectionRef::top("budgets").child(&purged.id, "expenses"))
        .await
        .unwrap();
    assert!(leftovers.is_empty());

    let err = engine.budget(&purged.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn user_dates_normalize_to_timestamps() {
    let (engine, _store) = engine_with_store();
    let budget = food_budget(&engine, "alice").await;

    let (expense, _) = engine
        .add_expense(
            &budget.id,
            "Lunch",
            Money::new(100),
            Some("2024-05-01"),
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(
        expense.date,
        "2024-05-01T00:00:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap()
    );

    let listed = engine.list_expenses(&budget.id, "alice").await.unwrap();
    assert_eq!(listed[0].date, expense.date);
}

#[tokio::test]
async fn overview_aggregates_across_budgets() {
    let (engine, _store) = engine_with_store();
    let food = food_budget(&engine, "alice").await;
    let rent = engine
        .new_budget("Rent", "", Money::new(80_000), Color::Blue, "alice")
        .await
        .unwrap();
    engine
        .new_budget("Other", "", Money::new(10_000), Color::Red, "bob")
        .await
        .unwrap();

    engine
        .add_expense(&food.id, "Lunch", Money::new(25_000), None, "alice")
        .await
        .unwrap();
    engine
        .add_expense(&rent.id, "May", Money::new(80_000), None, "alice")
        .await
        .unwrap();

    let overview = engine.overview("alice").await.unwrap();
    assert_eq!(overview.budgets, 2);
    assert_eq!(overview.total, Money::new(180_000));
    assert_eq!(overview.spent, Money::new(105_000));
    assert_eq!(overview.remaining, Money::new(75_000));
    assert_eq!(overview.activity.len(), 2);
    assert_eq!(overview.activity[0].category, "Food");
    assert_eq!(overview.activity[0].remaining, Money::new(75_000));
    assert_eq!(overview.activity[1].category, "Rent");
    assert_eq!(overview.activity[1].remaining, Money::ZERO);
}
