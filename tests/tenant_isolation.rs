mod common;

use anyhow::Result;
use common::{login, open_store};
use daybook::finance::FinancialExpense;
use daybook::goals::Goal;
use daybook::tasks::Task;
use daybook::Session;

#[tokio::test]
async fn reads_only_return_the_current_users_rows() -> Result<()> {
    let (_dir, store) = open_store().await?;

    login(&store, "alice");
    store
        .financial_expenses()
        .create(&FinancialExpense::new("alice", "Rent", 1200.0, "housing", "monthly"))
        .await?;
    store
        .financial_expenses()
        .create(&FinancialExpense::new("alice", "Gym", 35.0, "health", "monthly"))
        .await?;

    login(&store, "bob");
    store
        .financial_expenses()
        .create(&FinancialExpense::new("bob", "Coffee", 4.5, "food", "daily"))
        .await?;

    assert_eq!(store.financial_expenses().get_all().await?.len(), 1);
    login(&store, "alice");
    let mine = store.financial_expenses().get_all().await?;
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|e| e.user_id == "alice"));
    Ok(())
}

#[tokio::test]
async fn cross_user_get_update_delete_are_no_ops() -> Result<()> {
    let (_dir, store) = open_store().await?;

    login(&store, "alice");
    let mut goal = Goal::new("alice", "Run a marathon");
    store.goals().create(&goal).await?;

    login(&store, "bob");
    assert!(store.goals().get_by_id(&goal.id).await?.is_none());

    goal.title = String::from("Hijacked");
    store.goals().update(&goal).await?;
    store.goals().delete(&goal.id).await?;

    login(&store, "alice");
    let kept = store.goals().get_by_id(&goal.id).await?.unwrap();
    assert_eq!(kept.title, "Run a marathon");
    Ok(())
}

#[tokio::test]
async fn unauthenticated_reads_are_empty_and_writes_fail() -> Result<()> {
    let (_dir, store) = open_store().await?;

    login(&store, "alice");
    let task = Task::new("alice", "Water plants");
    store.tasks().create(&task).await?;
    store.session().clear();

    assert!(store.tasks().get_all().await?.is_empty());
    assert!(store.tasks().get_by_id(&task.id).await?.is_none());

    let create_err = store
        .tasks()
        .create(&Task::new("alice", "Sneak in"))
        .await
        .unwrap_err();
    assert!(create_err.is_unauthenticated());
    assert!(store.tasks().update(&task).await.unwrap_err().is_unauthenticated());
    assert!(store.tasks().delete(&task.id).await.unwrap_err().is_unauthenticated());

    login(&store, "alice");
    assert_eq!(store.tasks().get_all().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn repositories_read_the_session_at_call_time() -> Result<()> {
    let (_dir, store) = open_store().await?;

    login(&store, "alice");
    let tasks = store.tasks();
    tasks.create(&Task::new("alice", "Alice's task")).await?;

    // The handle was obtained under alice but must follow the session.
    login(&store, "bob");
    assert!(tasks.get_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn independent_sessions_share_one_pool_without_bleeding() -> Result<()> {
    let (_dir, store) = open_store().await?;
    let other = store.with_session(Session::new());

    login(&store, "alice");
    login(&other, "bob");
    store.tasks().create(&Task::new("alice", "alice's list")).await?;
    other.tasks().create(&Task::new("bob", "bob's list")).await?;

    let alice_tasks = store.tasks().get_all().await?;
    let bob_tasks = other.tasks().get_all().await?;
    assert_eq!(alice_tasks.len(), 1);
    assert_eq!(alice_tasks[0].title, "alice's list");
    assert_eq!(bob_tasks.len(), 1);
    assert_eq!(bob_tasks[0].title, "bob's list");
    Ok(())
}
