mod common;

use anyhow::Result;
use common::{login, open_store};
use daybook::finance::FinancialNote;
use daybook::fitness::NutritionProfile;
use daybook::profile::UserProfile;

#[tokio::test]
async fn set_is_an_upsert_keeping_one_row_per_user() -> Result<()> {
    let (_dir, store) = open_store().await?;
    login(&store, "alice");

    store
        .financial_note()
        .set(&FinancialNote::new("alice", "save for a bike"))
        .await?;
    store
        .financial_note()
        .set(&FinancialNote::new("alice", "bike bought, now a tent"))
        .await?;

    let note = store.financial_note().get().await?.unwrap();
    assert_eq!(note.body, "bike bought, now a tent");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM financial_notes")
        .fetch_one(store.pool())
        .await?;
    assert_eq!(rows, 1);
    Ok(())
}

#[tokio::test]
async fn singleton_rows_are_per_user() -> Result<()> {
    let (_dir, store) = open_store().await?;

    login(&store, "alice");
    store
        .nutrition_profile()
        .set(&NutritionProfile::new("alice", 2200))
        .await?;

    login(&store, "bob");
    assert!(store.nutrition_profile().get().await?.is_none());
    store
        .nutrition_profile()
        .set(&NutritionProfile::new("bob", 2600))
        .await?;

    login(&store, "alice");
    assert_eq!(store.nutrition_profile().get().await?.unwrap().daily_calories, 2200);
    Ok(())
}

#[tokio::test]
async fn delete_clears_the_row_and_misses_are_no_ops() -> Result<()> {
    let (_dir, store) = open_store().await?;
    login(&store, "alice");

    // Deleting before anything was set is fine.
    store.user_profile().delete().await?;

    let mut profile = UserProfile::new("alice", "Alice");
    profile.timezone = Some(String::from("Europe/Dublin"));
    store.user_profile().set(&profile).await?;
    assert_eq!(store.user_profile().get().await?.unwrap(), profile);

    store.user_profile().delete().await?;
    assert!(store.user_profile().get().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn unauthenticated_singleton_access() -> Result<()> {
    let (_dir, store) = open_store().await?;

    assert!(store.financial_note().get().await?.is_none());
    let err = store
        .financial_note()
        .set(&FinancialNote::new("alice", "nope"))
        .await
        .unwrap_err();
    assert!(err.is_unauthenticated());
    assert!(store.financial_note().delete().await.unwrap_err().is_unauthenticated());
    Ok(())
}
