mod common;

use std::collections::HashMap;

use anyhow::Result;
use common::{login, open_raw_pool, open_store};
use daybook::fitness::WorkoutStatus;
use daybook::{migrate, schema, Store};
use sqlx::{Row, SqlitePool};

/// Live column name -> declared type, straight from pragma_table_info.
async fn column_types(pool: &SqlitePool, table: &str) -> Result<HashMap<String, String>> {
    let sql = format!("SELECT name, type FROM pragma_table_info('{table}')");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    let mut out = HashMap::new();
    for row in rows {
        out.insert(
            row.try_get::<String, _>("name")?,
            row.try_get::<String, _>("type")?.to_ascii_uppercase(),
        );
    }
    Ok(out)
}

#[tokio::test]
async fn fresh_database_matches_catalog_and_reruns_change_nothing() -> Result<()> {
    let (_dir, store) = open_store().await?;

    for def in schema::CATALOG {
        let live = column_types(store.pool(), def.name).await?;
        assert_eq!(live.len(), def.columns.len(), "{} column count", def.name);
        for col in def.columns {
            assert_eq!(
                live.get(col.name).map(String::as_str),
                Some(col.ty.sql()),
                "{}.{}",
                def.name,
                col.name
            );
        }
    }

    let rerun = migrate::apply_migrations(store.pool()).await?;
    assert_eq!(rerun.total_changes(), 0);
    Ok(())
}

#[tokio::test]
async fn legacy_table_gains_missing_nullable_columns_in_place() -> Result<()> {
    let (_dir, pool) = open_raw_pool().await?;
    sqlx::query(
        "CREATE TABLE appointments (\
         id TEXT NOT NULL, user_id TEXT NOT NULL, title TEXT NOT NULL, \
         start_at INTEGER NOT NULL, created_at INTEGER NOT NULL, \
         updated_at INTEGER NOT NULL, PRIMARY KEY (id))",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO appointments (id, user_id, title, start_at, created_at, updated_at) \
         VALUES ('a1', 'alice', 'Dentist', 1000, 1, 1)",
    )
    .execute(&pool)
    .await?;

    let store = Store::from_pool(pool.clone()).await?;
    login(&store, "alice");

    let kept = store.appointments().get_by_id("a1").await?.unwrap();
    assert_eq!(kept.title, "Dentist");
    assert_eq!(kept.start_at, 1000);
    assert_eq!(kept.location, None);
    assert_eq!(kept.metadata, None);

    let rerun = migrate::apply_migrations(&pool).await?;
    assert_eq!(rerun.total_changes(), 0);
    Ok(())
}

#[tokio::test]
async fn legacy_state_column_is_renamed_to_status() -> Result<()> {
    let (_dir, pool) = open_raw_pool().await?;
    sqlx::query(
        "CREATE TABLE workout_sessions (\
         id TEXT NOT NULL, user_id TEXT NOT NULL, template_id TEXT, \
         state TEXT NOT NULL DEFAULT 'started', started_at INTEGER NOT NULL, \
         completed_at INTEGER, notes TEXT, created_at INTEGER NOT NULL, \
         updated_at INTEGER NOT NULL, PRIMARY KEY (id))",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO workout_sessions \
         (id, user_id, state, started_at, created_at, updated_at) \
         VALUES ('w1', 'alice', 'completed', 500, 1, 1)",
    )
    .execute(&pool)
    .await?;

    let store = Store::from_pool(pool.clone()).await?;
    login(&store, "alice");

    let session = store.workout_sessions().get_by_id("w1").await?.unwrap();
    assert_eq!(session.status, WorkoutStatus::Completed);

    let live = column_types(&pool, "workout_sessions").await?;
    assert!(live.contains_key("status"));
    assert!(!live.contains_key("state"));

    let rerun = migrate::apply_migrations(&pool).await?;
    assert_eq!(rerun.total_changes(), 0);
    Ok(())
}

#[tokio::test]
async fn divergent_column_type_is_rebuilt_preserving_rows() -> Result<()> {
    let (_dir, pool) = open_raw_pool().await?;
    sqlx::query(
        "CREATE TABLE financial_expenses (\
         id TEXT NOT NULL, user_id TEXT NOT NULL, name TEXT NOT NULL, \
         amount TEXT NOT NULL, category TEXT NOT NULL, frequency TEXT NOT NULL, \
         created_at INTEGER NOT NULL, updated_at INTEGER NOT NULL, PRIMARY KEY (id))",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO financial_expenses VALUES \
         ('e1', 'alice', 'Rent', '1200.50', 'housing', 'monthly', 1, 1), \
         ('e2', 'alice', 'Gym', '35', 'health', 'monthly', 2, 2)",
    )
    .execute(&pool)
    .await?;

    let store = Store::from_pool(pool.clone()).await?;

    let live = column_types(&pool, "financial_expenses").await?;
    assert_eq!(live.get("amount").map(String::as_str), Some("REAL"));

    login(&store, "alice");
    let expenses = store.financial_expenses().get_all().await?;
    assert_eq!(expenses.len(), 2);
    let rent = expenses.iter().find(|e| e.name == "Rent").unwrap();
    assert!((rent.amount - 1200.5).abs() < f64::EPSILON);

    let rerun = migrate::apply_migrations(&pool).await?;
    assert_eq!(rerun.total_changes(), 0);
    Ok(())
}

#[tokio::test]
async fn stale_shadow_from_a_crashed_rebuild_is_cleared() -> Result<()> {
    let (_dir, pool) = open_raw_pool().await?;
    sqlx::query(
        "CREATE TABLE financial_expenses (\
         id TEXT NOT NULL, user_id TEXT NOT NULL, name TEXT NOT NULL, \
         amount TEXT NOT NULL, category TEXT NOT NULL, frequency TEXT NOT NULL, \
         created_at INTEGER NOT NULL, updated_at INTEGER NOT NULL, PRIMARY KEY (id))",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO financial_expenses VALUES \
         ('e1', 'alice', 'Rent', '900', 'housing', 'monthly', 1, 1)",
    )
    .execute(&pool)
    .await?;
    // A half-finished earlier rebuild left its working table behind.
    sqlx::query("CREATE TABLE financial_expenses_shadow (junk TEXT)")
        .execute(&pool)
        .await?;

    let store = Store::from_pool(pool.clone()).await?;
    login(&store, "alice");
    let expenses = store.financial_expenses().get_all().await?;
    assert_eq!(expenses.len(), 1);
    assert!((expenses[0].amount - 900.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn unrecoverable_copy_resets_the_table_instead_of_failing_startup() -> Result<()> {
    let (_dir, pool) = open_raw_pool().await?;
    // No title column: it is NOT NULL without a default, so the rebuild copy
    // cannot backfill it and the table is recreated empty.
    sqlx::query(
        "CREATE TABLE appointments (\
         id TEXT NOT NULL, user_id TEXT NOT NULL, start_at INTEGER NOT NULL, \
         created_at INTEGER NOT NULL, updated_at INTEGER NOT NULL, PRIMARY KEY (id))",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO appointments (id, user_id, start_at, created_at, updated_at) \
         VALUES ('a1', 'alice', 1000, 1, 1)",
    )
    .execute(&pool)
    .await?;

    let store = Store::from_pool(pool.clone()).await?;
    login(&store, "alice");
    assert!(store.appointments().get_all().await?.is_empty());

    let live = column_types(&pool, "appointments").await?;
    assert_eq!(live.get("title").map(String::as_str), Some("TEXT"));

    // The reset table matches the catalog, so the store is usable again.
    let rerun = migrate::apply_migrations(&pool).await?;
    assert_eq!(rerun.total_changes(), 0);
    Ok(())
}
