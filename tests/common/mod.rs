#![allow(dead_code)]

use anyhow::Result;
use daybook::{db, Store};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Fresh store in a throwaway directory, fully migrated, nobody logged in.
pub async fn open_store() -> Result<(TempDir, Store)> {
    daybook::logging::init();
    let dir = tempfile::tempdir()?;
    let store = Store::open(&dir.path().join("daybook.sqlite3")).await?;
    Ok((dir, store))
}

/// Bare pool with no migrations applied, for tests that stage a legacy
/// schema before handing the file to `Store::from_pool`.
pub async fn open_raw_pool() -> Result<(TempDir, SqlitePool)> {
    daybook::logging::init();
    let dir = tempfile::tempdir()?;
    let pool = db::open_sqlite_pool(&dir.path().join("daybook.sqlite3")).await?;
    Ok((dir, pool))
}

pub fn login(store: &Store, user: &str) {
    store.session().set_current_user_id(Some(user.to_string()));
}
