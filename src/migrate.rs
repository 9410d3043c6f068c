//! Startup schema migration. There is no stored version counter: the live
//! table set is probed with `sqlite_master` / `pragma_table_info` and diffed
//! against the catalog, which tolerates devices that skipped app versions or
//! crashed partway through an earlier upgrade. Every step short-circuits when
//! its work is already done, so the whole procedure re-runs on every launch.

use std::collections::HashMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::{Connection, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, MIGRATE_COPY_INCOMPLETE, MIGRATE_STEP_FAILED};
use crate::schema::{self, ColumnDef, TableDef};

#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: &'static str,
    /// Structural changes the step made; 0 means it found nothing to do.
    pub changes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub steps: Vec<StepReport>,
}

impl MigrationReport {
    pub fn total_changes(&self) -> usize {
        self.steps.iter().map(|s| s.changes).sum()
    }
}

struct MigrationStep {
    name: &'static str,
    run: for<'a> fn(&'a SqlitePool) -> BoxFuture<'a, AppResult<usize>>,
}

/// Fixed, ordered, individually idempotent. The rename runs before the
/// additive pass so a legacy `state` column is renamed rather than shadowed
/// by a freshly added `status`.
static MIGRATION_STEPS: &[MigrationStep] = &[
    MigrationStep {
        name: "create_missing_tables",
        run: create_missing_tables,
    },
    MigrationStep {
        name: "rename_workout_session_state",
        run: rename_workout_session_state,
    },
    MigrationStep {
        name: "add_missing_columns",
        run: add_missing_columns,
    },
    MigrationStep {
        name: "rebuild_divergent_tables",
        run: rebuild_divergent_tables,
    },
];

/// Bring the on-disk schema forward to match the catalog. Runs before any
/// repository is handed out.
pub async fn apply_migrations(pool: &SqlitePool) -> AppResult<MigrationReport> {
    let mut report = MigrationReport::default();
    for step in MIGRATION_STEPS {
        let changes = (step.run)(pool).await.map_err(|err| {
            error!(
                target = "daybook",
                event = "migration_step_failed",
                step = %step.name,
                error = %err
            );
            AppError::new(
                MIGRATE_STEP_FAILED,
                format!("Migration step {} failed", step.name),
            )
            .with_cause(err)
        })?;
        info!(
            target = "daybook",
            event = "migration_step",
            step = %step.name,
            changes
        );
        report.steps.push(StepReport {
            name: step.name,
            changes,
        });
    }
    Ok(report)
}

async fn table_exists(pool: &SqlitePool, table: &str) -> AppResult<bool> {
    let row: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

/// Live column name -> declared type (uppercased), from pragma_table_info.
async fn live_columns<'e, E>(executor: E, table: &str) -> AppResult<HashMap<String, String>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT name, type FROM pragma_table_info('{table}')");
    let rows = sqlx::query(&sql).fetch_all(executor).await?;
    let mut columns = HashMap::new();
    for row in rows {
        let name: String = row.try_get("name")?;
        let ty: String = row.try_get("type")?;
        columns.insert(name, ty.to_ascii_uppercase());
    }
    Ok(columns)
}

/// Fresh-install path: tables absent from the live schema are created
/// straight from the catalog. Declared indexes are re-asserted every run
/// (`IF NOT EXISTS`).
fn create_missing_tables(pool: &SqlitePool) -> BoxFuture<'_, AppResult<usize>> {
    async move {
        let mut changes = 0;
        for def in schema::CATALOG {
            if !table_exists(pool, def.name).await? {
                info!(
                    target = "daybook",
                    event = "migration_create_table",
                    table = %def.name
                );
                sqlx::query(&def.create_sql()).execute(pool).await?;
                changes += 1;
            }
            for index_sql in def.indexes {
                sqlx::query(index_sql).execute(pool).await?;
            }
        }
        Ok(changes)
    }
    .boxed()
}

/// Legacy devices carry `workout_sessions.state`; the column is now named
/// `status`. Renamed in place; if the rename primitive fails (old SQLite),
/// fall back to rebuild-and-copy with the value mapping preserved.
fn rename_workout_session_state(pool: &SqlitePool) -> BoxFuture<'_, AppResult<usize>> {
    async move {
        if !table_exists(pool, "workout_sessions").await? {
            return Ok(0);
        }
        let live = live_columns(pool, "workout_sessions").await?;
        if !live.contains_key("state") || live.contains_key("status") {
            return Ok(0);
        }
        info!(
            target = "daybook",
            event = "migration_rename_column",
            table = "workout_sessions",
            from = "state",
            to = "status"
        );
        match sqlx::query("ALTER TABLE workout_sessions RENAME COLUMN state TO status")
            .execute(pool)
            .await
        {
            Ok(_) => Ok(1),
            Err(err) => {
                warn!(
                    target = "daybook",
                    event = "migration_rename_failed",
                    table = "workout_sessions",
                    error = %err
                );
                let def = require_table("workout_sessions")?;
                rebuild_table(pool, def, &[("status", "state")]).await?;
                Ok(1)
            }
        }
    }
    .boxed()
}

/// Additive path: columns the catalog expects but the live table lacks are
/// added in place when SQLite allows it. A missing column that cannot be
/// added in place forces a rebuild of that table.
fn add_missing_columns(pool: &SqlitePool) -> BoxFuture<'_, AppResult<usize>> {
    async move {
        let mut changes = 0;
        for def in schema::CATALOG {
            if !table_exists(pool, def.name).await? {
                continue;
            }
            let live = live_columns(pool, def.name).await?;
            let missing: Vec<&ColumnDef> = def
                .columns
                .iter()
                .filter(|col| !live.contains_key(col.name))
                .collect();
            if missing.is_empty() {
                continue;
            }
            if missing.iter().all(|col| col.addable_in_place()) {
                for col in missing {
                    info!(
                        target = "daybook",
                        event = "migration_add_column",
                        table = %def.name,
                        column = %col.name
                    );
                    let sql = format!("ALTER TABLE {} ADD COLUMN {}", def.name, col.sql());
                    sqlx::query(&sql).execute(pool).await?;
                    changes += 1;
                }
            } else {
                rebuild_table(pool, def, &[]).await?;
                changes += 1;
            }
        }
        Ok(changes)
    }
    .boxed()
}

/// A live column whose declared type no longer matches the catalog (e.g.
/// amounts stored as TEXT by an early release) cannot be retyped in place;
/// the table is rebuilt and SQLite's column affinity coerces the values on
/// copy.
fn rebuild_divergent_tables(pool: &SqlitePool) -> BoxFuture<'_, AppResult<usize>> {
    async move {
        let mut changes = 0;
        for def in schema::CATALOG {
            if !table_exists(pool, def.name).await? {
                continue;
            }
            let live = live_columns(pool, def.name).await?;
            let divergent = def.columns.iter().find(|col| {
                live.get(col.name)
                    .map(|ty| ty != col.ty.sql())
                    .unwrap_or(false)
            });
            if let Some(col) = divergent {
                info!(
                    target = "daybook",
                    event = "migration_type_divergence",
                    table = %def.name,
                    column = %col.name
                );
                rebuild_table(pool, def, &[]).await?;
                changes += 1;
            }
        }
        Ok(changes)
    }
    .boxed()
}

fn require_table(name: &'static str) -> AppResult<&'static TableDef> {
    schema::table(name).ok_or_else(|| {
        AppError::new(
            "MIGRATE/UNKNOWN_TABLE",
            format!("No catalog entry for table {name}"),
        )
    })
}

/// Rebuild-and-copy: shadow table in the target shape, row copy with
/// per-column backfill, then a transactional swap whose commit is the single
/// atomic point — the old table is dropped only after the shadow has been
/// promoted. `renames` maps target column -> legacy source column.
///
/// If the copy fails or loses rows, the table is recreated empty instead:
/// one table losing history on a corrupt device is recoverable, a table
/// missing an expected column breaks every later query.
async fn rebuild_table(
    pool: &SqlitePool,
    def: &TableDef,
    renames: &[(&str, &str)],
) -> AppResult<()> {
    info!(target = "daybook", event = "migration_rebuild_begin", table = %def.name);
    let mut conn = pool.acquire().await?;
    // The swap renames a table other tables may reference.
    sqlx::query("PRAGMA foreign_keys=OFF;")
        .execute(&mut *conn)
        .await?;
    let result = rebuild_on_conn(&mut conn, def, renames).await;
    if let Err(err) = sqlx::query("PRAGMA foreign_keys=ON;")
        .execute(&mut *conn)
        .await
    {
        warn!(
            target = "daybook",
            event = "migration_fk_reenable_failed",
            table = %def.name,
            error = %err
        );
    }
    result
}

async fn rebuild_on_conn(
    conn: &mut SqliteConnection,
    def: &TableDef,
    renames: &[(&str, &str)],
) -> AppResult<()> {
    let table = def.name;
    let shadow = format!("{table}_shadow");
    let retired = format!("{table}_retired");

    // Leftovers from a crash mid-rebuild.
    sqlx::query(&format!("DROP TABLE IF EXISTS {shadow}"))
        .execute(&mut *conn)
        .await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {retired}"))
        .execute(&mut *conn)
        .await?;
    sqlx::query(&def.create_sql_named(&shadow))
        .execute(&mut *conn)
        .await?;

    let live = live_columns(&mut *conn, table).await?;
    let mut targets: Vec<&str> = Vec::new();
    let mut sources: Vec<String> = Vec::new();
    for col in def.columns {
        targets.push(col.name);
        let source = renames
            .iter()
            .find(|(to, _)| *to == col.name)
            .map(|(_, from)| (*from).to_string())
            .or_else(|| live.contains_key(col.name).then(|| col.name.to_string()))
            .unwrap_or_else(|| col.backfill_literal().to_string());
        sources.push(source);
    }
    let copy_sql = format!(
        "INSERT INTO {shadow} ({}) SELECT {} FROM {table}",
        targets.join(", "),
        sources.join(", ")
    );

    match copy_rows(&mut *conn, table, &shadow, &copy_sql).await {
        Ok(rows) => {
            let mut tx = conn.begin().await?;
            sqlx::query(&format!("ALTER TABLE {table} RENAME TO {retired}"))
                .execute(&mut *tx)
                .await?;
            sqlx::query(&format!("ALTER TABLE {shadow} RENAME TO {table}"))
                .execute(&mut *tx)
                .await?;
            sqlx::query(&format!("DROP TABLE {retired}"))
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            for index_sql in def.indexes {
                sqlx::query(index_sql).execute(&mut *conn).await?;
            }
            info!(
                target = "daybook",
                event = "migration_rebuild_done",
                table = %table,
                rows
            );
            Ok(())
        }
        Err(err) => {
            let dropped: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&mut *conn)
                .await
                .unwrap_or(0);
            error!(
                target = "daybook",
                event = "migration_rebuild_copy_failed",
                table = %table,
                rows_dropped = dropped,
                error = %err
            );
            sqlx::query(&format!("DROP TABLE IF EXISTS {shadow}"))
                .execute(&mut *conn)
                .await?;
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&mut *conn)
                .await?;
            sqlx::query(&def.create_sql()).execute(&mut *conn).await?;
            for index_sql in def.indexes {
                sqlx::query(index_sql).execute(&mut *conn).await?;
            }
            warn!(
                target = "daybook",
                event = "migration_table_reset",
                table = %table,
                rows_dropped = dropped
            );
            Ok(())
        }
    }
}

/// Runs the copy and proves the shadow complete before the swap is allowed.
async fn copy_rows(
    conn: &mut SqliteConnection,
    table: &str,
    shadow: &str,
    copy_sql: &str,
) -> AppResult<i64> {
    sqlx::query(copy_sql).execute(&mut *conn).await?;
    let old_rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&mut *conn)
        .await?;
    let new_rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {shadow}"))
        .fetch_one(&mut *conn)
        .await?;
    if old_rows != new_rows {
        return Err(AppError::new(
            MIGRATE_COPY_INCOMPLETE,
            format!("Copied {new_rows} of {old_rows} rows"),
        )
        .with_context("table", table.to_string()));
    }
    Ok(new_rows)
}
