//! Typed per-entity repositories. Repositories are the only way application
//! code touches storage: every read is filtered by the session's current
//! user and every write is stamped with it, regardless of what the caller
//! put on the record.

use std::marker::PhantomData;

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Sqlite, SqlitePool};
use tracing::warn;

use crate::schema;
use crate::session::Session;
use crate::AppResult;

pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// One storable record type. `COLUMNS` excludes `id` and `user_id`; those
/// are bound by the repository itself so the session, not the caller,
/// decides ownership.
pub trait Entity: Send + Sync + Sized + 'static {
    const TABLE: &'static str;
    /// ORDER BY clause applied to `get_all`.
    const ORDER_BY: &'static str;
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> &str;
    /// Bind `COLUMNS` in declaration order.
    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
    fn from_row(row: &SqliteRow) -> AppResult<Self>;
}

pub struct Repository<T> {
    pool: SqlitePool,
    session: Session,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            pool: self.pool.clone(),
            session: self.session.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: SqlitePool, session: Session) -> Self {
        Repository {
            pool,
            session,
            _entity: PhantomData,
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// All rows owned by the current user, in the entity's natural order.
    /// No session reads as no data, never as someone else's data.
    pub async fn get_all(&self) -> AppResult<Vec<T>> {
        let Some(user_id) = self.session.current_user_id() else {
            return Ok(Vec::new());
        };
        let sql = format!(
            "SELECT * FROM {} WHERE user_id = ? ORDER BY {}",
            T::TABLE,
            T::ORDER_BY
        );
        let rows = sqlx::query(&sql).bind(&user_id).fetch_all(&self.pool).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// `None` for absent rows and for rows owned by a different user.
    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<T>> {
        let Some(user_id) = self.session.current_user_id() else {
            return Ok(None);
        };
        let sql = format!("SELECT * FROM {} WHERE user_id = ? AND id = ?", T::TABLE);
        let row = sqlx::query(&sql)
            .bind(&user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Insert the record under the session's user. The record's own
    /// `user_id` is deliberately ignored.
    pub async fn create(&self, record: &T) -> AppResult<()> {
        let user_id = self.session.require_user_id()?;
        let placeholders = vec!["?"; T::COLUMNS.len() + 2].join(", ");
        let sql = format!(
            "INSERT INTO {} (id, user_id, {}) VALUES ({placeholders})",
            T::TABLE,
            T::COLUMNS.join(", ")
        );
        let query = sqlx::query(&sql).bind(record.id().to_string()).bind(user_id);
        record.bind(query).execute(&self.pool).await?;
        Ok(())
    }

    /// Whole-record replace, scoped by owner. A miss (absent or
    /// foreign-owned row) is a silent no-op.
    pub async fn update(&self, record: &T) -> AppResult<()> {
        let user_id = self.session.require_user_id()?;
        let assignments = T::COLUMNS
            .iter()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE user_id = ? AND id = ?",
            T::TABLE
        );
        let query = record.bind(sqlx::query(&sql));
        let result = query
            .bind(user_id)
            .bind(record.id().to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            warn!(
                target = "daybook",
                event = "repo_update_missed",
                table = T::TABLE,
                id = %record.id()
            );
        }
        Ok(())
    }

    /// Delete the row and, in the same transaction, every row of the
    /// cascade children the catalog declares for this table. Idempotent:
    /// deleting an absent or foreign-owned id is a no-op.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let user_id = self.session.require_user_id()?;
        let mut tx = self.pool.begin().await?;
        for (child, fk) in schema::cascade_children(T::TABLE) {
            let sql = format!(
                "DELETE FROM {} WHERE user_id = ? AND {} = ?",
                child.name, fk.column
            );
            sqlx::query(&sql)
                .bind(&user_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        let sql = format!("DELETE FROM {} WHERE user_id = ? AND id = ?", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(&user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        if result.rows_affected() == 0 {
            warn!(
                target = "daybook",
                event = "repo_delete_missed",
                table = T::TABLE,
                id = %id
            );
        }
        Ok(())
    }
}

/// One row per user (financial note, profiles). `create`/`update` collapse
/// to an upsert keyed on `user_id`.
pub trait SingletonEntity: Send + Sync + Sized + 'static {
    const TABLE: &'static str;
    /// Columns excluding `user_id`.
    const COLUMNS: &'static [&'static str];

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
    fn from_row(row: &SqliteRow) -> AppResult<Self>;
}

pub struct SingletonRepository<T> {
    pool: SqlitePool,
    session: Session,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for SingletonRepository<T> {
    fn clone(&self) -> Self {
        SingletonRepository {
            pool: self.pool.clone(),
            session: self.session.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: SingletonEntity> SingletonRepository<T> {
    pub fn new(pool: SqlitePool, session: Session) -> Self {
        SingletonRepository {
            pool,
            session,
            _entity: PhantomData,
        }
    }

    pub async fn get(&self) -> AppResult<Option<T>> {
        let Some(user_id) = self.session.current_user_id() else {
            return Ok(None);
        };
        let sql = format!("SELECT * FROM {} WHERE user_id = ?", T::TABLE);
        let row = sqlx::query(&sql)
            .bind(&user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Upsert the user's single row.
    pub async fn set(&self, record: &T) -> AppResult<()> {
        let user_id = self.session.require_user_id()?;
        let placeholders = vec!["?"; T::COLUMNS.len() + 1].join(", ");
        let assignments = T::COLUMNS
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} (user_id, {}) VALUES ({placeholders}) \
             ON CONFLICT(user_id) DO UPDATE SET {assignments}",
            T::TABLE,
            T::COLUMNS.join(", ")
        );
        record
            .bind(sqlx::query(&sql).bind(user_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove the user's row if present; a miss is a no-op.
    pub async fn delete(&self) -> AppResult<()> {
        let user_id = self.session.require_user_id()?;
        let sql = format!("DELETE FROM {} WHERE user_id = ?", T::TABLE);
        sqlx::query(&sql).bind(user_id).execute(&self.pool).await?;
        Ok(())
    }
}
