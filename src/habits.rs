use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::id::new_uuid_v7;
use crate::repo::{Entity, Repository, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Free text, e.g. "daily" or "weekly"; the tracker UI interprets it.
    pub cadence: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Habit {
    pub fn new(user_id: &str, name: &str, cadence: &str) -> Habit {
        let now = now_ms();
        Habit {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            cadence: cadence.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Habit {
    const TABLE: &'static str = "habits";
    const ORDER_BY: &'static str = "created_at DESC";
    const COLUMNS: &'static [&'static str] = &["name", "cadence", "created_at", "updated_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.cadence)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<Habit> {
        Ok(Habit {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            cadence: codec::text_or_empty(row, "cadence")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: String,
    pub user_id: String,
    pub habit_id: String,
    pub completed_on: i64,
    pub created_at: i64,
}

impl HabitCompletion {
    pub fn new(user_id: &str, habit_id: &str, completed_on: i64) -> HabitCompletion {
        HabitCompletion {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            habit_id: habit_id.to_string(),
            completed_on,
            created_at: now_ms(),
        }
    }
}

impl Entity for HabitCompletion {
    const TABLE: &'static str = "habit_completions";
    const ORDER_BY: &'static str = "completed_on DESC";
    const COLUMNS: &'static [&'static str] = &["habit_id", "completed_on", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.habit_id)
            .bind(self.completed_on)
            .bind(self.created_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<HabitCompletion> {
        Ok(HabitCompletion {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            habit_id: row.try_get("habit_id")?,
            completed_on: row.try_get("completed_on")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl Repository<HabitCompletion> {
    pub async fn get_by_habit_id(&self, habit_id: &str) -> AppResult<Vec<HabitCompletion>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM habit_completions WHERE user_id = ? AND habit_id = ? \
             ORDER BY completed_on DESC",
        )
        .bind(&user_id)
        .bind(habit_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(HabitCompletion::from_row).collect()
    }

    /// Completions for one habit in the half-open window `[start, end)`.
    pub async fn completions_in_range(
        &self,
        habit_id: &str,
        start: i64,
        end: i64,
    ) -> AppResult<Vec<HabitCompletion>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM habit_completions WHERE user_id = ? AND habit_id = ? \
             AND completed_on >= ? AND completed_on < ? ORDER BY completed_on DESC",
        )
        .bind(&user_id)
        .bind(habit_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(HabitCompletion::from_row).collect()
    }
}
