use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::id::new_uuid_v7;
use crate::repo::{Entity, Repository, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub notes: Option<String>,
    pub due_at: Option<i64>,
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn new(user_id: &str, title: &str) -> Task {
        let now = now_ms();
        Task {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            notes: None,
            due_at: None,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Task {
    const TABLE: &'static str = "tasks";
    const ORDER_BY: &'static str = "created_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "notes",
        "due_at",
        "completed",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.title)
            .bind(self.notes.as_deref())
            .bind(self.due_at)
            .bind(codec::encode_bool(self.completed))
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<Task> {
        Ok(Task {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            notes: codec::opt_text(row, "notes")?,
            due_at: codec::opt_integer(row, "due_at")?,
            completed: codec::bool_column(row, "completed")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Repository<Task> {
    /// Tasks due in the half-open window `[start, end)`. Tasks without a due
    /// date never appear here.
    pub async fn due_in_range(&self, start: i64, end: i64) -> AppResult<Vec<Task>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM tasks WHERE user_id = ? AND due_at >= ? AND due_at < ? \
             ORDER BY due_at ASC",
        )
        .bind(&user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(Task::from_row).collect()
    }
}
