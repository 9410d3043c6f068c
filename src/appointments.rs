use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::id::new_uuid_v7;
use crate::repo::{Entity, Repository, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_at: i64,
    pub end_at: Option<i64>,
    /// Free-form text added after the first release; rows written before the
    /// column existed decode as `None`.
    pub metadata: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Appointment {
    pub fn new(user_id: &str, title: &str, start_at: i64) -> Appointment {
        let now = now_ms();
        Appointment {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            start_at,
            end_at: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Appointment {
    const TABLE: &'static str = "appointments";
    const ORDER_BY: &'static str = "start_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "location",
        "start_at",
        "end_at",
        "metadata",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.title)
            .bind(self.description.as_deref())
            .bind(self.location.as_deref())
            .bind(self.start_at)
            .bind(self.end_at)
            .bind(self.metadata.as_deref())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<Appointment> {
        Ok(Appointment {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            description: codec::opt_text(row, "description")?,
            location: codec::opt_text(row, "location")?,
            start_at: row.try_get("start_at")?,
            end_at: codec::opt_integer(row, "end_at")?,
            metadata: codec::opt_text(row, "metadata")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Repository<Appointment> {
    /// Appointments starting in the half-open window `[start, end)`.
    pub async fn in_range(&self, start: i64, end: i64) -> AppResult<Vec<Appointment>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE user_id = ? \
             AND start_at >= ? AND start_at < ? ORDER BY start_at ASC",
        )
        .bind(&user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(Appointment::from_row).collect()
    }
}
