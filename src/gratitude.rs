use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::id::new_uuid_v7;
use crate::repo::{Entity, Repository, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GratitudeEntry {
    pub id: String,
    pub user_id: String,
    pub body: String,
    /// Day the entry is about, not the moment it was written.
    pub entry_date: i64,
    pub image_uris: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl GratitudeEntry {
    pub fn new(user_id: &str, body: &str, entry_date: i64) -> GratitudeEntry {
        let now = now_ms();
        GratitudeEntry {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            body: body.to_string(),
            entry_date,
            image_uris: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for GratitudeEntry {
    const TABLE: &'static str = "gratitude_entries";
    const ORDER_BY: &'static str = "entry_date DESC";
    const COLUMNS: &'static [&'static str] = &[
        "body",
        "entry_date",
        "image_uris",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.body)
            .bind(self.entry_date)
            .bind(codec::encode_string_list(&self.image_uris))
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<GratitudeEntry> {
        Ok(GratitudeEntry {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            body: row.try_get("body")?,
            entry_date: row.try_get("entry_date")?,
            image_uris: codec::string_list_column(row, "image_uris")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Repository<GratitudeEntry> {
    /// Entries whose `entry_date` falls in the half-open window `[start, end)`.
    pub async fn entries_in_range(&self, start: i64, end: i64) -> AppResult<Vec<GratitudeEntry>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM gratitude_entries WHERE user_id = ? \
             AND entry_date >= ? AND entry_date < ? ORDER BY entry_date DESC",
        )
        .bind(&user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(GratitudeEntry::from_row).collect()
    }
}
