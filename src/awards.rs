use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::id::new_uuid_v7;
use crate::repo::{Entity, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub earned_at: i64,
    pub created_at: i64,
}

impl Award {
    pub fn new(user_id: &str, name: &str, earned_at: i64) -> Award {
        Award {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            earned_at,
            created_at: now_ms(),
        }
    }
}

impl Entity for Award {
    const TABLE: &'static str = "awards";
    const ORDER_BY: &'static str = "earned_at DESC";
    const COLUMNS: &'static [&'static str] = &["name", "earned_at", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.earned_at)
            .bind(self.created_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<Award> {
        Ok(Award {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            earned_at: row.try_get("earned_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
