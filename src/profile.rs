use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::repo::{SingletonEntity, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

/// One profile row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    pub timezone: Option<String>,
    pub updated_at: i64,
}

impl UserProfile {
    pub fn new(user_id: &str, display_name: &str) -> UserProfile {
        UserProfile {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            timezone: None,
            updated_at: now_ms(),
        }
    }
}

impl SingletonEntity for UserProfile {
    const TABLE: &'static str = "user_profiles";
    const COLUMNS: &'static [&'static str] = &["display_name", "timezone", "updated_at"];

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.display_name)
            .bind(self.timezone.as_deref())
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<UserProfile> {
        Ok(UserProfile {
            user_id: row.try_get("user_id")?,
            display_name: codec::text_or_empty(row, "display_name")?,
            timezone: codec::opt_text(row, "timezone")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
