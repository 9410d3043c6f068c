use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::id::new_uuid_v7;
use crate::repo::{Entity, Repository, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

/// Freely re-toggleable; the repository accepts any legal value and does not
/// police transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::NotStarted => "not_started",
            GoalStatus::InProgress => "in_progress",
            GoalStatus::Completed => "completed",
        }
    }

    /// Lenient: unknown text reads as the default rather than failing the row.
    pub fn parse(value: &str) -> GoalStatus {
        match value {
            "in_progress" => GoalStatus::InProgress,
            "completed" => GoalStatus::Completed,
            _ => GoalStatus::NotStarted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: GoalStatus,
    pub target_date: Option<i64>,
    pub image_uris: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Goal {
    pub fn new(user_id: &str, title: &str) -> Goal {
        let now = now_ms();
        Goal {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            description: None,
            status: GoalStatus::NotStarted,
            target_date: None,
            image_uris: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Goal {
    const TABLE: &'static str = "goals";
    const ORDER_BY: &'static str = "created_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "title",
        "description",
        "status",
        "target_date",
        "image_uris",
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
            .bind(self.status.as_str())
            .bind(self.target_date)
            .bind(codec::encode_string_list(&self.image_uris))
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<Goal> {
        Ok(Goal {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            description: codec::opt_text(row, "description")?,
            status: GoalStatus::parse(&codec::text_or_empty(row, "status")?),
            target_date: codec::opt_integer(row, "target_date")?,
            image_uris: codec::string_list_column(row, "image_uris")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalChecklistItem {
    pub id: String,
    pub user_id: String,
    pub goal_id: String,
    pub label: String,
    pub completed: bool,
    pub position: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl GoalChecklistItem {
    pub fn new(user_id: &str, goal_id: &str, label: &str, position: i64) -> GoalChecklistItem {
        let now = now_ms();
        GoalChecklistItem {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            goal_id: goal_id.to_string(),
            label: label.to_string(),
            completed: false,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for GoalChecklistItem {
    const TABLE: &'static str = "goal_checklist_items";
    const ORDER_BY: &'static str = "position ASC, created_at ASC";
    const COLUMNS: &'static [&'static str] = &[
        "goal_id",
        "label",
        "completed",
        "position",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.goal_id)
            .bind(&self.label)
            .bind(codec::encode_bool(self.completed))
            .bind(self.position)
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<GoalChecklistItem> {
        Ok(GoalChecklistItem {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            goal_id: row.try_get("goal_id")?,
            label: row.try_get("label")?,
            completed: codec::bool_column(row, "completed")?,
            position: codec::integer_or(row, "position", 0)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCompletion {
    pub id: String,
    pub user_id: String,
    pub goal_id: String,
    pub completed_on: i64,
    pub created_at: i64,
}

impl GoalCompletion {
    pub fn new(user_id: &str, goal_id: &str, completed_on: i64) -> GoalCompletion {
        GoalCompletion {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            goal_id: goal_id.to_string(),
            completed_on,
            created_at: now_ms(),
        }
    }
}

impl Entity for GoalCompletion {
    const TABLE: &'static str = "goal_completions";
    const ORDER_BY: &'static str = "completed_on DESC";
    const COLUMNS: &'static [&'static str] = &["goal_id", "completed_on", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.goal_id)
            .bind(self.completed_on)
            .bind(self.created_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<GoalCompletion> {
        Ok(GoalCompletion {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            goal_id: row.try_get("goal_id")?,
            completed_on: row.try_get("completed_on")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl Repository<GoalChecklistItem> {
    pub async fn get_by_goal_id(&self, goal_id: &str) -> AppResult<Vec<GoalChecklistItem>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM goal_checklist_items WHERE user_id = ? AND goal_id = ? \
             ORDER BY position ASC, created_at ASC",
        )
        .bind(&user_id)
        .bind(goal_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(GoalChecklistItem::from_row).collect()
    }
}

impl Repository<GoalCompletion> {
    pub async fn get_by_goal_id(&self, goal_id: &str) -> AppResult<Vec<GoalCompletion>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM goal_completions WHERE user_id = ? AND goal_id = ? \
             ORDER BY completed_on DESC",
        )
        .bind(&user_id)
        .bind(goal_id)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(GoalCompletion::from_row).collect()
    }

    /// Completions in the half-open window `[start, end)`.
    pub async fn completions_in_range(
        &self,
        start: i64,
        end: i64,
    ) -> AppResult<Vec<GoalCompletion>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM goal_completions WHERE user_id = ? \
             AND completed_on >= ? AND completed_on < ? ORDER BY completed_on DESC",
        )
        .bind(&user_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(GoalCompletion::from_row).collect()
    }
}
