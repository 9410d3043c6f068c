use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::codec;
use crate::id::new_uuid_v7;
use crate::repo::{Entity, Repository, SingletonEntity, SqliteQuery};
use crate::time::now_ms;
use crate::AppResult;

/// Terminal once `Completed` by convention only; the repository does not
/// validate transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    Started,
    Completed,
    Abandoned,
}

impl WorkoutStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutStatus::Started => "started",
            WorkoutStatus::Completed => "completed",
            WorkoutStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(value: &str) -> WorkoutStatus {
        match value {
            "completed" => WorkoutStatus::Completed,
            "abandoned" => WorkoutStatus::Abandoned,
            _ => WorkoutStatus::Started,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub exercises: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WorkoutTemplate {
    pub fn new(user_id: &str, name: &str, exercises: Vec<String>) -> WorkoutTemplate {
        let now = now_ms();
        WorkoutTemplate {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            exercises,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for WorkoutTemplate {
    const TABLE: &'static str = "workout_templates";
    const ORDER_BY: &'static str = "created_at DESC";
    const COLUMNS: &'static [&'static str] = &["name", "exercises", "created_at", "updated_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(codec::encode_string_list(&self.exercises))
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<WorkoutTemplate> {
        Ok(WorkoutTemplate {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            exercises: codec::string_list_column(row, "exercises")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub user_id: String,
    pub template_id: Option<String>,
    pub status: WorkoutStatus,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl WorkoutSession {
    pub fn start(user_id: &str, template_id: Option<String>) -> WorkoutSession {
        let now = now_ms();
        WorkoutSession {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            template_id,
            status: WorkoutStatus::Started,
            started_at: now,
            completed_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for WorkoutSession {
    const TABLE: &'static str = "workout_sessions";
    const ORDER_BY: &'static str = "started_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "template_id",
        "status",
        "started_at",
        "completed_at",
        "notes",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.template_id.as_deref())
            .bind(self.status.as_str())
            .bind(self.started_at)
            .bind(self.completed_at)
            .bind(self.notes.as_deref())
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<WorkoutSession> {
        Ok(WorkoutSession {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            template_id: codec::opt_text(row, "template_id")?,
            status: WorkoutStatus::parse(&codec::text_or_empty(row, "status")?),
            started_at: row.try_get("started_at")?,
            completed_at: codec::opt_integer(row, "completed_at")?,
            notes: codec::opt_text(row, "notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// One reading from a health source, normalized to a flat (type, value,
/// unit, instant) shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetric {
    pub id: String,
    pub user_id: String,
    pub session_id: Option<String>,
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    pub recorded_at: i64,
    pub created_at: i64,
}

impl NormalizedMetric {
    pub fn new(
        user_id: &str,
        metric_type: &str,
        value: f64,
        unit: &str,
        recorded_at: i64,
    ) -> NormalizedMetric {
        NormalizedMetric {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            session_id: None,
            metric_type: metric_type.to_string(),
            value,
            unit: unit.to_string(),
            recorded_at,
            created_at: now_ms(),
        }
    }
}

impl Entity for NormalizedMetric {
    const TABLE: &'static str = "normalized_metrics";
    const ORDER_BY: &'static str = "recorded_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "session_id",
        "metric_type",
        "value",
        "unit",
        "recorded_at",
        "created_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.session_id.as_deref())
            .bind(&self.metric_type)
            .bind(self.value)
            .bind(&self.unit)
            .bind(self.recorded_at)
            .bind(self.created_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<NormalizedMetric> {
        Ok(NormalizedMetric {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            session_id: codec::opt_text(row, "session_id")?,
            metric_type: row.try_get("metric_type")?,
            value: row.try_get("value")?,
            unit: row.try_get("unit")?,
            recorded_at: row.try_get("recorded_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessPlan {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub focus: Option<String>,
    pub weeks: i64,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl FitnessPlan {
    pub fn new(user_id: &str, name: &str, weeks: i64) -> FitnessPlan {
        let now = now_ms();
        FitnessPlan {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            focus: None,
            weeks,
            active: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for FitnessPlan {
    const TABLE: &'static str = "fitness_plans";
    const ORDER_BY: &'static str = "created_at DESC";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "focus",
        "weeks",
        "active",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.name)
            .bind(self.focus.as_deref())
            .bind(self.weeks)
            .bind(codec::encode_bool(self.active))
            .bind(self.created_at)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<FitnessPlan> {
        Ok(FitnessPlan {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            focus: codec::opt_text(row, "focus")?,
            weeks: codec::integer_or(row, "weeks", 4)?,
            active: codec::bool_column(row, "active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMetric {
    pub id: String,
    pub user_id: String,
    pub metric: String,
    pub value: f64,
    pub unit: String,
    pub recorded_at: i64,
    pub created_at: i64,
}

impl BodyMetric {
    pub fn new(user_id: &str, metric: &str, value: f64, unit: &str, recorded_at: i64) -> BodyMetric {
        BodyMetric {
            id: new_uuid_v7(),
            user_id: user_id.to_string(),
            metric: metric.to_string(),
            value,
            unit: unit.to_string(),
            recorded_at,
            created_at: now_ms(),
        }
    }
}

impl Entity for BodyMetric {
    const TABLE: &'static str = "body_metrics";
    const ORDER_BY: &'static str = "recorded_at DESC";
    const COLUMNS: &'static [&'static str] =
        &["metric", "value", "unit", "recorded_at", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(&self.metric)
            .bind(self.value)
            .bind(&self.unit)
            .bind(self.recorded_at)
            .bind(self.created_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<BodyMetric> {
        Ok(BodyMetric {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            metric: row.try_get("metric")?,
            value: row.try_get("value")?,
            unit: row.try_get("unit")?,
            recorded_at: row.try_get("recorded_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Per-user daily targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    pub user_id: String,
    pub daily_calories: i64,
    pub protein_g: Option<i64>,
    pub carbs_g: Option<i64>,
    pub fat_g: Option<i64>,
    pub updated_at: i64,
}

impl NutritionProfile {
    pub fn new(user_id: &str, daily_calories: i64) -> NutritionProfile {
        NutritionProfile {
            user_id: user_id.to_string(),
            daily_calories,
            protein_g: None,
            carbs_g: None,
            fat_g: None,
            updated_at: now_ms(),
        }
    }
}

impl SingletonEntity for NutritionProfile {
    const TABLE: &'static str = "nutrition_profiles";
    const COLUMNS: &'static [&'static str] =
        &["daily_calories", "protein_g", "carbs_g", "fat_g", "updated_at"];

    fn bind<'q>(&'q self, query: SqliteQuery<'q>) -> SqliteQuery<'q> {
        query
            .bind(self.daily_calories)
            .bind(self.protein_g)
            .bind(self.carbs_g)
            .bind(self.fat_g)
            .bind(self.updated_at)
    }

    fn from_row(row: &SqliteRow) -> AppResult<NutritionProfile> {
        Ok(NutritionProfile {
            user_id: row.try_get("user_id")?,
            daily_calories: codec::integer_or(row, "daily_calories", 2000)?,
            protein_g: codec::opt_integer(row, "protein_g")?,
            carbs_g: codec::opt_integer(row, "carbs_g")?,
            fat_g: codec::opt_integer(row, "fat_g")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Repository<NormalizedMetric> {
    /// Readings of one metric type in the half-open window `[start, end)`.
    pub async fn metrics_in_range(
        &self,
        metric_type: &str,
        start: i64,
        end: i64,
    ) -> AppResult<Vec<NormalizedMetric>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM normalized_metrics WHERE user_id = ? AND metric_type = ? \
             AND recorded_at >= ? AND recorded_at < ? ORDER BY recorded_at ASC",
        )
        .bind(&user_id)
        .bind(metric_type)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(NormalizedMetric::from_row).collect()
    }
}

impl Repository<BodyMetric> {
    /// Readings of one metric in the half-open window `[start, end)`.
    pub async fn metric_in_range(
        &self,
        metric: &str,
        start: i64,
        end: i64,
    ) -> AppResult<Vec<BodyMetric>> {
        let Some(user_id) = self.session().current_user_id() else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            "SELECT * FROM body_metrics WHERE user_id = ? AND metric = ? \
             AND recorded_at >= ? AND recorded_at < ? ORDER BY recorded_at ASC",
        )
        .bind(&user_id)
        .bind(metric)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(BodyMetric::from_row).collect()
    }
}
