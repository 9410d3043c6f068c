//! Declarative table descriptors. One `TableDef` per entity generates both
//! the CREATE TABLE statement and the expected-column list the migration
//! engine diffs against, so the two can never drift apart.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    /// SQL literal, e.g. `'not_started'` or `0`.
    pub default: Option<&'static str>,
}

impl ColumnDef {
    pub const fn required(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            name,
            ty,
            nullable: false,
            default: None,
        }
    }

    pub const fn nullable(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef {
            name,
            ty,
            nullable: true,
            default: None,
        }
    }

    pub const fn with_default(name: &'static str, ty: ColumnType, default: &'static str) -> Self {
        ColumnDef {
            name,
            ty,
            nullable: false,
            default: Some(default),
        }
    }

    /// Column clause as it appears in CREATE TABLE / ADD COLUMN.
    pub fn sql(&self) -> String {
        let mut out = format!("{} {}", self.name, self.ty.sql());
        if !self.nullable {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        out
    }

    /// SQLite can add this column in place: nullable, or NOT NULL with a
    /// constant default.
    pub fn addable_in_place(&self) -> bool {
        self.nullable || self.default.is_some()
    }

    /// Literal used when back-filling rows that predate this column.
    pub fn backfill_literal(&self) -> &'static str {
        self.default.unwrap_or("NULL")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

impl OnDelete {
    pub fn sql(self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKeyDef {
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    /// "id" for row entities, "user_id" for per-user singletons.
    pub primary_key: &'static str,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKeyDef],
    /// Full `CREATE INDEX IF NOT EXISTS ...` statements, re-runnable.
    pub indexes: &'static [&'static str],
}

impl TableDef {
    pub fn create_sql(&self) -> String {
        self.create_sql_named(self.name)
    }

    /// Same shape under a different name; the rebuild path creates its
    /// shadow table with this.
    pub fn create_sql_named(&self, table: &str) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDef::sql).collect();
        parts.push(format!("PRIMARY KEY ({})", self.primary_key));
        for fk in self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({}) ON DELETE {}",
                fk.column,
                fk.parent_table,
                fk.parent_column,
                fk.on_delete.sql()
            ));
        }
        format!("CREATE TABLE {table} ({})", parts.join(", "))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

use ColumnType::{Integer, Real, Text};

/// Every entity table, parents before children.
pub const CATALOG: &[TableDef] = &[
    TableDef {
        name: "user_profiles",
        primary_key: "user_id",
        columns: &[
            ColumnDef::required("user_id", Text),
            ColumnDef::with_default("display_name", Text, "''"),
            ColumnDef::nullable("timezone", Text),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[],
    },
    TableDef {
        name: "goals",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("title", Text),
            ColumnDef::nullable("description", Text),
            ColumnDef::with_default("status", Text, "'not_started'"),
            ColumnDef::nullable("target_date", Integer),
            ColumnDef::nullable("image_uris", Text),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &["CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id, created_at)"],
    },
    TableDef {
        name: "goal_checklist_items",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("goal_id", Text),
            ColumnDef::required("label", Text),
            ColumnDef::with_default("completed", Integer, "0"),
            ColumnDef::with_default("position", Integer, "0"),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[ForeignKeyDef {
            column: "goal_id",
            parent_table: "goals",
            parent_column: "id",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_goal_checklist_goal ON goal_checklist_items(goal_id)",
        ],
    },
    TableDef {
        name: "goal_completions",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("goal_id", Text),
            ColumnDef::required("completed_on", Integer),
            ColumnDef::required("created_at", Integer),
        ],
        foreign_keys: &[ForeignKeyDef {
            column: "goal_id",
            parent_table: "goals",
            parent_column: "id",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_goal_completions_goal ON goal_completions(goal_id, completed_on)",
        ],
    },
    TableDef {
        name: "tasks",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("title", Text),
            ColumnDef::nullable("notes", Text),
            ColumnDef::nullable("due_at", Integer),
            ColumnDef::with_default("completed", Integer, "0"),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &["CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id, created_at)"],
    },
    TableDef {
        name: "financial_incomes",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("name", Text),
            ColumnDef::required("amount", Real),
            ColumnDef::required("category", Text),
            ColumnDef::required("frequency", Text),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_financial_incomes_user ON financial_incomes(user_id, created_at)",
        ],
    },
    TableDef {
        name: "financial_expenses",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("name", Text),
            ColumnDef::required("amount", Real),
            ColumnDef::required("category", Text),
            ColumnDef::required("frequency", Text),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_financial_expenses_user ON financial_expenses(user_id, created_at)",
        ],
    },
    TableDef {
        name: "financial_notes",
        primary_key: "user_id",
        columns: &[
            ColumnDef::required("user_id", Text),
            ColumnDef::with_default("body", Text, "''"),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[],
    },
    TableDef {
        name: "gratitude_entries",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("body", Text),
            ColumnDef::required("entry_date", Integer),
            ColumnDef::nullable("image_uris", Text),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_gratitude_entries_user ON gratitude_entries(user_id, entry_date)",
        ],
    },
    TableDef {
        name: "appointments",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("title", Text),
            ColumnDef::nullable("description", Text),
            ColumnDef::nullable("location", Text),
            ColumnDef::required("start_at", Integer),
            ColumnDef::nullable("end_at", Integer),
            ColumnDef::nullable("metadata", Text),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_appointments_user_start ON appointments(user_id, start_at)",
        ],
    },
    TableDef {
        name: "workout_templates",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("name", Text),
            ColumnDef::nullable("exercises", Text),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[],
    },
    TableDef {
        name: "workout_sessions",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::nullable("template_id", Text),
            ColumnDef::with_default("status", Text, "'started'"),
            ColumnDef::required("started_at", Integer),
            ColumnDef::nullable("completed_at", Integer),
            ColumnDef::nullable("notes", Text),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[ForeignKeyDef {
            column: "template_id",
            parent_table: "workout_templates",
            parent_column: "id",
            on_delete: OnDelete::SetNull,
        }],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_workout_sessions_user ON workout_sessions(user_id, started_at)",
        ],
    },
    TableDef {
        name: "normalized_metrics",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::nullable("session_id", Text),
            ColumnDef::required("metric_type", Text),
            ColumnDef::required("value", Real),
            ColumnDef::required("unit", Text),
            ColumnDef::required("recorded_at", Integer),
            ColumnDef::required("created_at", Integer),
        ],
        foreign_keys: &[ForeignKeyDef {
            column: "session_id",
            parent_table: "workout_sessions",
            parent_column: "id",
            on_delete: OnDelete::SetNull,
        }],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_normalized_metrics_user ON normalized_metrics(user_id, metric_type, recorded_at)",
        ],
    },
    TableDef {
        name: "fitness_plans",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("name", Text),
            ColumnDef::nullable("focus", Text),
            ColumnDef::with_default("weeks", Integer, "4"),
            ColumnDef::with_default("active", Integer, "0"),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[],
    },
    TableDef {
        name: "awards",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("name", Text),
            ColumnDef::required("earned_at", Integer),
            ColumnDef::required("created_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &["CREATE INDEX IF NOT EXISTS idx_awards_user ON awards(user_id, earned_at)"],
    },
    TableDef {
        name: "habits",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("name", Text),
            ColumnDef::with_default("cadence", Text, "'daily'"),
            ColumnDef::required("created_at", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[],
    },
    TableDef {
        name: "habit_completions",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("habit_id", Text),
            ColumnDef::required("completed_on", Integer),
            ColumnDef::required("created_at", Integer),
        ],
        foreign_keys: &[ForeignKeyDef {
            column: "habit_id",
            parent_table: "habits",
            parent_column: "id",
            on_delete: OnDelete::Cascade,
        }],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_habit_completions_habit ON habit_completions(habit_id, completed_on)",
        ],
    },
    TableDef {
        name: "body_metrics",
        primary_key: "id",
        columns: &[
            ColumnDef::required("id", Text),
            ColumnDef::required("user_id", Text),
            ColumnDef::required("metric", Text),
            ColumnDef::required("value", Real),
            ColumnDef::required("unit", Text),
            ColumnDef::required("recorded_at", Integer),
            ColumnDef::required("created_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[
            "CREATE INDEX IF NOT EXISTS idx_body_metrics_user ON body_metrics(user_id, metric, recorded_at)",
        ],
    },
    TableDef {
        name: "nutrition_profiles",
        primary_key: "user_id",
        columns: &[
            ColumnDef::required("user_id", Text),
            ColumnDef::with_default("daily_calories", Integer, "2000"),
            ColumnDef::nullable("protein_g", Integer),
            ColumnDef::nullable("carbs_g", Integer),
            ColumnDef::nullable("fat_g", Integer),
            ColumnDef::required("updated_at", Integer),
        ],
        foreign_keys: &[],
        indexes: &[],
    },
];

pub fn table(name: &str) -> Option<&'static TableDef> {
    CATALOG.iter().find(|t| t.name == name)
}

/// Child tables whose rows die with their parent, as declared in the catalog.
/// The repository layer drives its explicit cascade transaction from this.
pub fn cascade_children<'a>(
    parent: &'a str,
) -> impl Iterator<Item = (&'static TableDef, &'static ForeignKeyDef)> + 'a {
    CATALOG.iter().flat_map(move |t| {
        t.foreign_keys
            .iter()
            .filter(move |fk| fk.parent_table == parent && fk.on_delete == OnDelete::Cascade)
            .map(move |fk| (t, fk))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_unique() {
        for (i, def) in CATALOG.iter().enumerate() {
            assert!(
                CATALOG.iter().skip(i + 1).all(|other| other.name != def.name),
                "duplicate table {}",
                def.name
            );
        }
    }

    #[test]
    fn every_table_carries_an_owner_column() {
        for def in CATALOG {
            assert!(
                def.column("user_id").is_some(),
                "{} lacks user_id",
                def.name
            );
        }
    }

    #[test]
    fn foreign_keys_point_at_catalog_tables() {
        for def in CATALOG {
            for fk in def.foreign_keys {
                let parent = table(fk.parent_table)
                    .unwrap_or_else(|| panic!("{} references unknown {}", def.name, fk.parent_table));
                assert!(parent.column(fk.parent_column).is_some());
                assert!(def.column(fk.column).is_some());
            }
        }
    }

    #[test]
    fn create_sql_contains_constraints() {
        let goals = table("goal_checklist_items").unwrap();
        let sql = goals.create_sql();
        assert!(sql.starts_with("CREATE TABLE goal_checklist_items ("));
        assert!(sql.contains("PRIMARY KEY (id)"));
        assert!(sql.contains("FOREIGN KEY (goal_id) REFERENCES goals(id) ON DELETE CASCADE"));
        assert!(sql.contains("completed INTEGER NOT NULL DEFAULT 0"));
    }

    #[test]
    fn shadow_create_sql_renames_only_the_table() {
        let def = table("tasks").unwrap();
        let shadow = def.create_sql_named("tasks_shadow");
        assert!(shadow.starts_with("CREATE TABLE tasks_shadow ("));
        assert_eq!(
            shadow.replace("tasks_shadow", "tasks"),
            def.create_sql()
        );
    }

    #[test]
    fn cascade_children_of_goals() {
        let children: Vec<&str> = cascade_children("goals").map(|(t, _)| t.name).collect();
        assert_eq!(children, vec!["goal_checklist_items", "goal_completions"]);
        // SET NULL relations are not cascade children.
        assert_eq!(cascade_children("workout_templates").count(), 0);
    }

    #[test]
    fn addable_in_place_rules() {
        let appointments = table("appointments").unwrap();
        assert!(appointments.column("metadata").unwrap().addable_in_place());
        assert!(!appointments.column("title").unwrap().addable_in_place());
        assert_eq!(appointments.column("metadata").unwrap().backfill_literal(), "NULL");
    }
}
