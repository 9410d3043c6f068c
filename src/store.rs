use std::path::Path;

use sqlx::SqlitePool;

use crate::appointments::Appointment;
use crate::awards::Award;
use crate::db;
use crate::finance::{FinancialExpense, FinancialIncome, FinancialNote};
use crate::fitness::{
    BodyMetric, FitnessPlan, NormalizedMetric, NutritionProfile, WorkoutSession, WorkoutTemplate,
};
use crate::goals::{Goal, GoalChecklistItem, GoalCompletion};
use crate::gratitude::GratitudeEntry;
use crate::habits::{Habit, HabitCompletion};
use crate::migrate;
use crate::profile::UserProfile;
use crate::repo::{Entity, Repository, SingletonEntity, SingletonRepository};
use crate::session::Session;
use crate::tasks::Task;
use crate::AppResult;

/// Process-wide handle to the local store: one pool, opened once and kept
/// open, migrated before any repository is handed out.
pub struct Store {
    pool: SqlitePool,
    session: Session,
}

impl Store {
    pub async fn open(db_path: &Path) -> AppResult<Store> {
        let pool = db::open_sqlite_pool(db_path).await?;
        Store::from_pool(pool).await
    }

    /// Reuse an already opened pool (tests, embedders that manage the file).
    pub async fn from_pool(pool: SqlitePool) -> AppResult<Store> {
        migrate::apply_migrations(&pool).await?;
        Ok(Store {
            pool,
            session: Session::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Same pool under an independent session, so two identities can coexist
    /// in one process without sharing scope.
    pub fn with_session(&self, session: Session) -> Store {
        Store {
            pool: self.pool.clone(),
            session,
        }
    }

    fn repo<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.pool.clone(), self.session.clone())
    }

    fn singleton<T: SingletonEntity>(&self) -> SingletonRepository<T> {
        SingletonRepository::new(self.pool.clone(), self.session.clone())
    }

    pub fn goals(&self) -> Repository<Goal> {
        self.repo()
    }

    pub fn goal_checklist_items(&self) -> Repository<GoalChecklistItem> {
        self.repo()
    }

    pub fn goal_completions(&self) -> Repository<GoalCompletion> {
        self.repo()
    }

    pub fn tasks(&self) -> Repository<Task> {
        self.repo()
    }

    pub fn financial_incomes(&self) -> Repository<FinancialIncome> {
        self.repo()
    }

    pub fn financial_expenses(&self) -> Repository<FinancialExpense> {
        self.repo()
    }

    pub fn financial_note(&self) -> SingletonRepository<FinancialNote> {
        self.singleton()
    }

    pub fn gratitude_entries(&self) -> Repository<GratitudeEntry> {
        self.repo()
    }

    pub fn appointments(&self) -> Repository<Appointment> {
        self.repo()
    }

    pub fn workout_templates(&self) -> Repository<WorkoutTemplate> {
        self.repo()
    }

    pub fn workout_sessions(&self) -> Repository<WorkoutSession> {
        self.repo()
    }

    pub fn normalized_metrics(&self) -> Repository<NormalizedMetric> {
        self.repo()
    }

    pub fn fitness_plans(&self) -> Repository<FitnessPlan> {
        self.repo()
    }

    pub fn body_metrics(&self) -> Repository<BodyMetric> {
        self.repo()
    }

    pub fn nutrition_profile(&self) -> SingletonRepository<NutritionProfile> {
        self.singleton()
    }

    pub fn awards(&self) -> Repository<Award> {
        self.repo()
    }

    pub fn habits(&self) -> Repository<Habit> {
        self.repo()
    }

    pub fn habit_completions(&self) -> Repository<HabitCompletion> {
        self.repo()
    }

    pub fn user_profile(&self) -> SingletonRepository<UserProfile> {
        self.singleton()
    }
}
