//! The catalog and the entity impls describe the same tables from two sides;
//! these tests pin them together so neither can drift alone.

use daybook::appointments::Appointment;
use daybook::awards::Award;
use daybook::finance::{FinancialExpense, FinancialIncome, FinancialNote};
use daybook::fitness::{
    BodyMetric, FitnessPlan, NormalizedMetric, NutritionProfile, WorkoutSession, WorkoutTemplate,
};
use daybook::goals::{Goal, GoalChecklistItem, GoalCompletion};
use daybook::gratitude::GratitudeEntry;
use daybook::habits::{Habit, HabitCompletion};
use daybook::profile::UserProfile;
use daybook::schema;
use daybook::tasks::Task;
use daybook::{Entity, SingletonEntity};

fn assert_entity_matches_catalog<T: Entity>() {
    let def = schema::table(T::TABLE).unwrap_or_else(|| panic!("{} not in catalog", T::TABLE));
    assert_eq!(def.primary_key, "id", "{}", T::TABLE);
    let mut expected = vec!["id", "user_id"];
    expected.extend_from_slice(T::COLUMNS);
    let actual: Vec<&str> = def.columns.iter().map(|c| c.name).collect();
    assert_eq!(actual, expected, "{}", T::TABLE);
}

fn assert_singleton_matches_catalog<T: SingletonEntity>() {
    let def = schema::table(T::TABLE).unwrap_or_else(|| panic!("{} not in catalog", T::TABLE));
    assert_eq!(def.primary_key, "user_id", "{}", T::TABLE);
    let mut expected = vec!["user_id"];
    expected.extend_from_slice(T::COLUMNS);
    let actual: Vec<&str> = def.columns.iter().map(|c| c.name).collect();
    assert_eq!(actual, expected, "{}", T::TABLE);
}

#[test]
fn every_entity_agrees_with_its_table_def() {
    assert_entity_matches_catalog::<Goal>();
    assert_entity_matches_catalog::<GoalChecklistItem>();
    assert_entity_matches_catalog::<GoalCompletion>();
    assert_entity_matches_catalog::<Task>();
    assert_entity_matches_catalog::<FinancialIncome>();
    assert_entity_matches_catalog::<FinancialExpense>();
    assert_entity_matches_catalog::<GratitudeEntry>();
    assert_entity_matches_catalog::<Appointment>();
    assert_entity_matches_catalog::<WorkoutTemplate>();
    assert_entity_matches_catalog::<WorkoutSession>();
    assert_entity_matches_catalog::<NormalizedMetric>();
    assert_entity_matches_catalog::<FitnessPlan>();
    assert_entity_matches_catalog::<Award>();
    assert_entity_matches_catalog::<Habit>();
    assert_entity_matches_catalog::<HabitCompletion>();
    assert_entity_matches_catalog::<BodyMetric>();
}

#[test]
fn every_singleton_agrees_with_its_table_def() {
    assert_singleton_matches_catalog::<UserProfile>();
    assert_singleton_matches_catalog::<FinancialNote>();
    assert_singleton_matches_catalog::<NutritionProfile>();
}

#[test]
fn every_catalog_table_has_an_entity() {
    // 16 row entities plus 3 per-user singletons.
    assert_eq!(schema::CATALOG.len(), 19);
}
