//! Embedded local data store for the Daybook life tracker.
//!
//! A single SQLite file holds every entity (goals, tasks, finances,
//! gratitude entries, appointments, workouts, habits, ...). On startup the
//! migration engine diffs the live schema against the declarative catalog
//! and brings it forward; repositories are the only storage surface the
//! rest of the application is permitted to call, and every one of them is
//! scoped to the session's current user.

pub mod appointments;
pub mod awards;
pub mod codec;
pub mod db;
pub mod error;
pub mod finance;
pub mod fitness;
pub mod goals;
pub mod gratitude;
pub mod habits;
pub mod id;
pub mod logging;
pub mod migrate;
pub mod profile;
pub mod repo;
pub mod schema;
pub mod session;
pub mod store;
pub mod tasks;
pub mod time;

pub use error::{AppError, AppResult};
pub use repo::{Entity, Repository, SingletonEntity, SingletonRepository};
pub use session::Session;
pub use store::Store;
