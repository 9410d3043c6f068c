use std::sync::{Arc, Mutex, MutexGuard};

use crate::{AppError, AppResult};

/// The current authenticated user for one logical client of the store.
///
/// This is an explicit handle, not a process global: clones share one cell,
/// separate `Session::new()` values are fully independent, so two identities
/// can coexist in one process (and in one test) without bleeding into each
/// other. Repositories read the cell on every call and never cache it.
#[derive(Clone, Debug, Default)]
pub struct Session {
    current: Arc<Mutex<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Replace the active user. `None` is logout. The previous identity is
    /// dropped before the new one becomes visible, so a login after logout
    /// can never observe stale scope.
    pub fn set_current_user_id(&self, user_id: Option<String>) {
        let mut cell = self.lock();
        *cell = user_id;
    }

    pub fn clear(&self) {
        self.set_current_user_id(None);
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.lock().clone()
    }

    pub(crate) fn require_user_id(&self) -> AppResult<String> {
        self.current_user_id()
            .ok_or_else(AppError::unauthenticated)
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        // A poisoned cell still holds a valid Option; keep going.
        self.current.lock().unwrap_or_else(|err| err.into_inner())
    }
}
