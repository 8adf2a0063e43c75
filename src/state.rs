use std::sync::Mutex;

use crate::db::CrmDb;

/// Application state managed by Tauri.
///
/// The store is an explicitly owned object living here for the lifetime of the
/// app, not a module-level singleton. The mutex serializes storage access: one
/// operation at a time, which is all a single local user ever issues.
pub struct AppState {
    pub db: Mutex<Option<CrmDb>>,
}

impl AppState {
    pub fn new() -> Self {
        let db = match CrmDb::open() {
            Ok(db) => Some(db),
            Err(e) => {
                log::error!("Failed to open CRM database: {e}. All storage commands will fail.");
                None
            }
        };

        Self { db: Mutex::new(db) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
