//! Tauri command surface.
//!
//! One command per store operation. Commands are synchronous; Tauri runs
//! them off the main thread and the webview awaits the result, so each call
//! suspends the calling UI flow until the store responds. Every command goes
//! through the `AppState` mutex: one storage operation at a time. Errors are
//! stringified at this boundary; the frontend logs them and leaves its state
//! unchanged.

use std::sync::Arc;

use tauri::State;

use crate::db::{
    CompanyPatch, ContactPatch, DbCompany, DbContact, DbNote, NewCompany, NewContact, NewNote,
};
use crate::state::AppState;

// =============================================================================
// Contacts
// =============================================================================

/// Create a contact. Returns the inserted row.
#[tauri::command]
pub fn create_contact(
    mut data: NewContact,
    state: State<Arc<AppState>>,
) -> Result<DbContact, String> {
    if let Some(ref email) = data.email {
        data.email = Some(crate::util::validate_email(email)?);
    }

    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.create_contact(data).map_err(|e| e.to_string())
}

/// Get all contacts, most recently created first.
#[tauri::command]
pub fn get_contacts(state: State<Arc<AppState>>) -> Result<Vec<DbContact>, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.get_contacts().map_err(|e| e.to_string())
}

/// Get a single contact, or `None` if the id is unknown.
#[tauri::command]
pub fn get_contact(id: i64, state: State<Arc<AppState>>) -> Result<Option<DbContact>, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.get_contact(id).map_err(|e| e.to_string())
}

/// Partially update a contact. Absent fields keep their prior values.
#[tauri::command]
pub fn update_contact(
    id: i64,
    mut patch: ContactPatch,
    state: State<Arc<AppState>>,
) -> Result<DbContact, String> {
    if let Some(Some(ref email)) = patch.email {
        patch.email = Some(Some(crate::util::validate_email(email)?));
    }

    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.update_contact(id, patch).map_err(|e| e.to_string())
}

/// Delete a contact and all notes attached to it.
#[tauri::command]
pub fn delete_contact(id: i64, state: State<Arc<AppState>>) -> Result<(), String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.delete_contact(id).map_err(|e| e.to_string())
}

// =============================================================================
// Companies
// =============================================================================

/// Create a company. Returns the inserted row.
#[tauri::command]
pub fn create_company(data: NewCompany, state: State<Arc<AppState>>) -> Result<DbCompany, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.create_company(data).map_err(|e| e.to_string())
}

/// Get all companies, most recently created first.
#[tauri::command]
pub fn get_companies(state: State<Arc<AppState>>) -> Result<Vec<DbCompany>, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.get_companies().map_err(|e| e.to_string())
}

/// Get a single company, or `None` if the id is unknown.
#[tauri::command]
pub fn get_company(id: i64, state: State<Arc<AppState>>) -> Result<Option<DbCompany>, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.get_company(id).map_err(|e| e.to_string())
}

/// Partially update a company.
#[tauri::command]
pub fn update_company(
    id: i64,
    patch: CompanyPatch,
    state: State<Arc<AppState>>,
) -> Result<DbCompany, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.update_company(id, patch).map_err(|e| e.to_string())
}

/// Delete a company. Its notes are deleted; contacts that referenced it are
/// detached, not deleted.
#[tauri::command]
pub fn delete_company(id: i64, state: State<Arc<AppState>>) -> Result<(), String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.delete_company(id).map_err(|e| e.to_string())
}

// =============================================================================
// Notes
// =============================================================================

/// Create a note attached to a contact or a company.
#[tauri::command]
pub fn create_note(data: NewNote, state: State<Arc<AppState>>) -> Result<DbNote, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.create_note(data).map_err(|e| e.to_string())
}

/// Get the notes attached to a contact, most recent first.
#[tauri::command]
pub fn get_notes_by_contact(
    contact_id: i64,
    state: State<Arc<AppState>>,
) -> Result<Vec<DbNote>, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.get_notes_by_contact(contact_id).map_err(|e| e.to_string())
}

/// Get the notes attached to a company, most recent first.
#[tauri::command]
pub fn get_notes_by_company(
    company_id: i64,
    state: State<Arc<AppState>>,
) -> Result<Vec<DbNote>, String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.get_notes_by_company(company_id).map_err(|e| e.to_string())
}

/// Delete a single note.
#[tauri::command]
pub fn delete_note(id: i64, state: State<Arc<AppState>>) -> Result<(), String> {
    let db_guard = state.db.lock().map_err(|_| "Lock poisoned")?;
    let db = db_guard.as_ref().ok_or("Database not initialized")?;
    db.delete_note(id).map_err(|e| e.to_string())
}
