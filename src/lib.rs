mod commands;
pub mod db;
mod migrations;
pub mod state;
mod util;

use std::sync::Arc;

use state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            use tauri::Manager;

            // Opens (or creates) the database and applies pending migrations.
            // On failure the state carries no db and every command errors out,
            // which the frontend shows as a blocked loading state.
            let state = Arc::new(AppState::new());
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Contacts
            commands::create_contact,
            commands::get_contacts,
            commands::get_contact,
            commands::update_contact,
            commands::delete_contact,
            // Companies
            commands::create_company,
            commands::get_companies,
            commands::get_company,
            commands::update_company,
            commands::delete_company,
            // Notes
            commands::create_note,
            commands::get_notes_by_contact,
            commands::get_notes_by_company,
            commands::delete_note,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
