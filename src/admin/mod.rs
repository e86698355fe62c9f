//! Back-office commands. Each takes the shared [`AppState`](crate::AppState)
//! and reports failures as display strings for the admin console.

pub mod areas;
pub mod campaigns;
pub mod phases;
pub mod themes;

/// Error type handed back to the console.
pub type CommandResult<T> = Result<T, String>;

#[cfg(test)]
pub(crate) fn test_state() -> crate::AppState {
    use std::sync::Arc;

    use crate::{
        db::Database,
        settings::{CampaignSettings, SettingsStore},
    };

    let db = Database::in_memory().unwrap();
    let settings = Arc::new(SettingsStore::in_memory(CampaignSettings::default()));
    crate::AppState::new(db, settings)
}
