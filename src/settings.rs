use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::log_warn;

const ENABLE_LOGS: bool = true;

/// Plugin properties read from `settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignSettings {
    /// Id of the campaign the `*_current` queries refer to; -1 when unset.
    pub last_campaign_id: i64,
    pub date_locale: String,
    pub with_accents: bool,
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            last_campaign_id: -1,
            date_locale: "fr_FR".into(),
            with_accents: true,
        }
    }
}

pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<CampaignSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            read_settings(&path)?
        } else {
            CampaignSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Settings that live only in memory; `update` never touches disk.
    pub fn in_memory(settings: CampaignSettings) -> Self {
        Self {
            path: None,
            data: RwLock::new(settings),
        }
    }

    pub fn current(&self) -> CampaignSettings {
        self.read().clone()
    }

    pub fn last_campaign_id(&self) -> i64 {
        self.read().last_campaign_id
    }

    pub fn update(&self, settings: CampaignSettings) -> Result<()> {
        let mut guard = self.write();
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn set_last_campaign_id(&self, campaign_id: i64) -> Result<()> {
        let mut guard = self.write();
        let mut next = guard.clone();
        next.last_campaign_id = campaign_id;
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = read_settings(path)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &CampaignSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, CampaignSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, CampaignSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Malformed files fall back to defaults rather than refusing to start.
fn read_settings(path: &Path) -> Result<CampaignSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
        log_warn!(
            "Ignoring malformed settings in {}: {err}; using defaults",
            path.display()
        );
        CampaignSettings::default()
    }))
}
