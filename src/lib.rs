mod utils;

pub mod admin;
pub mod db;
pub mod service;
pub mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use db::Database;
use log::{info, warn};
use service::{CampaignCatalog, CampaignError, CampaignService};
use settings::SettingsStore;

const DATA_DIR_ENV: &str = "CAMPAIGN_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "./data";

/// Everything the admin commands and front pages share.
pub struct AppState {
    pub db: Database,
    pub settings: Arc<SettingsStore>,
    pub campaigns: Arc<CampaignService>,
    pub catalog: CampaignCatalog,
}

impl AppState {
    pub fn new(db: Database, settings: Arc<SettingsStore>) -> Self {
        let campaigns = Arc::new(CampaignService::new(db.clone(), Arc::clone(&settings)));
        Self::with_service(db, settings, campaigns)
    }

    pub fn with_service(
        db: Database,
        settings: Arc<SettingsStore>,
        campaigns: Arc<CampaignService>,
    ) -> Self {
        Self {
            catalog: CampaignCatalog::new(db.clone()),
            db,
            settings,
            campaigns,
        }
    }

    /// Open `campaign.sqlite3` and `settings.json` under `data_dir`.
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let database = Database::new(data_dir.join("campaign.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        Ok(Self::new(database, Arc::new(settings)))
    }
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Campaign store starting up...");

    let data_dir = std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(async move {
        let state = AppState::open(data_dir)?;
        state.campaigns.reset().await?;
        log_overview(&state).await
    })
}

/// Logs where the current campaign stands in each of its phases.
async fn log_overview(state: &AppState) -> Result<()> {
    let settings = state.settings.current();

    let campaign = match state.campaigns.current_campaign().await {
        Ok(campaign) => campaign,
        Err(err @ CampaignError::CurrentCampaign { .. }) => {
            let count = state.db.get_campaign_ids().await?.len();
            warn!("{err}; {count} campaign(s) stored");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    info!("Current campaign: {} ({})", campaign.campaign_code, campaign.title);

    for phase in state.db.get_phases_by_campaign(&campaign.campaign_code).await? {
        let code = &campaign.campaign_code;
        let start = state
            .campaigns
            .start_str(code, &phase.label, &settings.date_locale, settings.with_accents)
            .await?;
        let end = state
            .campaigns
            .end_str(code, &phase.label, &settings.date_locale, settings.with_accents)
            .await?;
        let status = if state.campaigns.is_during(code, &phase.label).await? {
            "open"
        } else if state.campaigns.is_before_beginning(code, &phase.label).await? {
            "upcoming"
        } else {
            "closed"
        };

        info!("  {} [{start} -> {end}]: {status}", phase.label);
    }

    Ok(())
}
