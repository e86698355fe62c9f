use std::collections::BTreeMap;

use super::error::CampaignResult;
use crate::db::{Database, Phase, ReferenceList, Theme};

/// Read-side lookups used by pages that list or pick campaign data.
#[derive(Clone)]
pub struct CampaignCatalog {
    db: Database,
}

impl CampaignCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn find_phase_by_campaign_and_phase_type(
        &self,
        campaign_code: &str,
        phase_type_code: &str,
    ) -> CampaignResult<Option<Phase>> {
        Ok(self
            .db
            .find_phase_by_campaign_and_type(campaign_code, phase_type_code)
            .await?)
    }

    pub async fn themes_by_campaign(&self, campaign_code: &str) -> CampaignResult<Vec<Theme>> {
        Ok(self.db.get_themes_by_campaign(campaign_code).await?)
    }

    /// Themes grouped under their campaign code.
    pub async fn themes_map_by_campaign(&self) -> CampaignResult<BTreeMap<String, Vec<Theme>>> {
        Ok(self.db.get_themes_map_by_campaign().await?)
    }

    pub async fn find_theme_by_code(&self, code_theme: &str) -> CampaignResult<Option<Theme>> {
        Ok(self.db.find_theme_by_code(code_theme).await?)
    }

    pub async fn areas_reference_list(&self, campaign_code: &str) -> CampaignResult<ReferenceList> {
        Ok(self.db.get_areas_reference_list(campaign_code).await?)
    }

    pub async fn campaigns_reference_list(&self) -> CampaignResult<ReferenceList> {
        Ok(self.db.get_campaigns_reference_list().await?)
    }

    pub async fn phase_types_reference_list(&self) -> CampaignResult<ReferenceList> {
        Ok(self.db.get_phase_types_reference_list().await?)
    }
}
