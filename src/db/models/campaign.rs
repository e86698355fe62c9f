//! Campaign records.

use serde::{Deserialize, Serialize};

/// A participation exercise, identified by its unique code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub campaign_code: String,
    pub title: String,
    pub description: String,
    pub active: bool,
}

/// Input data for creating or updating a campaign
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInput {
    pub campaign_code: String,
    pub title: String,
    pub description: String,
    pub active: bool,
}
