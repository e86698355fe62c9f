use serde::{Deserialize, Serialize};

/// Votable entity of a campaign, carrying its vote counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: i64,
    pub area_code: String,
    pub campaign_code: String,
    pub title: String,
    #[serde(rename = "type")]
    pub area_type: String,
    pub number_votes: i64,
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaInput {
    pub area_code: String,
    pub campaign_code: String,
    pub title: String,
    #[serde(rename = "type")]
    pub area_type: String,
    pub number_votes: i64,
    pub active: bool,
}
