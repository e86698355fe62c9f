//! Phase records: labeled time windows inside a campaign.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: i64,
    pub campaign_code: String,
    pub label: String,
    /// Display order only; nothing relies on it being unique.
    pub order_num: i64,
    pub starting_date: DateTime<Utc>,
    pub ending_date: DateTime<Utc>,
    pub phase_type_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInput {
    pub campaign_code: String,
    pub label: String,
    pub order_num: i64,
    pub starting_date: DateTime<Utc>,
    pub ending_date: DateTime<Utc>,
    pub phase_type_code: Option<String>,
}
