use serde::{Deserialize, Serialize};

/// Topical category of submissions within a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: i64,
    pub campaign_code: String,
    pub code_theme: String,
    pub title: String,
    pub description: String,
    pub active: bool,
    pub front_rgb: Option<String>, // "#RRGGBB" or "#RRGGBBAA"
    /// Owned image; only changed through `set_theme_image` and `delete_theme`.
    pub image_file: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeInput {
    pub campaign_code: String,
    pub code_theme: String,
    pub title: String,
    pub description: String,
    pub active: bool,
    pub front_rgb: Option<String>,
}
