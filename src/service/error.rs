use super::cache::Boundary;

/// Failures of the phase query API.
#[derive(Debug, thiserror::Error)]
pub enum CampaignError {
    /// The cache holds no such `(campaign, phase, boundary)` entry.
    #[error("no datetime for campaign '{campaign}', phase '{phase}' and boundary '{boundary}'")]
    NoSuchPhase {
        campaign: String,
        phase: String,
        boundary: Boundary,
    },
    /// The configured current campaign id matches no stored campaign.
    #[error("current campaign id {id} does not match any stored campaign")]
    CurrentCampaign { id: i64 },
    #[error("unknown date locale '{0}'")]
    UnknownLocale(String),
    #[error("campaign store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type CampaignResult<T> = Result<T, CampaignError>;
