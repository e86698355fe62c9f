//! Campaign query layer: the phase-time cache and the lookups built on it.

mod cache;
mod campaign_service;
mod catalog;
mod clock;
mod error;
pub mod format;

pub use cache::{Boundary, PhaseKey, PhaseTimeCache};
pub use campaign_service::CampaignService;
pub use catalog::CampaignCatalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CampaignError, CampaignResult};
