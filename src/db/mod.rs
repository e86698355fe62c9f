mod connection;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::Database;
pub use models::{
    Area, AreaInput, Campaign, CampaignInput, FileInput, Phase, PhaseInput, ReferenceItem,
    ReferenceList, StoredFile, Theme, ThemeInput,
};
