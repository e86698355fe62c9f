//! Fixtures shared by the store and service tests.

use chrono::{DateTime, TimeZone, Utc};

use super::models::{AreaInput, CampaignInput, FileInput, PhaseInput, ThemeInput};

/// Midnight UTC of the given day.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn campaign_input(code: &str) -> CampaignInput {
    CampaignInput {
        campaign_code: code.into(),
        title: format!("Campaign {code}"),
        description: String::new(),
        active: true,
    }
}

pub fn phase_input(campaign_code: &str, label: &str) -> PhaseInput {
    PhaseInput {
        campaign_code: campaign_code.into(),
        label: label.into(),
        order_num: 1,
        starting_date: Utc.with_ymd_and_hms(2021, 6, 16, 12, 0, 0).unwrap(),
        ending_date: Utc.with_ymd_and_hms(2021, 9, 16, 12, 0, 0).unwrap(),
        phase_type_code: None,
    }
}

pub fn theme_input(campaign_code: &str, code_theme: &str) -> ThemeInput {
    ThemeInput {
        campaign_code: campaign_code.into(),
        code_theme: code_theme.into(),
        title: code_theme.to_lowercase(),
        active: true,
        ..ThemeInput::default()
    }
}

pub fn area_input(campaign_code: &str, area_code: &str) -> AreaInput {
    AreaInput {
        area_code: area_code.into(),
        campaign_code: campaign_code.into(),
        title: area_code.to_lowercase(),
        area_type: "whole_city".into(),
        number_votes: 0,
        active: true,
    }
}

pub fn png(title: &str) -> FileInput {
    FileInput {
        title: title.into(),
        mime_type: "image/png".into(),
        data: vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
    }
}
