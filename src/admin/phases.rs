use serde::Deserialize;

use super::CommandResult;
use crate::{
    db::{helpers::parse_form_datetime, Phase, PhaseInput, ReferenceList},
    AppState,
};

/// Phase as submitted by the back-office form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseForm {
    pub campaign_code: String,
    pub label: String,
    #[serde(default)]
    pub order_num: i64,
    /// `2021-06-16T12:00`, read as UTC
    pub starting_date: String,
    pub ending_date: String,
    #[serde(default)]
    pub phase_type_code: Option<String>,
}

impl PhaseForm {
    fn into_input(self) -> anyhow::Result<PhaseInput> {
        Ok(PhaseInput {
            starting_date: parse_form_datetime(&self.starting_date, "starting_date")?,
            ending_date: parse_form_datetime(&self.ending_date, "ending_date")?,
            campaign_code: self.campaign_code,
            label: self.label,
            order_num: self.order_num,
            phase_type_code: self.phase_type_code,
        })
    }
}

pub async fn create_phase(state: &AppState, form: PhaseForm) -> CommandResult<Phase> {
    let input = form.into_input().map_err(|e| e.to_string())?;
    let phase = state
        .db
        .create_phase(input)
        .await
        .map_err(|e| e.to_string())?;
    state.campaigns.reset().await.map_err(|e| e.to_string())?;
    Ok(phase)
}

pub async fn modify_phase(state: &AppState, phase_id: i64, form: PhaseForm) -> CommandResult<Phase> {
    let input = form.into_input().map_err(|e| e.to_string())?;
    let phase = state
        .db
        .update_phase(phase_id, input)
        .await
        .map_err(|e| e.to_string())?;
    state.campaigns.reset().await.map_err(|e| e.to_string())?;
    Ok(phase)
}

pub async fn remove_phase(state: &AppState, phase_id: i64) -> CommandResult<()> {
    state
        .db
        .delete_phase(phase_id)
        .await
        .map_err(|e| e.to_string())?;
    state.campaigns.reset().await.map_err(|e| e.to_string())
}

pub async fn get_phase(state: &AppState, phase_id: i64) -> CommandResult<Option<Phase>> {
    state.db.find_phase(phase_id).await.map_err(|e| e.to_string())
}

pub async fn list_phases(state: &AppState) -> CommandResult<Vec<Phase>> {
    state.db.get_phases().await.map_err(|e| e.to_string())
}

pub async fn list_campaign_phases(
    state: &AppState,
    campaign_code: &str,
) -> CommandResult<Vec<Phase>> {
    state
        .db
        .get_phases_by_campaign(campaign_code)
        .await
        .map_err(|e| e.to_string())
}

pub async fn phases_reference_list(state: &AppState) -> CommandResult<ReferenceList> {
    state
        .db
        .get_phases_reference_list()
        .await
        .map_err(|e| e.to_string())
}

pub async fn phase_types_reference_list(state: &AppState) -> CommandResult<ReferenceList> {
    state
        .catalog
        .phase_types_reference_list()
        .await
        .map_err(|e| e.to_string())
}
