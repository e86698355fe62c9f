use super::CommandResult;
use crate::{
    db::{Area, AreaInput, ReferenceList},
    AppState,
};

pub async fn create_area(state: &AppState, input: AreaInput) -> CommandResult<Area> {
    state.db.create_area(input).await.map_err(|e| e.to_string())
}

pub async fn modify_area(state: &AppState, area_id: i64, input: AreaInput) -> CommandResult<Area> {
    state
        .db
        .update_area(area_id, input)
        .await
        .map_err(|e| e.to_string())
}

pub async fn remove_area(state: &AppState, area_id: i64) -> CommandResult<()> {
    state.db.delete_area(area_id).await.map_err(|e| e.to_string())
}

pub async fn get_area(state: &AppState, area_id: i64) -> CommandResult<Option<Area>> {
    state.db.find_area(area_id).await.map_err(|e| e.to_string())
}

pub async fn list_areas(state: &AppState) -> CommandResult<Vec<Area>> {
    state.db.get_areas().await.map_err(|e| e.to_string())
}

/// Returns the new vote total.
pub async fn add_area_votes(state: &AppState, area_id: i64, delta: i64) -> CommandResult<i64> {
    state
        .db
        .increment_area_votes(area_id, delta)
        .await
        .map_err(|e| e.to_string())
}

pub async fn areas_reference_list(
    state: &AppState,
    campaign_code: &str,
) -> CommandResult<ReferenceList> {
    state
        .catalog
        .areas_reference_list(campaign_code)
        .await
        .map_err(|e| e.to_string())
}
