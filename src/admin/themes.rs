use super::CommandResult;
use crate::{
    db::{FileInput, ReferenceList, StoredFile, Theme, ThemeInput},
    AppState,
};

pub async fn create_theme(state: &AppState, input: ThemeInput) -> CommandResult<Theme> {
    state.db.create_theme(input).await.map_err(|e| e.to_string())
}

pub async fn modify_theme(
    state: &AppState,
    theme_id: i64,
    input: ThemeInput,
) -> CommandResult<Theme> {
    state
        .db
        .update_theme(theme_id, input)
        .await
        .map_err(|e| e.to_string())
}

/// Removes the theme along with its uploaded image.
pub async fn remove_theme(state: &AppState, theme_id: i64) -> CommandResult<()> {
    state
        .db
        .delete_theme(theme_id)
        .await
        .map_err(|e| e.to_string())
}

pub async fn upload_theme_image(
    state: &AppState,
    theme_id: i64,
    image: FileInput,
) -> CommandResult<Theme> {
    state
        .db
        .set_theme_image(theme_id, image)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_theme_image(state: &AppState, theme_id: i64) -> CommandResult<Option<StoredFile>> {
    let Some(theme) = get_theme(state, theme_id).await? else {
        return Ok(None);
    };
    let Some(file_id) = theme.image_file else {
        return Ok(None);
    };

    state.db.find_file(file_id).await.map_err(|e| e.to_string())
}

pub async fn get_theme(state: &AppState, theme_id: i64) -> CommandResult<Option<Theme>> {
    state.db.find_theme(theme_id).await.map_err(|e| e.to_string())
}

pub async fn list_themes(state: &AppState) -> CommandResult<Vec<Theme>> {
    state.db.get_themes().await.map_err(|e| e.to_string())
}

pub async fn list_campaign_themes(
    state: &AppState,
    campaign_code: &str,
) -> CommandResult<Vec<Theme>> {
    state
        .catalog
        .themes_by_campaign(campaign_code)
        .await
        .map_err(|e| e.to_string())
}

pub async fn themes_reference_list(state: &AppState) -> CommandResult<ReferenceList> {
    state
        .db
        .get_themes_reference_list()
        .await
        .map_err(|e| e.to_string())
}
