use super::CommandResult;
use crate::{
    db::{Campaign, CampaignInput, ReferenceList},
    AppState,
};

pub async fn create_campaign(state: &AppState, input: CampaignInput) -> CommandResult<Campaign> {
    state
        .db
        .create_campaign(input)
        .await
        .map_err(|e| e.to_string())
}

/// A code change moves phases too, so the phase cache is rebuilt.
pub async fn modify_campaign(
    state: &AppState,
    campaign_id: i64,
    input: CampaignInput,
) -> CommandResult<Campaign> {
    let campaign = state
        .db
        .update_campaign(campaign_id, input)
        .await
        .map_err(|e| e.to_string())?;
    state.campaigns.reset().await.map_err(|e| e.to_string())?;
    Ok(campaign)
}

pub async fn remove_campaign(state: &AppState, campaign_id: i64) -> CommandResult<()> {
    state
        .db
        .delete_campaign(campaign_id)
        .await
        .map_err(|e| e.to_string())?;
    state.campaigns.reset().await.map_err(|e| e.to_string())
}

pub async fn get_campaign(state: &AppState, campaign_id: i64) -> CommandResult<Option<Campaign>> {
    state
        .db
        .find_campaign(campaign_id)
        .await
        .map_err(|e| e.to_string())
}

pub async fn list_campaigns(state: &AppState) -> CommandResult<Vec<Campaign>> {
    state.db.get_campaigns().await.map_err(|e| e.to_string())
}

pub async fn campaigns_reference_list(state: &AppState) -> CommandResult<ReferenceList> {
    state
        .catalog
        .campaigns_reference_list()
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_current_campaign(state: &AppState) -> CommandResult<Campaign> {
    state
        .campaigns
        .current_campaign()
        .await
        .map_err(|e| e.to_string())
}

/// Point the `*_current` queries at another stored campaign.
pub async fn set_current_campaign(state: &AppState, campaign_id: i64) -> CommandResult<Campaign> {
    let campaign = state
        .db
        .find_campaign(campaign_id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("Campaign {campaign_id} not found"))?;

    state
        .settings
        .set_last_campaign_id(campaign_id)
        .map_err(|e| e.to_string())?;
    Ok(campaign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        admin::test_state,
        db::test_support::{campaign_input, phase_input},
    };

    #[tokio::test]
    async fn renaming_refreshes_phase_queries() {
        let state = test_state();
        let campaign = create_campaign(&state, campaign_input("A")).await.unwrap();
        state.db.create_phase(phase_input("A", "VOTE")).await.unwrap();
        state.campaigns.reset().await.unwrap();
        assert!(state.campaigns.is_after_beginning("A", "VOTE").await.unwrap());

        modify_campaign(&state, campaign.id, campaign_input("B"))
            .await
            .unwrap();

        assert!(state.campaigns.is_after_beginning("A", "VOTE").await.is_err());
        assert!(state.campaigns.is_after_beginning("B", "VOTE").await.unwrap());
    }

    #[tokio::test]
    async fn removing_drops_cached_phases() {
        let state = test_state();
        let campaign = create_campaign(&state, campaign_input("A")).await.unwrap();
        state.db.create_phase(phase_input("A", "VOTE")).await.unwrap();
        state.campaigns.reset().await.unwrap();

        remove_campaign(&state, campaign.id).await.unwrap();

        assert!(state.campaigns.is_during("A", "VOTE").await.is_err());
        assert!(list_campaigns(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn current_campaign_must_exist() {
        let state = test_state();
        assert!(get_current_campaign(&state).await.is_err());
        assert!(set_current_campaign(&state, 5).await.is_err());

        let campaign = create_campaign(&state, campaign_input("A")).await.unwrap();
        set_current_campaign(&state, campaign.id).await.unwrap();

        assert_eq!(get_current_campaign(&state).await.unwrap(), campaign);
        assert_eq!(state.settings.last_campaign_id(), campaign.id);
    }

    #[tokio::test]
    async fn modifying_missing_campaign_reports_error() {
        let state = test_state();
        let err = modify_campaign(&state, 9, campaign_input("A"))
            .await
            .unwrap_err();
        assert!(err.contains("not found"));
    }
}
