use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    models::{
        validation::validate_code, Campaign, CampaignInput, ReferenceItem, ReferenceList,
    },
};

fn row_to_campaign(row: &Row) -> Result<Campaign, rusqlite::Error> {
    Ok(Campaign {
        id: row.get("id_campaign")?,
        campaign_code: row.get("campaign_code")?,
        title: row.get("title")?,
        description: row.get("description")?,
        active: row.get("active")?,
    })
}

impl Database {
    /// Create a campaign; fails if the code is already used
    pub async fn create_campaign(&self, input: CampaignInput) -> Result<Campaign> {
        validate_code("campaign_code", &input.campaign_code)?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO campaign_campaign (campaign_code, title, description, active)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    input.campaign_code,
                    input.title,
                    input.description,
                    input.active,
                ],
            )
            .with_context(|| format!("failed to insert campaign '{}'", input.campaign_code))?;

            Ok(Campaign {
                id: conn.last_insert_rowid(),
                campaign_code: input.campaign_code,
                title: input.title,
                description: input.description,
                active: input.active,
            })
        })
        .await
    }

    /// Overwrite every column of an existing campaign.
    /// Renaming the code carries the new code over to the campaign's phases, themes and areas.
    pub async fn update_campaign(&self, campaign_id: i64, input: CampaignInput) -> Result<Campaign> {
        validate_code("campaign_code", &input.campaign_code)?;

        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let previous_code: String = match tx
                .query_row(
                    "SELECT campaign_code FROM campaign_campaign WHERE id_campaign = ?1",
                    params![campaign_id],
                    |row| row.get(0),
                )
                .optional()?
            {
                Some(code) => code,
                None => bail!("Campaign {campaign_id} not found"),
            };

            tx.execute(
                "UPDATE campaign_campaign
                 SET campaign_code = ?1, title = ?2, description = ?3, active = ?4
                 WHERE id_campaign = ?5",
                params![
                    input.campaign_code,
                    input.title,
                    input.description,
                    input.active,
                    campaign_id,
                ],
            )
            .with_context(|| format!("failed to update campaign {campaign_id}"))?;

            if previous_code != input.campaign_code {
                for table in ["campaign_phase", "campaign_theme", "campaign_area"] {
                    tx.execute(
                        &format!("UPDATE {table} SET campaign_code = ?1 WHERE campaign_code = ?2"),
                        params![input.campaign_code, previous_code],
                    )?;
                }
            }

            tx.commit()
                .with_context(|| format!("failed to update campaign {campaign_id}"))?;

            Ok(Campaign {
                id: campaign_id,
                campaign_code: input.campaign_code,
                title: input.title,
                description: input.description,
                active: input.active,
            })
        })
        .await
    }

    /// Delete a campaign together with its phases, themes (and their images) and areas.
    pub async fn delete_campaign(&self, campaign_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let campaign_code: String = tx
                .query_row(
                    "SELECT campaign_code FROM campaign_campaign WHERE id_campaign = ?1",
                    params![campaign_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| anyhow!("Campaign {campaign_id} not found"))?;

            tx.execute(
                "DELETE FROM campaign_file WHERE id_file IN (
                     SELECT image_file FROM campaign_theme
                     WHERE campaign_code = ?1 AND image_file IS NOT NULL
                 )",
                params![campaign_code],
            )?;
            tx.execute(
                "DELETE FROM campaign_theme WHERE campaign_code = ?1",
                params![campaign_code],
            )?;
            tx.execute(
                "DELETE FROM campaign_phase WHERE campaign_code = ?1",
                params![campaign_code],
            )?;
            tx.execute(
                "DELETE FROM campaign_area WHERE campaign_code = ?1",
                params![campaign_code],
            )?;
            tx.execute(
                "DELETE FROM campaign_campaign WHERE id_campaign = ?1",
                params![campaign_id],
            )?;

            tx.commit()
                .with_context(|| format!("failed to delete campaign '{campaign_code}'"))?;
            Ok(())
        })
        .await
    }

    pub async fn find_campaign(&self, campaign_id: i64) -> Result<Option<Campaign>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_campaign, campaign_code, title, description, active
                 FROM campaign_campaign
                 WHERE id_campaign = ?1",
            )?;

            let result = stmt
                .query_row(params![campaign_id], row_to_campaign)
                .optional()?;

            Ok(result)
        })
        .await
    }

    pub async fn find_campaign_by_code(&self, campaign_code: &str) -> Result<Option<Campaign>> {
        let campaign_code = campaign_code.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_campaign, campaign_code, title, description, active
                 FROM campaign_campaign
                 WHERE campaign_code = ?1",
            )?;

            let result = stmt
                .query_row(params![campaign_code], row_to_campaign)
                .optional()?;

            Ok(result)
        })
        .await
    }

    pub async fn get_campaigns(&self) -> Result<Vec<Campaign>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id_campaign, campaign_code, title, description, active
                 FROM campaign_campaign
                 ORDER BY id_campaign ASC",
            )?;

            let campaigns = stmt
                .query_map([], row_to_campaign)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(campaigns)
        })
        .await
    }

    pub async fn get_campaign_ids(&self) -> Result<Vec<i64>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT id_campaign FROM campaign_campaign ORDER BY id_campaign ASC")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    /// `campaign_code -> title`, for select lists
    pub async fn get_campaigns_reference_list(&self) -> Result<ReferenceList> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT campaign_code, title FROM campaign_campaign ORDER BY id_campaign ASC",
            )?;
            let items = stmt
                .query_map([], |row| {
                    Ok(ReferenceItem::new(
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{campaign_input, phase_input};

    #[tokio::test]
    async fn campaign_crud_round() {
        let db = Database::in_memory().unwrap();

        let created = db.create_campaign(campaign_input("BP_2021")).await.unwrap();
        let stored = db.find_campaign(created.id).await.unwrap();
        assert_eq!(stored.as_ref(), Some(&created));

        let mut changed = campaign_input("BP_2022");
        changed.title = "Budget participatif 2022".into();
        changed.active = false;
        let updated = db.update_campaign(created.id, changed).await.unwrap();
        assert_eq!(
            db.find_campaign_by_code("BP_2022").await.unwrap(),
            Some(updated)
        );
        assert_eq!(db.find_campaign_by_code("BP_2021").await.unwrap(), None);

        assert_eq!(db.get_campaign_ids().await.unwrap(), vec![created.id]);

        db.delete_campaign(created.id).await.unwrap();
        assert_eq!(db.find_campaign(created.id).await.unwrap(), None);
        assert!(db.get_campaigns().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_codes_are_rejected() {
        let db = Database::in_memory().unwrap();
        db.create_campaign(campaign_input("BP_2021")).await.unwrap();

        let err = db.create_campaign(campaign_input("BP_2021")).await.unwrap_err();
        assert!(err.to_string().contains("BP_2021"));
    }

    #[tokio::test]
    async fn updating_missing_campaign_fails() {
        let db = Database::in_memory().unwrap();
        let err = db
            .update_campaign(42, campaign_input("BP_2021"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn deleting_a_campaign_removes_its_phases() {
        let db = Database::in_memory().unwrap();
        let kept = db.create_campaign(campaign_input("KEEP")).await.unwrap();
        let dropped = db.create_campaign(campaign_input("DROP")).await.unwrap();
        db.create_phase(phase_input("KEEP", "VOTE")).await.unwrap();
        db.create_phase(phase_input("DROP", "VOTE")).await.unwrap();

        db.delete_campaign(dropped.id).await.unwrap();

        let phases = db.get_phases().await.unwrap();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0].campaign_code, kept.campaign_code);
    }

    #[tokio::test]
    async fn renaming_a_campaign_moves_its_phases() {
        let db = Database::in_memory().unwrap();
        let campaign = db.create_campaign(campaign_input("BP_2021")).await.unwrap();
        db.create_phase(phase_input("BP_2021", "VOTE")).await.unwrap();

        db.update_campaign(campaign.id, campaign_input("BP_2021_BIS"))
            .await
            .unwrap();

        assert!(db.get_phases_by_campaign("BP_2021").await.unwrap().is_empty());
        assert_eq!(db.get_phases_by_campaign("BP_2021_BIS").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reference_list_maps_code_to_title() {
        let db = Database::in_memory().unwrap();
        let mut input = campaign_input("BP_2021");
        input.title = "Budget participatif 2021".into();
        db.create_campaign(input).await.unwrap();

        assert_eq!(
            db.get_campaigns_reference_list().await.unwrap(),
            vec![ReferenceItem::new("BP_2021", "Budget participatif 2021")]
        );
    }
}
