use anyhow::{bail, Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    models::{validation::validate_code, Area, AreaInput, ReferenceItem, ReferenceList},
};

fn row_to_area(row: &Row) -> Result<Area, rusqlite::Error> {
    Ok(Area {
        id: row.get("id_area")?,
        area_code: row.get("area_code")?,
        campaign_code: row.get("campaign_code")?,
        title: row.get("title")?,
        area_type: row.get("type")?,
        number_votes: row.get("number_votes")?,
        active: row.get("active")?,
    })
}

fn check_input(input: &AreaInput) -> Result<()> {
    validate_code("area_code", &input.area_code)?;
    validate_code("campaign_code", &input.campaign_code)?;
    if input.number_votes < 0 {
        bail!("number_votes cannot be negative");
    }
    Ok(())
}

impl Database {
    pub async fn create_area(&self, input: AreaInput) -> Result<Area> {
        check_input(&input)?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO campaign_area (area_code, campaign_code, title, type, number_votes, active)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.area_code,
                    input.campaign_code,
                    input.title,
                    input.area_type,
                    input.number_votes,
                    input.active,
                ],
            )
            .with_context(|| format!("failed to insert area '{}'", input.area_code))?;

            Ok(Area {
                id: conn.last_insert_rowid(),
                area_code: input.area_code,
                campaign_code: input.campaign_code,
                title: input.title,
                area_type: input.area_type,
                number_votes: input.number_votes,
                active: input.active,
            })
        })
        .await
    }

    pub async fn update_area(&self, area_id: i64, input: AreaInput) -> Result<Area> {
        check_input(&input)?;

        self.execute(move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE campaign_area
                     SET area_code = ?1,
                         campaign_code = ?2,
                         title = ?3,
                         type = ?4,
                         number_votes = ?5,
                         active = ?6
                     WHERE id_area = ?7",
                    params![
                        input.area_code,
                        input.campaign_code,
                        input.title,
                        input.area_type,
                        input.number_votes,
                        input.active,
                        area_id,
                    ],
                )
                .with_context(|| format!("failed to update area {area_id}"))?;

            if rows_affected == 0 {
                bail!("Area {area_id} not found");
            }

            Ok(Area {
                id: area_id,
                area_code: input.area_code,
                campaign_code: input.campaign_code,
                title: input.title,
                area_type: input.area_type,
                number_votes: input.number_votes,
                active: input.active,
            })
        })
        .await
    }

    /// Add `delta` votes in a single statement so concurrent counts are not lost.
    /// Returns the new total.
    pub async fn increment_area_votes(&self, area_id: i64, delta: i64) -> Result<i64> {
        self.execute(move |conn| {
            let total: Option<i64> = conn
                .query_row(
                    "UPDATE campaign_area
                     SET number_votes = number_votes + ?1
                     WHERE id_area = ?2 AND number_votes + ?1 >= 0
                     RETURNING number_votes",
                    params![delta, area_id],
                    |row| row.get(0),
                )
                .optional()?;

            match total {
                Some(total) => Ok(total),
                None => bail!("Area {area_id} not found or vote count would become negative"),
            }
        })
        .await
    }

    pub async fn delete_area(&self, area_id: i64) -> Result<()> {
        self.execute(move |conn| {
            conn.execute("DELETE FROM campaign_area WHERE id_area = ?1", params![area_id])?;
            Ok(())
        })
        .await
    }

    pub async fn find_area(&self, area_id: i64) -> Result<Option<Area>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_area, area_code, campaign_code, title, type, number_votes, active
                 FROM campaign_area
                 WHERE id_area = ?1",
            )?;

            let result = stmt.query_row(params![area_id], row_to_area).optional()?;
            Ok(result)
        })
        .await
    }

    pub async fn get_areas(&self) -> Result<Vec<Area>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id_area, area_code, campaign_code, title, type, number_votes, active
                 FROM campaign_area
                 ORDER BY campaign_code ASC, id_area ASC",
            )?;

            let areas = stmt
                .query_map([], row_to_area)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(areas)
        })
        .await
    }

    pub async fn get_area_ids(&self) -> Result<Vec<i64>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT id_area FROM campaign_area ORDER BY id_area ASC")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    /// `area_code -> title` for one campaign
    pub async fn get_areas_reference_list(&self, campaign_code: &str) -> Result<ReferenceList> {
        let campaign_code = campaign_code.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT area_code, title FROM campaign_area
                 WHERE campaign_code = ?1
                 ORDER BY id_area ASC",
            )?;
            let items = stmt
                .query_map(params![campaign_code], |row| {
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
    use crate::db::test_support::area_input;

    #[tokio::test]
    async fn area_crud_round() {
        let db = Database::in_memory().unwrap();

        let created = db.create_area(area_input("BP_2021", "PARIS_11")).await.unwrap();
        assert_eq!(db.find_area(created.id).await.unwrap(), Some(created.clone()));

        let mut changed = area_input("BP_2021", "PARIS_12");
        changed.area_type = "localized".into();
        changed.number_votes = 12;
        let updated = db.update_area(created.id, changed).await.unwrap();
        assert_eq!(db.find_area(created.id).await.unwrap(), Some(updated));

        assert_eq!(db.get_area_ids().await.unwrap(), vec![created.id]);
        assert_eq!(db.get_areas().await.unwrap().len(), 1);

        db.delete_area(created.id).await.unwrap();
        assert_eq!(db.find_area(created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn counts_votes_atomically() {
        let db = Database::in_memory().unwrap();
        let area = db.create_area(area_input("BP_2021", "PARIS_11")).await.unwrap();

        assert_eq!(db.increment_area_votes(area.id, 3).await.unwrap(), 3);
        assert_eq!(db.increment_area_votes(area.id, -1).await.unwrap(), 2);
        assert!(db.increment_area_votes(area.id, -5).await.is_err());
        assert!(db.increment_area_votes(area.id + 1, 1).await.is_err());

        let stored = db.find_area(area.id).await.unwrap().unwrap();
        assert_eq!(stored.number_votes, 2);
    }

    #[tokio::test]
    async fn reference_list_is_scoped_to_campaign() {
        let db = Database::in_memory().unwrap();
        let mut paris = area_input("BP_2021", "PARIS");
        paris.title = "Tout Paris".into();
        db.create_area(paris).await.unwrap();
        db.create_area(area_input("BP_2022", "PARIS_11")).await.unwrap();

        assert_eq!(
            db.get_areas_reference_list("BP_2021").await.unwrap(),
            vec![ReferenceItem::new("PARIS", "Tout Paris")]
        );
    }
}
