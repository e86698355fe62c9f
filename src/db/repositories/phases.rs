use anyhow::{bail, Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{get_datetime, non_blank},
    models::{
        validation::{validate_code, validate_phase_window},
        Phase, PhaseInput, ReferenceItem, ReferenceList,
    },
};

fn row_to_phase(row: &Row) -> Result<Phase> {
    Ok(Phase {
        id: row.get("id_phase")?,
        campaign_code: row.get("campaign_code")?,
        label: row.get("label")?,
        order_num: row.get("order_num")?,
        starting_date: get_datetime(row, "starting_date")?,
        ending_date: get_datetime(row, "ending_date")?,
        phase_type_code: row.get("phase_type_code")?,
    })
}

fn check_input(input: &PhaseInput) -> Result<()> {
    validate_code("campaign_code", &input.campaign_code)?;
    if input.label.trim().is_empty() {
        bail!("label is required");
    }
    validate_phase_window(&input.starting_date, &input.ending_date)
}

fn collect_phases(rows: &mut rusqlite::Rows<'_>) -> Result<Vec<Phase>> {
    let mut phases = Vec::new();
    while let Some(row) = rows.next()? {
        phases.push(row_to_phase(row)?);
    }
    Ok(phases)
}

impl Database {
    pub async fn create_phase(&self, input: PhaseInput) -> Result<Phase> {
        check_input(&input)?;
        let phase_type_code = non_blank(input.phase_type_code.clone());

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO campaign_phase
                     (campaign_code, starting_date, ending_date, label, order_num, phase_type_code)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.campaign_code,
                    input.starting_date.to_rfc3339(),
                    input.ending_date.to_rfc3339(),
                    input.label,
                    input.order_num,
                    phase_type_code,
                ],
            )
            .with_context(|| {
                format!(
                    "failed to insert phase '{}' of campaign '{}'",
                    input.label, input.campaign_code
                )
            })?;

            Ok(Phase {
                id: conn.last_insert_rowid(),
                campaign_code: input.campaign_code,
                label: input.label,
                order_num: input.order_num,
                starting_date: input.starting_date,
                ending_date: input.ending_date,
                phase_type_code,
            })
        })
        .await
    }

    pub async fn update_phase(&self, phase_id: i64, input: PhaseInput) -> Result<Phase> {
        check_input(&input)?;
        let phase_type_code = non_blank(input.phase_type_code.clone());

        self.execute(move |conn| {
            let rows_affected = conn
                .execute(
                    "UPDATE campaign_phase
                     SET campaign_code = ?1,
                         starting_date = ?2,
                         ending_date = ?3,
                         label = ?4,
                         order_num = ?5,
                         phase_type_code = ?6
                     WHERE id_phase = ?7",
                    params![
                        input.campaign_code,
                        input.starting_date.to_rfc3339(),
                        input.ending_date.to_rfc3339(),
                        input.label,
                        input.order_num,
                        phase_type_code,
                        phase_id,
                    ],
                )
                .with_context(|| format!("failed to update phase {phase_id}"))?;

            if rows_affected == 0 {
                bail!("Phase {phase_id} not found");
            }

            Ok(Phase {
                id: phase_id,
                campaign_code: input.campaign_code,
                label: input.label,
                order_num: input.order_num,
                starting_date: input.starting_date,
                ending_date: input.ending_date,
                phase_type_code,
            })
        })
        .await
    }

    pub async fn delete_phase(&self, phase_id: i64) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                "DELETE FROM campaign_phase WHERE id_phase = ?1",
                params![phase_id],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn find_phase(&self, phase_id: i64) -> Result<Option<Phase>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_phase, campaign_code, starting_date, ending_date, label, order_num, phase_type_code
                 FROM campaign_phase
                 WHERE id_phase = ?1",
            )?;

            let mut rows = stmt.query(params![phase_id])?;
            let phase = match rows.next()? {
                Some(row) => Some(row_to_phase(row)?),
                None => None,
            };
            Ok(phase)
        })
        .await
    }

    /// First phase of the given type in a campaign.
    /// Nothing in the schema prevents duplicates; the lowest id wins.
    pub async fn find_phase_by_campaign_and_type(
        &self,
        campaign_code: &str,
        phase_type_code: &str,
    ) -> Result<Option<Phase>> {
        let campaign_code = campaign_code.to_string();
        let phase_type_code = phase_type_code.to_string();

        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_phase, campaign_code, starting_date, ending_date, label, order_num, phase_type_code
                 FROM campaign_phase
                 WHERE campaign_code = ?1 AND phase_type_code = ?2
                 ORDER BY id_phase ASC
                 LIMIT 1",
            )?;

            let mut rows = stmt.query(params![campaign_code, phase_type_code])?;
            let phase = match rows.next()? {
                Some(row) => Some(row_to_phase(row)?),
                None => None,
            };
            Ok(phase)
        })
        .await
    }

    /// Every phase of every campaign
    pub async fn get_phases(&self) -> Result<Vec<Phase>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id_phase, campaign_code, starting_date, ending_date, label, order_num, phase_type_code
                 FROM campaign_phase
                 ORDER BY campaign_code ASC, order_num ASC, id_phase ASC",
            )?;

            let mut rows = stmt.query([])?;
            let phases = collect_phases(&mut rows)?;
            Ok(phases)
        })
        .await
    }

    pub async fn get_phases_by_campaign(&self, campaign_code: &str) -> Result<Vec<Phase>> {
        let campaign_code = campaign_code.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_phase, campaign_code, starting_date, ending_date, label, order_num, phase_type_code
                 FROM campaign_phase
                 WHERE campaign_code = ?1
                 ORDER BY order_num ASC, id_phase ASC",
            )?;

            let mut rows = stmt.query(params![campaign_code])?;
            let phases = collect_phases(&mut rows)?;
            Ok(phases)
        })
        .await
    }

    pub async fn get_phase_ids(&self) -> Result<Vec<i64>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT id_phase FROM campaign_phase ORDER BY id_phase ASC")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    /// `id_phase -> "CAMPAIGN - label"`
    pub async fn get_phases_reference_list(&self) -> Result<ReferenceList> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id_phase, campaign_code, label
                 FROM campaign_phase
                 ORDER BY campaign_code ASC, order_num ASC, id_phase ASC",
            )?;
            let items = stmt
                .query_map([], |row| {
                    let id: i64 = row.get(0)?;
                    let campaign_code: String = row.get(1)?;
                    let label: String = row.get(2)?;
                    Ok(ReferenceItem::new(
                        id.to_string(),
                        format!("{campaign_code} - {label}"),
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
    }

    pub async fn get_phase_types_reference_list(&self) -> Result<ReferenceList> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT phase_type_code, label FROM campaign_phase_types ORDER BY rowid ASC",
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
