use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use super::files::insert_file;
use crate::db::{
    connection::Database,
    models::{
        validation::{validate_code, validate_color},
        FileInput, ReferenceItem, ReferenceList, Theme, ThemeInput,
    },
};

fn row_to_theme(row: &Row) -> Result<Theme, rusqlite::Error> {
    Ok(Theme {
        id: row.get("id_theme")?,
        campaign_code: row.get("campaign_code")?,
        code_theme: row.get("code_theme")?,
        title: row.get("title")?,
        description: row.get("description")?,
        active: row.get("active")?,
        front_rgb: row.get("front_rgb")?,
        image_file: row.get("image_file")?,
    })
}

fn check_input(input: &ThemeInput) -> Result<()> {
    validate_code("campaign_code", &input.campaign_code)?;
    validate_code("code_theme", &input.code_theme)?;
    if let Some(color) = &input.front_rgb {
        validate_color(color)?;
    }
    Ok(())
}

impl Database {
    pub async fn create_theme(&self, input: ThemeInput) -> Result<Theme> {
        check_input(&input)?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO campaign_theme
                     (campaign_code, code_theme, title, description, active, front_rgb)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.campaign_code,
                    input.code_theme,
                    input.title,
                    input.description,
                    input.active,
                    input.front_rgb,
                ],
            )
            .with_context(|| {
                format!(
                    "failed to insert theme '{}' of campaign '{}'",
                    input.code_theme, input.campaign_code
                )
            })?;

            Ok(Theme {
                id: conn.last_insert_rowid(),
                campaign_code: input.campaign_code,
                code_theme: input.code_theme,
                title: input.title,
                description: input.description,
                active: input.active,
                front_rgb: input.front_rgb,
                image_file: None,
            })
        })
        .await
    }

    /// The image reference is left as is.
    pub async fn update_theme(&self, theme_id: i64, input: ThemeInput) -> Result<Theme> {
        check_input(&input)?;

        self.execute(move |conn| {
            let theme = conn
                .query_row(
                    "UPDATE campaign_theme
                     SET campaign_code = ?1,
                         code_theme = ?2,
                         title = ?3,
                         description = ?4,
                         active = ?5,
                         front_rgb = ?6
                     WHERE id_theme = ?7
                     RETURNING id_theme, campaign_code, code_theme, title, description, active, front_rgb, image_file",
                    params![
                        input.campaign_code,
                        input.code_theme,
                        input.title,
                        input.description,
                        input.active,
                        input.front_rgb,
                        theme_id,
                    ],
                    row_to_theme,
                )
                .optional()
                .with_context(|| format!("failed to update theme {theme_id}"))?;

            match theme {
                Some(theme) => Ok(theme),
                None => bail!("Theme {theme_id} not found"),
            }
        })
        .await
    }

    /// Replace the theme's image, dropping the previous file if there was one
    pub async fn set_theme_image(&self, theme_id: i64, image: FileInput) -> Result<Theme> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let previous: Option<i64> = tx
                .query_row(
                    "SELECT image_file FROM campaign_theme WHERE id_theme = ?1",
                    params![theme_id],
                    |row| row.get(0),
                )
                .optional()?
                .ok_or_else(|| anyhow!("Theme {theme_id} not found"))?;

            let stored = insert_file(&tx, image)?;
            tx.execute(
                "UPDATE campaign_theme SET image_file = ?1 WHERE id_theme = ?2",
                params![stored.id, theme_id],
            )?;
            if let Some(old_file) = previous {
                tx.execute(
                    "DELETE FROM campaign_file WHERE id_file = ?1",
                    params![old_file],
                )?;
            }

            let theme = tx.query_row(
                "SELECT id_theme, campaign_code, code_theme, title, description, active, front_rgb, image_file
                 FROM campaign_theme
                 WHERE id_theme = ?1",
                params![theme_id],
                row_to_theme,
            )?;

            tx.commit()
                .with_context(|| format!("failed to replace image of theme {theme_id}"))?;
            Ok(theme)
        })
        .await
    }

    /// Delete a theme and its image file
    pub async fn delete_theme(&self, theme_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM campaign_file WHERE id_file = (
                     SELECT image_file FROM campaign_theme WHERE id_theme = ?1
                 )",
                params![theme_id],
            )?;
            tx.execute(
                "DELETE FROM campaign_theme WHERE id_theme = ?1",
                params![theme_id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn find_theme(&self, theme_id: i64) -> Result<Option<Theme>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_theme, campaign_code, code_theme, title, description, active, front_rgb, image_file
                 FROM campaign_theme
                 WHERE id_theme = ?1",
            )?;

            let result = stmt.query_row(params![theme_id], row_to_theme).optional()?;
            Ok(result)
        })
        .await
    }

    /// Theme codes are only unique per campaign; the oldest match is returned.
    pub async fn find_theme_by_code(&self, code_theme: &str) -> Result<Option<Theme>> {
        let code_theme = code_theme.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_theme, campaign_code, code_theme, title, description, active, front_rgb, image_file
                 FROM campaign_theme
                 WHERE code_theme = ?1
                 ORDER BY id_theme ASC
                 LIMIT 1",
            )?;

            let result = stmt.query_row(params![code_theme], row_to_theme).optional()?;
            Ok(result)
        })
        .await
    }

    pub async fn get_themes(&self) -> Result<Vec<Theme>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id_theme, campaign_code, code_theme, title, description, active, front_rgb, image_file
                 FROM campaign_theme
                 ORDER BY campaign_code ASC, id_theme ASC",
            )?;

            let themes = stmt
                .query_map([], row_to_theme)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(themes)
        })
        .await
    }

    pub async fn get_themes_by_campaign(&self, campaign_code: &str) -> Result<Vec<Theme>> {
        let campaign_code = campaign_code.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id_theme, campaign_code, code_theme, title, description, active, front_rgb, image_file
                 FROM campaign_theme
                 WHERE campaign_code = ?1
                 ORDER BY id_theme ASC",
            )?;

            let themes = stmt
                .query_map(params![campaign_code], row_to_theme)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(themes)
        })
        .await
    }

    /// All themes grouped by campaign code
    pub async fn get_themes_map_by_campaign(&self) -> Result<BTreeMap<String, Vec<Theme>>> {
        let themes = self.get_themes().await?;

        let mut by_campaign: BTreeMap<String, Vec<Theme>> = BTreeMap::new();
        for theme in themes {
            by_campaign
                .entry(theme.campaign_code.clone())
                .or_default()
                .push(theme);
        }
        Ok(by_campaign)
    }

    pub async fn get_theme_ids(&self) -> Result<Vec<i64>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT id_theme FROM campaign_theme ORDER BY id_theme ASC")?;
            let ids = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
    }

    /// `code_theme -> title`
    pub async fn get_themes_reference_list(&self) -> Result<ReferenceList> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT code_theme, title FROM campaign_theme ORDER BY campaign_code ASC, id_theme ASC",
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
