use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::competition::{DivisionInput, WodInput};
use crate::error::{Result, StorageError};
use crate::models::{Competition, Division, Wod};

/// Repository for competitions and the divisions and WODs they own
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all competitions, newest first
    pub async fn list(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            r#"
            SELECT competition_id, name, handle, created_at
            FROM competitions
            ORDER BY created_at DESC, name
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    pub async fn find_by_handle(&self, handle: &str) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            SELECT competition_id, name, handle, created_at
            FROM competitions
            WHERE handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    /// Get the competition and hold its row lock until `tx` ends
    pub async fn lock_by_handle(
        &self,
        handle: &str,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            SELECT competition_id, name, handle, created_at
            FROM competitions
            WHERE handle = $1
            FOR UPDATE
            "#,
        )
        .bind(handle)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    pub async fn list_divisions(&self, competition_id: Uuid) -> Result<Vec<Division>> {
        fetch_divisions(self.pool, competition_id).await
    }

    pub async fn list_wods(&self, competition_id: Uuid) -> Result<Vec<Wod>> {
        fetch_wods(self.pool, competition_id).await
    }

    /// Get a WOD only if it belongs to the competition
    pub async fn find_wod(&self, competition_id: Uuid, wod_id: i32) -> Result<Wod> {
        let wod = sqlx::query_as::<_, Wod>(
            r#"
            SELECT wod_id, competition_id, name, description, metrics, display_order
            FROM wods
            WHERE competition_id = $1 AND wod_id = $2
            "#,
        )
        .bind(competition_id)
        .bind(wod_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| {
            StorageError::InvalidReference(format!(
                "WOD {} does not belong to this competition",
                wod_id
            ))
        })?;

        Ok(wod)
    }

    /// Fails unless the division belongs to the competition
    pub async fn ensure_division(&self, competition_id: Uuid, division_id: i32) -> Result<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM divisions WHERE competition_id = $1 AND division_id = $2
            )
            "#,
        )
        .bind(competition_id)
        .bind(division_id)
        .fetch_one(self.pool)
        .await?;

        if !exists {
            return Err(StorageError::InvalidReference(format!(
                "Division {} does not belong to this competition",
                division_id
            )));
        }

        Ok(())
    }

    pub async fn insert(
        &self,
        name: &str,
        handle: &str,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            INSERT INTO competitions (name, handle)
            VALUES ($1, $2)
            RETURNING competition_id, name, handle, created_at
            "#,
        )
        .bind(name)
        .bind(handle)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.code().as_deref() == Some("23505")
            {
                return StorageError::ConstraintViolation("Handle already exists".to_string());
            }
            StorageError::from(e)
        })?;

        Ok(competition)
    }

    pub async fn rename(
        &self,
        competition_id: Uuid,
        name: &str,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            UPDATE competitions
            SET name = $2
            WHERE competition_id = $1
            RETURNING competition_id, name, handle, created_at
            "#,
        )
        .bind(competition_id)
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    /// Insert the division, or update it when it carries an id owned by the competition
    pub async fn upsert_division(
        &self,
        competition_id: Uuid,
        division: &DivisionInput,
        display_order: i32,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Division> {
        let query = match division.division_id {
            Some(division_id) => sqlx::query_as::<_, Division>(
                r#"
                UPDATE divisions
                SET name = $3, display_order = $4
                WHERE competition_id = $1 AND division_id = $2
                RETURNING division_id, competition_id, name, display_order
                "#,
            )
            .bind(competition_id)
            .bind(division_id),
            None => sqlx::query_as::<_, Division>(
                r#"
                INSERT INTO divisions (competition_id, name, display_order)
                VALUES ($1, $2, $3)
                RETURNING division_id, competition_id, name, display_order
                "#,
            )
            .bind(competition_id),
        };

        let division = query
            .bind(division.name.trim())
            .bind(display_order)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(division)
    }

    /// Insert the WOD, or update it when it carries an id owned by the competition
    pub async fn upsert_wod(
        &self,
        competition_id: Uuid,
        wod: &WodInput,
        display_order: i32,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Wod> {
        let query = match wod.wod_id {
            Some(wod_id) => sqlx::query_as::<_, Wod>(
                r#"
                UPDATE wods
                SET name = $3, description = $4, metrics = $5, display_order = $6
                WHERE competition_id = $1 AND wod_id = $2
                RETURNING wod_id, competition_id, name, description, metrics, display_order
                "#,
            )
            .bind(competition_id)
            .bind(wod_id),
            None => sqlx::query_as::<_, Wod>(
                r#"
                INSERT INTO wods (competition_id, name, description, metrics, display_order)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING wod_id, competition_id, name, description, metrics, display_order
                "#,
            )
            .bind(competition_id),
        };

        let wod = query
            .bind(wod.name.trim())
            .bind(wod.description.as_deref())
            .bind(sqlx::types::Json(&wod.metrics))
            .bind(display_order)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(wod)
    }

    /// Delete a competition; divisions, WODs, submissions and leaderboard rows cascade
    pub async fn delete(&self, competition_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM competitions
            WHERE competition_id = $1
            "#,
        )
        .bind(competition_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

pub(crate) async fn fetch_divisions<'e, E>(executor: E, competition_id: Uuid) -> Result<Vec<Division>>
where
    E: PgExecutor<'e>,
{
    let divisions = sqlx::query_as::<_, Division>(
        r#"
        SELECT division_id, competition_id, name, display_order
        FROM divisions
        WHERE competition_id = $1
        ORDER BY display_order, division_id
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await?;

    Ok(divisions)
}

pub(crate) async fn fetch_wods<'e, E>(executor: E, competition_id: Uuid) -> Result<Vec<Wod>>
where
    E: PgExecutor<'e>,
{
    let wods = sqlx::query_as::<_, Wod>(
        r#"
        SELECT wod_id, competition_id, name, description, metrics, display_order
        FROM wods
        WHERE competition_id = $1
        ORDER BY display_order, wod_id
        "#,
    )
    .bind(competition_id)
    .fetch_all(executor)
    .await?;

    Ok(wods)
}
