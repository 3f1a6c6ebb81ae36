use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::dto::submission::{NewSubmission, SubmissionFilter};
use crate::error::{Result, StorageError};
use crate::models::Submission;

const SUBMISSION_COLUMNS: &str =
    "s.submission_id, s.athlete, s.wod_id, s.division_id, s.scores, s.score_label, s.submitted_at";

/// Submissions are scoped to a competition through their WOD.
pub struct SubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubmissionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every submission of the competition, in id order
    pub async fn list_by_competition(&self, competition_id: Uuid) -> Result<Vec<Submission>> {
        fetch_by_competition(self.pool, competition_id).await
    }

    /// One page of the competition's submissions plus the total match count
    pub async fn list_filtered(
        &self,
        competition_id: Uuid,
        filter: &SubmissionFilter,
    ) -> Result<(Vec<Submission>, i64)> {
        let mut count = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM submissions s
            INNER JOIN wods w ON w.wod_id = s.wod_id
            WHERE w.competition_id =
            "#,
        );
        count.push_bind(competition_id);
        push_filters(&mut count, filter);

        let total_items = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let mut query = QueryBuilder::new("SELECT ");
        query.push(SUBMISSION_COLUMNS);
        query.push(
            r#"
            FROM submissions s
            INNER JOIN wods w ON w.wod_id = s.wod_id
            WHERE w.competition_id =
            "#,
        );
        query.push_bind(competition_id);
        push_filters(&mut query, filter);
        query.push(" ORDER BY s.submission_id LIMIT ");
        query.push_bind(filter.pagination().limit());
        query.push(" OFFSET ");
        query.push_bind(filter.pagination().offset());

        let submissions = query
            .build_query_as::<Submission>()
            .fetch_all(self.pool)
            .await?;

        Ok((submissions, total_items))
    }

    /// Get a submission only if its WOD belongs to the competition
    pub async fn find_in_competition(
        &self,
        competition_id: Uuid,
        submission_id: i32,
    ) -> Result<Submission> {
        let mut query = QueryBuilder::new("SELECT ");
        query.push(SUBMISSION_COLUMNS);
        query.push(
            r#"
            FROM submissions s
            INNER JOIN wods w ON w.wod_id = s.wod_id
            WHERE w.competition_id =
            "#,
        );
        query.push_bind(competition_id);
        query.push(" AND s.submission_id = ");
        query.push_bind(submission_id);

        query
            .build_query_as::<Submission>()
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    /// Distinct athlete names with at least one submission, sorted
    pub async fn list_athletes(&self, competition_id: Uuid) -> Result<Vec<String>> {
        let athletes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT s.athlete
            FROM submissions s
            INNER JOIN wods w ON w.wod_id = s.wod_id
            WHERE w.competition_id = $1
            ORDER BY s.athlete
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(athletes)
    }

    pub async fn create(&self, submission: &NewSubmission) -> Result<Submission> {
        let created = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (athlete, wod_id, division_id, scores, score_label)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING submission_id, athlete, wod_id, division_id, scores, score_label, submitted_at
            "#,
        )
        .bind(&submission.athlete)
        .bind(submission.wod_id)
        .bind(submission.division_id)
        .bind(Json(&submission.scores))
        .bind(submission.score_label.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(created)
    }

    /// Insert a batch inside the caller's transaction
    pub async fn create_many(
        &self,
        submissions: &[NewSubmission],
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64> {
        let mut inserted = 0;

        // Stay well below the bind parameter limit
        for chunk in submissions.chunks(1000) {
            let mut query = QueryBuilder::new(
                "INSERT INTO submissions (athlete, wod_id, division_id, scores, score_label) ",
            );
            query.push_values(chunk, |mut row, submission| {
                row.push_bind(&submission.athlete)
                    .push_bind(submission.wod_id)
                    .push_bind(submission.division_id)
                    .push_bind(Json(&submission.scores))
                    .push_bind(submission.score_label.as_deref());
            });

            inserted += query
                .build()
                .execute(&mut **tx)
                .await
                .map_err(map_write_error)?
                .rows_affected();
        }

        Ok(inserted)
    }

    pub async fn update(&self, submission_id: i32, submission: &NewSubmission) -> Result<Submission> {
        let updated = sqlx::query_as::<_, Submission>(
            r#"
            UPDATE submissions
            SET athlete = $2, wod_id = $3, division_id = $4, scores = $5, score_label = $6
            WHERE submission_id = $1
            RETURNING submission_id, athlete, wod_id, division_id, scores, score_label, submitted_at
            "#,
        )
        .bind(submission_id)
        .bind(&submission.athlete)
        .bind(submission.wod_id)
        .bind(submission.division_id)
        .bind(Json(&submission.scores))
        .bind(submission.score_label.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(StorageError::NotFound)?;

        Ok(updated)
    }

    pub async fn delete(&self, submission_id: i32) -> Result<()> {
        let result = sqlx::query("DELETE FROM submissions WHERE submission_id = $1")
            .bind(submission_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

pub(crate) async fn fetch_by_competition<'e, E>(
    executor: E,
    competition_id: Uuid,
) -> Result<Vec<Submission>>
where
    E: PgExecutor<'e>,
{
    let mut query = QueryBuilder::new("SELECT ");
    query.push(SUBMISSION_COLUMNS);
    query.push(
        r#"
        FROM submissions s
        INNER JOIN wods w ON w.wod_id = s.wod_id
        WHERE w.competition_id =
        "#,
    );
    query.push_bind(competition_id);
    query.push(" ORDER BY s.submission_id");

    let submissions = query
        .build_query_as::<Submission>()
        .fetch_all(executor)
        .await?;

    Ok(submissions)
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &SubmissionFilter) {
    if let Some(wod_id) = filter.wod_id {
        query.push(" AND s.wod_id = ");
        query.push_bind(wod_id);
    }

    if let Some(division_id) = filter.division_id {
        query.push(" AND s.division_id = ");
        query.push_bind(division_id);
    }

    if let Some(ref athlete) = filter.athlete {
        query.push(" AND s.athlete = ");
        query.push_bind(athlete.clone());
    }
}

fn map_write_error(e: sqlx::Error) -> StorageError {
    let err = StorageError::from(e);
    if err.is_foreign_key_violation() {
        return StorageError::InvalidReference("WOD does not exist".to_string());
    }
    err
}
