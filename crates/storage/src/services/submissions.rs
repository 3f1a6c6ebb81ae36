use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::submission::NewSubmission;
use crate::error::{Result, StorageError};
use crate::models::Wod;
use crate::repository::CompetitionRepository;

/// Trim free text and coerce the score vector to the WOD's metric kinds.
pub fn normalize_submission(wod: &Wod, submission: NewSubmission) -> Result<NewSubmission> {
    let athlete = submission.athlete.trim().to_string();
    if athlete.is_empty() {
        return Err(StorageError::InvalidScore(
            "Athlete name cannot be blank".to_string(),
        ));
    }

    let scores = wod
        .normalize_scores(submission.scores)
        .map_err(StorageError::InvalidScore)?;

    let score_label = submission
        .score_label
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty());

    Ok(NewSubmission {
        athlete,
        wod_id: wod.wod_id,
        division_id: submission.division_id,
        scores,
        score_label,
    })
}

/// Check that the WOD and division belong to the competition, then normalize.
pub async fn prepare_submission(
    pool: &PgPool,
    competition_id: Uuid,
    submission: NewSubmission,
) -> Result<NewSubmission> {
    let repo = CompetitionRepository::new(pool);
    let wod = repo.find_wod(competition_id, submission.wod_id).await?;
    repo.ensure_division(competition_id, submission.division_id)
        .await?;

    normalize_submission(&wod, submission)
}
