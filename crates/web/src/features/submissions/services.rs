use sqlx::PgPool;
use storage::{
    dto::submission::{NewSubmission, SubmissionFilter, UpdateSubmissionRequest},
    error::Result,
    models::Submission,
    repository::{CompetitionRepository, SubmissionRepository},
    services::{leaderboard, submissions::prepare_submission},
};

/// One page of a competition's submissions and the total count
pub async fn list_submissions(
    pool: &PgPool,
    handle: &str,
    filter: &SubmissionFilter,
) -> Result<(Vec<Submission>, i64)> {
    let competition = CompetitionRepository::new(pool)
        .find_by_handle(handle)
        .await?;

    SubmissionRepository::new(pool)
        .list_filtered(competition.competition_id, filter)
        .await
}

/// Athlete names that already submitted to the competition
pub async fn list_athletes(pool: &PgPool, handle: &str) -> Result<Vec<String>> {
    let competition = CompetitionRepository::new(pool)
        .find_by_handle(handle)
        .await?;

    SubmissionRepository::new(pool)
        .list_athletes(competition.competition_id)
        .await
}

pub async fn create_submission(
    pool: &PgPool,
    handle: &str,
    submission: NewSubmission,
) -> Result<Submission> {
    let competition = CompetitionRepository::new(pool)
        .find_by_handle(handle)
        .await?;

    let submission = prepare_submission(pool, competition.competition_id, submission).await?;
    let created = SubmissionRepository::new(pool).create(&submission).await?;

    tracing::info!(
        competition = handle,
        submission_id = created.submission_id,
        athlete = %created.athlete,
        wod_id = created.wod_id,
        "Submission recorded"
    );

    leaderboard::rebuild(pool, handle).await?;

    Ok(created)
}

pub async fn update_submission(
    pool: &PgPool,
    handle: &str,
    submission_id: i32,
    request: UpdateSubmissionRequest,
) -> Result<Submission> {
    let competition = CompetitionRepository::new(pool)
        .find_by_handle(handle)
        .await?;

    let repo = SubmissionRepository::new(pool);
    let existing = repo
        .find_in_competition(competition.competition_id, submission_id)
        .await?;

    let merged = request.apply_to(&existing);
    let submission = prepare_submission(pool, competition.competition_id, merged).await?;
    let updated = repo.update(submission_id, &submission).await?;

    leaderboard::rebuild(pool, handle).await?;

    Ok(updated)
}

pub async fn delete_submission(pool: &PgPool, handle: &str, submission_id: i32) -> Result<()> {
    let competition = CompetitionRepository::new(pool)
        .find_by_handle(handle)
        .await?;

    let repo = SubmissionRepository::new(pool);
    repo.find_in_competition(competition.competition_id, submission_id)
        .await?;
    repo.delete(submission_id).await?;

    tracing::info!(competition = handle, submission_id, "Submission deleted");

    leaderboard::rebuild(pool, handle).await?;

    Ok(())
}
