use sqlx::PgPool;
use storage::{
    dto::competition::{
        CompetitionDetailResponse, CompetitionResponse, CreateCompetitionRequest,
        UpdateCompetitionRequest,
    },
    error::{Result, StorageError},
    models::Competition,
    repository::CompetitionRepository,
    services::leaderboard,
};

/// List all competitions
pub async fn list_competitions(pool: &PgPool) -> Result<Vec<Competition>> {
    let repo = CompetitionRepository::new(pool);
    repo.list().await
}

/// Get a competition with its divisions and WODs
pub async fn get_competition_detail(pool: &PgPool, handle: &str) -> Result<CompetitionDetailResponse> {
    let repo = CompetitionRepository::new(pool);
    let competition = repo.find_by_handle(handle).await?;
    load_detail(&repo, competition).await
}

/// Create a competition together with its divisions and WODs
pub async fn create_competition(
    pool: &PgPool,
    request: &CreateCompetitionRequest,
) -> Result<CompetitionDetailResponse> {
    let handle = request
        .resolved_handle()
        .map_err(|e| StorageError::InvalidReference(e.to_string()))?;

    let repo = CompetitionRepository::new(pool);
    let mut tx = pool.begin().await?;

    let competition = repo.insert(request.name.trim(), &handle, &mut tx).await?;

    for (order, division) in request.divisions.iter().enumerate() {
        repo.upsert_division(competition.competition_id, division, order as i32, &mut tx)
            .await?;
    }

    for (order, wod) in request.wods.iter().enumerate() {
        repo.upsert_wod(competition.competition_id, wod, order as i32, &mut tx)
            .await?;
    }

    tx.commit().await?;

    tracing::info!(
        competition = %competition.handle,
        divisions = request.divisions.len(),
        wods = request.wods.len(),
        "Competition created"
    );

    load_detail(&repo, competition).await
}

/// Update a competition; division or WOD edits trigger a leaderboard rebuild
pub async fn update_competition(
    pool: &PgPool,
    handle: &str,
    request: &UpdateCompetitionRequest,
) -> Result<CompetitionDetailResponse> {
    let repo = CompetitionRepository::new(pool);
    let mut competition = repo.find_by_handle(handle).await?;

    let mut tx = pool.begin().await?;

    if let Some(name) = &request.name {
        competition = repo
            .rename(competition.competition_id, name.trim(), &mut tx)
            .await?;
    }

    if let Some(divisions) = &request.divisions {
        for (order, division) in divisions.iter().enumerate() {
            repo.upsert_division(competition.competition_id, division, order as i32, &mut tx)
                .await?;
        }
    }

    if let Some(wods) = &request.wods {
        for (order, wod) in wods.iter().enumerate() {
            repo.upsert_wod(competition.competition_id, wod, order as i32, &mut tx)
                .await?;
        }
    }

    tx.commit().await?;

    if request.divisions.is_some() || request.wods.is_some() {
        leaderboard::rebuild(pool, &competition.handle).await?;
    }

    load_detail(&repo, competition).await
}

/// Delete a competition and everything it owns
pub async fn delete_competition(pool: &PgPool, handle: &str) -> Result<()> {
    let repo = CompetitionRepository::new(pool);
    let competition = repo.find_by_handle(handle).await?;
    repo.delete(competition.competition_id).await?;

    tracing::info!(competition = handle, "Competition deleted");
    Ok(())
}

async fn load_detail(
    repo: &CompetitionRepository<'_>,
    competition: Competition,
) -> Result<CompetitionDetailResponse> {
    let divisions = repo.list_divisions(competition.competition_id).await?;
    let wods = repo.list_wods(competition.competition_id).await?;

    Ok(CompetitionDetailResponse {
        competition: CompetitionResponse::from(competition),
        divisions,
        wods,
    })
}
