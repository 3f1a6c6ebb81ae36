use crate::Result;
use sqlx::PgPool;

pub struct ImportContext {
    pub pool: PgPool,
    /// Parse and resolve every row without writing anything
    pub validate_only: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub rows: usize,
    pub inserted: u64,
    pub leaderboard_rows: usize,
}

#[async_trait::async_trait]
pub trait SubmissionImporter: Send + Sync {
    async fn import(&self, competition_handle: &str, context: &ImportContext) -> Result<ImportReport>;
}
