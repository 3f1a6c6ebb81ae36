use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::score::Scores;

/// One raw score entry. Several may exist for the same athlete, WOD and
/// division; only the best one is ranked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Submission {
    pub submission_id: i32,
    pub athlete: String,
    pub wod_id: i32,
    pub division_id: i32,
    #[sqlx(json)]
    #[schema(value_type = Vec<Value>)]
    pub scores: Scores,
    pub score_label: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
