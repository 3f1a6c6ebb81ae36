use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::score::Scores;

/// Persisted overall placement of one athlete in one division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardRow {
    pub competition_handle: String,
    pub athlete: String,
    pub division_id: i32,
    pub rank: i32,
    pub points: i32,
    #[sqlx(json)]
    pub submissions: Vec<EventResult>,
}

/// The submission that represents an athlete in one WOD, with its rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventResult {
    pub event_id: i32,
    pub event_name: String,
    pub event_rank: i32,
    pub submission_id: i32,
    #[schema(value_type = Vec<Value>)]
    pub scores: Scores,
    pub score_label: Option<String>,
}
