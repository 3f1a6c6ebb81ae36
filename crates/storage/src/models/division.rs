use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Competitive category (e.g. "RX Men"). Rankings never cross divisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Division {
    pub division_id: i32,
    pub competition_id: Uuid,
    pub name: String,
    pub display_order: i32,
}
