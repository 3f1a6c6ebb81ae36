use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardFilter {
    /// Only return rows of this division
    pub division_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RebuildResponse {
    pub competition_handle: String,
    pub rows: usize,
}
