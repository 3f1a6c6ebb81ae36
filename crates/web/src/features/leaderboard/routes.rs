use axum::{
    Router, middleware,
    routing::{get, post},
};
use storage::Database;

use super::handlers::{get_leaderboard, rebuild_leaderboard};
use crate::middleware::auth::{ApiKeys, require_auth};

/// Mounted under `/api/competitions/:handle`
pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/leaderboard/rebuild", post(rebuild_leaderboard))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .merge(protected)
}
